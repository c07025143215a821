use serde::{Deserialize, Serialize};

/// A registered user as the rest of the system sees one.
/// The stored password never leaves the db layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
}
