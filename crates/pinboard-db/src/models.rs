/// Database row types — these map directly to SQLite rows.
/// Distinct from the pinboard-types API models so the stored password
/// stays inside this crate.

pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password: String,
}

pub struct MessageRow {
    pub id: i64,
    pub content: String,
    pub created_at: String,
    pub username: String,
}
