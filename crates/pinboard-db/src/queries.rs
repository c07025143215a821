use rusqlite::{Connection, OptionalExtension, params};

use crate::StoreError;
use crate::models::{MessageRow, UserRow};

/// Insert a new user. The UNIQUE constraint on username is the only
/// uniqueness check: a violation is classified as `DuplicateUsername`,
/// anything else surfaces as `Query`. Dropping the transaction on the
/// error paths rolls it back.
pub fn create_user(conn: &mut Connection, username: &str, password: &str) -> Result<i64, StoreError> {
    let tx = conn.transaction()?;

    match tx.execute(
        "INSERT INTO users (username, password) VALUES (?1, ?2)",
        params![username, password],
    ) {
        Ok(_) => {}
        Err(e) if is_unique_violation(&e) => return Err(StoreError::DuplicateUsername),
        Err(e) => return Err(e.into()),
    }

    let id = tx.last_insert_rowid();
    tx.commit()?;
    Ok(id)
}

pub fn user_by_username(conn: &Connection, username: &str) -> Result<Option<UserRow>, StoreError> {
    let mut stmt = conn.prepare("SELECT id, username, password FROM users WHERE username = ?1")?;

    let row = stmt
        .query_row([username], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                password: row.get(2)?,
            })
        })
        .optional()?;

    Ok(row)
}

/// Insert a message for an existing user. `created_at` is assigned by
/// the schema default at insert time.
pub fn insert_message(conn: &mut Connection, user_id: i64, content: &str) -> Result<i64, StoreError> {
    let tx = conn.transaction()?;

    tx.execute(
        "INSERT INTO messages (user_id, content) VALUES (?1, ?2)",
        params![user_id, content],
    )?;

    let id = tx.last_insert_rowid();
    tx.commit()?;
    Ok(id)
}

/// The whole feed, newest first, with author usernames resolved in a
/// single JOIN. Ties in created_at come back in whatever order SQLite
/// picks.
pub fn list_messages(conn: &Connection) -> Result<Vec<MessageRow>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT m.id, m.content, m.created_at, u.username
         FROM messages m
         JOIN users u ON m.user_id = u.id
         ORDER BY m.created_at DESC",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(MessageRow {
                id: row.get(0)?,
                content: row.get(1)?,
                created_at: row.get(2)?,
                username: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
