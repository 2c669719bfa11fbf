use thiserror::Error;

/// Failures surfaced by the event/member repository.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The organizer already owns an event with the same normalized title.
    #[error("event {event_id} already exists")]
    Conflict { event_id: String },

    #[error("{0} not found")]
    NotFound(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

// SQLITE_CONSTRAINT_UNIQUE and SQLITE_CONSTRAINT_PRIMARYKEY
const UNIQUE_VIOLATION_CODES: [&str; 2] = ["2067", "1555"];

/// Returns true when the error is a uniqueness violation reported by SQLite.
pub fn is_unique_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db_error) => {
            let code_matches = db_error
                .code()
                .map(|code| UNIQUE_VIOLATION_CODES.contains(&code.as_ref()))
                .unwrap_or(false);
            code_matches || db_error.message().contains("UNIQUE constraint failed")
        }
        _ => false,
    }
}
