use thiserror::Error;

/// Failures raised by the store layer.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl DbError {
    /// True when SQLite rejected a write because of a UNIQUE, CHECK, NOT NULL
    /// or FOREIGN KEY constraint.
    pub fn is_constraint_violation(&self) -> bool {
        match self {
            Self::Sqlite(err) => {
                err.sqlite_error_code() == Some(rusqlite::ErrorCode::ConstraintViolation)
            }
            _ => false,
        }
    }
}

pub type DbResult<T> = std::result::Result<T, DbError>;
