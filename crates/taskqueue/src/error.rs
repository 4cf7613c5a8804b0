use std::{error, fmt};

#[derive(Debug)]
pub enum TaskError {
    /// the generated task id collided with an existing row
    Duplicate,
    InvalidConfig(String),
    /// a stored status string no longer parses; should not happen, the
    /// store is the only writer
    InvalidStatus(String),
    Encoding(serde_json::Error),
    Database(sqlx::Error),
}

impl error::Error for TaskError {}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TaskError::Duplicate => write!(f, "task id already exists"),
            TaskError::InvalidConfig(what) => write!(f, "invalid task store config: {}", what),
            TaskError::InvalidStatus(status) => {
                write!(f, "stored task status '{}' is not recognized", status)
            }
            TaskError::Encoding(why) => write!(f, "task body encoding error: {}", why),
            TaskError::Database(why) => write!(f, "task store database error: {}", why),
        }
    }
}

impl From<serde_json::Error> for TaskError {
    fn from(why: serde_json::Error) -> Self {
        TaskError::Encoding(why)
    }
}

impl From<sqlx::Error> for TaskError {
    fn from(why: sqlx::Error) -> Self {
        if why
            .as_database_error()
            .is_some_and(|db| db.is_unique_violation())
        {
            TaskError::Duplicate
        } else {
            TaskError::Database(why)
        }
    }
}
