use thiserror::Error;

/// Store read/write failure with the underlying cause attached.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("No active session")]
    NoActiveSession,

    #[error("Session already active: {session_id}")]
    SessionAlreadyActive { session_id: String },

    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("Comparison needs at least 2 resolvable sessions, got {resolved}")]
    EmptySelection { resolved: usize },

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

pub type Result<T> = std::result::Result<T, TelemetryError>;
