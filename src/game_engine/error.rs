//! Error types for the caller and ticket engines.
//!
//! None of these are fatal to a session. The session layer either recovers
//! with a safe default (and logs) or hands the error back so the host can show
//! a transient notification.

use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// A draw was requested after all 90 numbers were called.
    #[error("no numbers left to draw")]
    EmptyPool,

    /// A free-text winner token was not a number.
    #[error("not a number: {0:?}")]
    InvalidManualInput(String),

    /// A ticket column ran out of candidates while filling a row.
    #[error("column {column} has no numbers left")]
    ColumnExhausted { column: usize },

    /// The ticket generator gave up after repeated column exhaustion.
    #[error("could not fill ticket row {row} after {attempts} attempts")]
    GenerationFailed { row: usize, attempts: u32 },

    /// A grid breaks one of the ticket invariants.
    #[error("invalid ticket: {0}")]
    InvalidTicket(String),

    #[error("storage unavailable: {0}")]
    PersistenceUnavailable(String),

    #[error("corrupt stored state: {0}")]
    CorruptPersistedState(String),

    #[error("please enter a name for the ticket")]
    SaveWithoutName,

    #[error("no ticket to save")]
    SaveWithoutTicket,

    #[error("no saved ticket with id {0}")]
    TicketNotFound(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::CorruptPersistedState(e.to_string())
    }
}

impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        EngineError::PersistenceUnavailable(e.to_string())
    }
}
