//! Database error types.

use derive_more::{Display, Error};
use tracing::instrument;

/// Broad category of a storage failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DbErrorKind {
    /// The database could not be opened or configured.
    #[display("connection")]
    Connection,
    /// Schema migrations failed to apply.
    #[display("migration")]
    Migration,
    /// A query failed.
    #[display("query")]
    Query,
    /// A stored row violates the game invariants.
    #[display("corrupt row")]
    Corrupt,
}

/// Database error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Database {} error: {} at {}:{}", kind, message, file, line)]
pub struct DbError {
    /// Failure category.
    pub kind: DbErrorKind,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl DbError {
    /// Creates a corrupt-row error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_kind(DbErrorKind::Corrupt, message)
    }

    /// Creates an error of the given kind with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn with_kind(kind: DbErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<diesel::result::Error> for DbError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        Self::with_kind(DbErrorKind::Query, format!("Diesel error: {}", err))
    }
}

impl From<diesel::ConnectionError> for DbError {
    #[track_caller]
    fn from(err: diesel::ConnectionError) -> Self {
        Self::with_kind(DbErrorKind::Connection, format!("Connection error: {}", err))
    }
}
