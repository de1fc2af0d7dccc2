//! Domain error types shared by every operation.

use derive_more::{Display, Error};
use tracing::instrument;

use crate::db::DbError;
use crate::games::hangman::GuessError;

/// Specific failure of a hangman operation.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum HangmanErrorKind {
    /// A unique identity is already taken.
    #[display("Conflict: {}", _0)]
    Conflict(String),
    /// A reference does not resolve.
    #[display("Not found: {}", _0)]
    NotFound(String),
    /// A guess or word is malformed.
    #[display("Invalid input: {}", _0)]
    InvalidInput(String),
    /// A finished game was asked to change.
    #[display("Game ended: {}", _0)]
    GameEnded(String),
    /// The operation does not apply to the current state.
    #[display("Invalid operation: {}", _0)]
    InvalidOperation(String),
    /// A required collection is empty.
    #[display("Unavailable: {}", _0)]
    Unavailable(String),
    /// Storage failure.
    #[display("{}", _0)]
    Database(String),
}

/// Hangman error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Hangman error: {} at {}:{}", kind, file, line)]
pub struct HangmanError {
    /// What went wrong.
    pub kind: HangmanErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl HangmanError {
    /// Creates a new error with caller location tracking.
    #[track_caller]
    #[instrument]
    pub fn new(kind: HangmanErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Duplicate identity.
    #[track_caller]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(HangmanErrorKind::Conflict(message.into()))
    }

    /// Unknown reference.
    #[track_caller]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(HangmanErrorKind::NotFound(message.into()))
    }

    /// Malformed input.
    #[track_caller]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(HangmanErrorKind::InvalidInput(message.into()))
    }

    /// Operation not allowed in the current state.
    #[track_caller]
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::new(HangmanErrorKind::InvalidOperation(message.into()))
    }

    /// Required data is missing.
    #[track_caller]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(HangmanErrorKind::Unavailable(message.into()))
    }

    /// The kind of failure.
    pub fn kind(&self) -> &HangmanErrorKind {
        &self.kind
    }
}

impl From<DbError> for HangmanError {
    #[track_caller]
    fn from(err: DbError) -> Self {
        Self::new(HangmanErrorKind::Database(err.to_string()))
    }
}

impl From<diesel::result::Error> for HangmanError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        DbError::from(err).into()
    }
}

impl From<GuessError> for HangmanError {
    #[track_caller]
    fn from(err: GuessError) -> Self {
        match err {
            GuessError::GameEnded => Self::new(HangmanErrorKind::GameEnded(err.to_string())),
            GuessError::InvalidGuess => Self::new(HangmanErrorKind::InvalidInput(err.to_string())),
        }
    }
}
