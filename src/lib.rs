//! Strictly Hangman library - a persistent word-guessing game server
//!
//! Players register, start games against a random word from the catalog and
//! guess one letter at a time. Finished games feed a score ledger and the
//! players' aggregate statistics.
//!
//! # Architecture
//!
//! - **Games**: the pure hangman state machine ([`Hangman`])
//! - **Database**: Diesel/SQLite persistence ([`HangmanRepository`])
//! - **Services**: [`WordCatalog`], [`ProfileService`], [`GameService`], [`ScoreLedger`]
//! - **API**: one method per operation, returning serializable records ([`HangmanApi`])
//! - **Server**: MCP tools dispatching to the API ([`HangmanServer`])
//!
//! # Example
//!
//! ```no_run
//! use strictly_hangman::{HangmanApi, HangmanConfig};
//!
//! # fn example() -> Result<(), strictly_hangman::HangmanError> {
//! let api = HangmanApi::open(&HangmanConfig::default())?;
//! api.register_word("RUST")?;
//! api.register_user("ferris", None)?;
//! let game = api.start_game("ferris")?;
//! let game = api.submit_guess(&game.session_ref, "r")?;
//! println!("{} ({})", game.answer, game.message);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod api;
mod catalog;
mod config;
mod db;
mod error;
mod game_service;
mod profile_service;
mod score_ledger;
mod server;

pub mod games;

// Crate-level exports - Database
pub use db::{
    DbError, DbErrorKind, Game, GameChanges, GameRemoval, HangmanRepository, NewGame, NewScore,
    NewUser, NewWord, Score, User, UserStatsChanges, Word,
};

// Crate-level exports - Errors and configuration
pub use config::{ConfigError, HangmanConfig};
pub use error::{HangmanError, HangmanErrorKind};

// Crate-level exports - Services
pub use catalog::WordCatalog;
pub use game_service::{GameKey, GameService, Reminder};
pub use profile_service::{DEFAULT_LEADERBOARD_LIMIT, ProfileService};
pub use score_ledger::ScoreLedger;

// Crate-level exports - Operation surface
pub use api::{Confirmation, GameSnapshot, HangmanApi, ScoreEntry, UserProfileView, UserRank};
pub use server::{
    GameRequest, GuessRequest, HangmanServer, LimitRequest, ListGamesRequest,
    RegisterUserRequest, UserRequest, WordRequest,
};

// Crate-level exports - Game types
pub use games::hangman::{
    Completion, GameStatus, GuessError, GuessOutcome, Hangman, Letter, MAX_ATTEMPTS,
    PLACEHOLDER, WIN_BONUS,
};
