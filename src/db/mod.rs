//! Database persistence layer for users, words, games and scores.

mod error;
mod models;
mod repository;
mod schema; // Diesel generated schema - internal use only

pub use error::{DbError, DbErrorKind};
pub use models::{
    Game, GameChanges, NewGame, NewScore, NewUser, NewWord, Score, User, UserStatsChanges, Word,
};
pub use repository::{GameRemoval, HangmanRepository};
