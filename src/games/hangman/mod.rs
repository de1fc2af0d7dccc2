//! Hangman rules: letters, guesses and the puzzle state machine.

mod game;
mod types;

pub use game::Hangman;
pub use types::{
    Completion, GameStatus, GuessError, GuessOutcome, Letter, MAX_ATTEMPTS, PLACEHOLDER,
    WIN_BONUS, format_letters,
};
