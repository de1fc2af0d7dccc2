//! Core domain types for hangman.

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use strum::{Display as StrumDisplay, EnumString};
use tracing::instrument;

/// Symbol marking an unrevealed position in the answer.
pub const PLACEHOLDER: char = '_';

/// Number of wrong guesses a fresh game allows.
pub const MAX_ATTEMPTS: i32 = 7;

/// Points added on top of the remaining attempts when a game is won.
pub const WIN_BONUS: i32 = 3;

/// A single guessable letter, always uppercase `A`-`Z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub struct Letter(char);

impl Letter {
    /// Normalizes raw guess input into a letter.
    ///
    /// The input must be exactly one ASCII letter, in either case.
    ///
    /// # Errors
    ///
    /// Returns [`GuessError::InvalidGuess`] for empty input, more than one
    /// character, or anything outside `A`-`Z`.
    #[instrument]
    pub fn parse(input: &str) -> Result<Self, GuessError> {
        let mut chars = input.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphabetic() => Ok(Self(c.to_ascii_uppercase())),
            _ => Err(GuessError::InvalidGuess),
        }
    }

    /// Returns the letter as a `char`.
    pub fn as_char(self) -> char {
        self.0
    }
}

/// Lifecycle state of a game.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    StrumDisplay,
    EnumString,
    schemars::JsonSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GameStatus {
    /// Guesses are still accepted.
    InProgress,
    /// Every letter of the target was revealed.
    Won,
    /// The attempts ran out.
    Lost,
}

impl GameStatus {
    /// Whether the game has reached a terminal state.
    pub fn is_over(self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

/// Final result of a game, as recorded in the score ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    /// Whether the player won.
    pub won: bool,
    /// Attempts remaining when the game ended.
    pub guesses: i32,
    /// Points awarded.
    pub points: i32,
}

impl Completion {
    /// A win with the given attempts left.
    pub fn win(attempts_remaining: i32) -> Self {
        Self {
            won: true,
            guesses: attempts_remaining,
            points: attempts_remaining + WIN_BONUS,
        }
    }

    /// A loss. Losses carry no guesses and no points.
    pub fn loss() -> Self {
        Self {
            won: false,
            guesses: 0,
            points: 0,
        }
    }
}

/// What a guess did to the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuessOutcome {
    /// The letter was already guessed; nothing changed.
    AlreadyTried,
    /// The letter was revealed and letters remain hidden.
    Correct,
    /// The letter completed the word.
    Won(Completion),
    /// The letter is not in the word and attempts remain.
    Miss,
    /// The letter is not in the word and no attempts remain.
    Lost {
        /// The word that was being guessed.
        word: String,
        /// The recorded loss.
        completion: Completion,
    },
}

impl GuessOutcome {
    /// Returns the completion when this guess ended the game.
    pub fn completion(&self) -> Option<Completion> {
        match self {
            Self::Won(completion) | Self::Lost { completion, .. } => Some(*completion),
            _ => None,
        }
    }

    /// Whether the game needs to be persisted after this guess.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::AlreadyTried)
    }

    /// Message shown to the player.
    pub fn message(&self) -> String {
        match self {
            Self::AlreadyTried => "You have already tried that!".to_string(),
            Self::Correct => "You guessed correct!".to_string(),
            Self::Won(_) => "You won!".to_string(),
            Self::Miss => "Uh-oh. Try again.".to_string(),
            Self::Lost { word, .. } => format!("Game over! The word was: {}", word),
        }
    }
}

/// Errors from evaluating a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum GuessError {
    /// The game already reached a terminal state.
    #[display("This game has ended!")]
    GameEnded,
    /// The guess is not a single letter A-Z.
    #[display("Please enter a valid guess!")]
    InvalidGuess,
}

/// Renders letters as a comma-separated list, e.g. `C, A, T`.
pub fn format_letters(letters: &[char]) -> String {
    letters
        .iter()
        .map(char::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
