//! Catalog of words eligible as game targets.

use rand::Rng;
use tracing::{debug, info, instrument, warn};

use crate::{HangmanError, HangmanRepository, NewWord, Word};

/// Registered target words, backed by the repository.
#[derive(Debug, Clone)]
pub struct WordCatalog {
    repository: HangmanRepository,
}

impl WordCatalog {
    /// Creates a catalog over the given repository.
    #[instrument(skip(repository))]
    pub fn new(repository: HangmanRepository) -> Self {
        Self { repository }
    }

    /// Validates and stores a word.
    ///
    /// The word must be ASCII letters and is uppercased for storage, so words
    /// that differ only by case collide.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the word is empty or has anything besides
    /// `A`-`Z`, and `Conflict` if it is already registered.
    #[instrument(skip(self))]
    pub fn register_word(&self, word: &str) -> Result<Word, HangmanError> {
        let canonical = canonicalize(word).ok_or_else(|| {
            warn!("Rejected word");
            HangmanError::invalid_input("Please enter one word using only the letters A-Z!")
        })?;

        match self.repository.insert_word(NewWord::new(canonical.clone()))? {
            Some(stored) => {
                info!(word = %stored.word(), "Word registered");
                Ok(stored)
            }
            None => Err(HangmanError::conflict(format!(
                "{} is already in the list!",
                canonical
            ))),
        }
    }

    /// Picks one registered word uniformly at random.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the catalog is empty.
    #[instrument(skip(self, rng))]
    pub fn pick_random_word<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Word, HangmanError> {
        self.pick_with(|count| rng.random_range(0..count))
    }

    /// Picks the word at the offset `draw` returns for the current count.
    ///
    /// `draw` runs between the two catalog queries and must return a value
    /// in `0..count`.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the catalog is empty.
    #[instrument(skip(self, draw))]
    pub fn pick_with<F>(&self, draw: F) -> Result<Word, HangmanError>
    where
        F: FnOnce(i64) -> i64,
    {
        let count = self.repository.count_words()?;
        if count == 0 {
            warn!("Catalog is empty");
            return Err(HangmanError::unavailable(
                "No words are registered; add a word first",
            ));
        }
        let offset = draw(count);
        debug!(count, offset, "Picking word");
        self.repository
            .word_at(offset)?
            .ok_or_else(|| HangmanError::unavailable("Word vanished from the catalog"))
    }
}

/// Uppercases a word, returning `None` unless it is non-empty ASCII letters.
fn canonicalize(word: &str) -> Option<String> {
    (!word.is_empty() && word.chars().all(|c| c.is_ascii_alphabetic()))
        .then(|| word.to_ascii_uppercase())
}
