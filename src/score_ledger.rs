//! Append-only ledger of completed game scores.

use tracing::{info, instrument};

use crate::games::hangman::Completion;
use crate::{HangmanError, HangmanRepository, NewScore, Score};

/// Score records of finished games.
///
/// Scores are written when a game completes (see
/// [`HangmanRepository::play_turn`]) and are never changed afterward.
#[derive(Debug, Clone)]
pub struct ScoreLedger {
    repository: HangmanRepository,
}

impl ScoreLedger {
    /// Creates a ledger over the given repository.
    #[instrument(skip(repository))]
    pub fn new(repository: HangmanRepository) -> Self {
        Self { repository }
    }

    /// Appends the score of a finished game.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if the game is missing or still in
    /// progress, and a database error if the game already has a score.
    #[instrument(skip(self))]
    pub fn record(
        &self,
        user_id: i32,
        game_id: i32,
        completion: Completion,
    ) -> Result<Score, HangmanError> {
        let score = self
            .repository
            .insert_score(NewScore::new(user_id, game_id, completion))?
            .ok_or_else(|| HangmanError::invalid_operation("Game is not over yet!"))?;
        info!(score_id = score.id(), "Score appended");
        Ok(score)
    }

    /// Returns up to `limit` scores with owner names, most points first.
    #[instrument(skip(self))]
    pub fn top(&self, limit: u32) -> Result<Vec<(Score, String)>, HangmanError> {
        Ok(self.repository.top_scores(i64::from(limit))?)
    }

    /// Returns a user's scores, most recent first.
    #[instrument(skip(self))]
    pub fn for_user(&self, user_id: i32) -> Result<Vec<Score>, HangmanError> {
        Ok(self.repository.scores_for_user(user_id)?)
    }
}
