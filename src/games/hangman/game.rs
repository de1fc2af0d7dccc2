//! Guess evaluation for hangman.

use tracing::{debug, info, instrument};

use super::types::{
    Completion, GameStatus, GuessError, GuessOutcome, Letter, MAX_ATTEMPTS, PLACEHOLDER,
};

/// Hangman puzzle state.
///
/// The target never changes after construction and the answer always has the
/// same length as the target. Once the status is terminal, [`Hangman::guess`]
/// refuses every call without touching the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hangman {
    target: Vec<char>,
    answer: Vec<char>,
    history: Vec<char>,
    failed_tries: Vec<char>,
    attempts_remaining: i32,
    status: GameStatus,
}

impl Hangman {
    /// Creates a fresh puzzle for the given target letters.
    #[instrument(skip(target), fields(len = target.len()))]
    pub fn new(target: Vec<char>) -> Self {
        let answer = vec![PLACEHOLDER; target.len()];
        Self {
            target,
            answer,
            history: Vec::new(),
            failed_tries: Vec::new(),
            attempts_remaining: MAX_ATTEMPTS,
            status: GameStatus::InProgress,
        }
    }

    /// Rebuilds a puzzle from persisted parts.
    ///
    /// Returns `None` if the parts break the puzzle invariants.
    #[instrument(skip_all)]
    pub fn restore(
        target: Vec<char>,
        answer: Vec<char>,
        history: Vec<char>,
        failed_tries: Vec<char>,
        attempts_remaining: i32,
        status: GameStatus,
    ) -> Option<Self> {
        let consistent = answer.len() == target.len()
            && (0..=MAX_ATTEMPTS).contains(&attempts_remaining)
            && answer
                .iter()
                .zip(&target)
                .all(|(a, t)| *a == PLACEHOLDER || a == t);
        if !consistent {
            debug!("Persisted puzzle is inconsistent");
            return None;
        }
        Some(Self {
            target,
            answer,
            history,
            failed_tries,
            attempts_remaining,
            status,
        })
    }

    /// The secret letters.
    pub fn target(&self) -> &[char] {
        &self.target
    }

    /// The revealed view of the target.
    pub fn answer(&self) -> &[char] {
        &self.answer
    }

    /// Every accepted guess, in order.
    pub fn history(&self) -> &[char] {
        &self.history
    }

    /// Letters guessed that are not in the target.
    pub fn failed_tries(&self) -> &[char] {
        &self.failed_tries
    }

    /// Wrong guesses left.
    pub fn attempts_remaining(&self) -> i32 {
        self.attempts_remaining
    }

    /// Current lifecycle state.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Whether the game reached a terminal state.
    pub fn is_over(&self) -> bool {
        self.status.is_over()
    }

    /// The target as a word.
    pub fn word(&self) -> String {
        self.target.iter().collect()
    }

    /// The answer with placeholders, e.g. `C_T`.
    pub fn answer_text(&self) -> String {
        self.answer.iter().collect()
    }

    /// Evaluates one guess.
    ///
    /// Checks run in a fixed order: a finished game is rejected first, then
    /// malformed input. Repeating a letter is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`GuessError::GameEnded`] if the game is over and
    /// [`GuessError::InvalidGuess`] if the input is not a single letter.
    #[instrument(skip(self), fields(status = %self.status, attempts = self.attempts_remaining))]
    pub fn guess(&mut self, input: &str) -> Result<GuessOutcome, GuessError> {
        if self.is_over() {
            return Err(GuessError::GameEnded);
        }
        let letter = Letter::parse(input)?.as_char();

        if self.failed_tries.contains(&letter) || self.answer.contains(&letter) {
            debug!(%letter, "Letter already tried");
            return Ok(GuessOutcome::AlreadyTried);
        }

        if self.target.contains(&letter) {
            self.history.push(letter);
            for (slot, target) in self.answer.iter_mut().zip(&self.target) {
                if *target == letter {
                    *slot = letter;
                }
            }
            if self.answer == self.target {
                self.status = GameStatus::Won;
                info!(%letter, attempts = self.attempts_remaining, "Word completed");
                return Ok(GuessOutcome::Won(Completion::win(self.attempts_remaining)));
            }
            debug!(%letter, answer = %self.answer_text(), "Letter revealed");
            return Ok(GuessOutcome::Correct);
        }

        if self.attempts_remaining <= 1 {
            self.attempts_remaining = 0;
            self.status = GameStatus::Lost;
            info!(%letter, "Out of attempts");
            return Ok(GuessOutcome::Lost {
                word: self.word(),
                completion: Completion::loss(),
            });
        }

        self.failed_tries.push(letter);
        self.history.push(letter);
        self.attempts_remaining -= 1;
        debug!(%letter, attempts = self.attempts_remaining, "Letter missed");
        Ok(GuessOutcome::Miss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat() -> Hangman {
        Hangman::new(vec!['C', 'A', 'T'])
    }

    #[test]
    fn new_game_is_all_placeholders() {
        let game = cat();
        assert_eq!(game.answer_text(), "___");
        assert_eq!(game.attempts_remaining(), MAX_ATTEMPTS);
        assert_eq!(game.status(), GameStatus::InProgress);
        assert!(game.history().is_empty());
    }

    #[test]
    fn reveals_every_occurrence() {
        let mut game = Hangman::new("BANANA".chars().collect());
        assert_eq!(game.guess("a"), Ok(GuessOutcome::Correct));
        assert_eq!(game.answer_text(), "_A_A_A");
        assert_eq!(game.history(), &['A']);
    }

    #[test]
    fn win_scores_remaining_attempts() {
        let mut game = cat();
        game.guess("x").unwrap();
        game.guess("c").unwrap();
        game.guess("a").unwrap();
        let outcome = game.guess("t").unwrap();
        assert_eq!(outcome, GuessOutcome::Won(Completion::win(6)));
        assert_eq!(outcome.completion().map(|c| c.points), Some(9));
        assert_eq!(game.status(), GameStatus::Won);
        assert_eq!(game.history(), &['X', 'C', 'A', 'T']);
    }

    #[test]
    fn repeats_do_not_mutate() {
        let mut game = cat();
        game.guess("c").unwrap();
        game.guess("z").unwrap();
        let before = game.clone();
        assert_eq!(game.guess("C"), Ok(GuessOutcome::AlreadyTried));
        assert_eq!(game.guess("z"), Ok(GuessOutcome::AlreadyTried));
        assert_eq!(game, before);
    }

    #[test]
    fn seven_misses_lose() {
        let mut game = cat();
        for letter in ["b", "d", "e", "f", "g", "h"] {
            assert_eq!(game.guess(letter), Ok(GuessOutcome::Miss));
        }
        assert_eq!(game.attempts_remaining(), 1);
        let outcome = game.guess("i").unwrap();
        assert_eq!(outcome.message(), "Game over! The word was: CAT");
        assert_eq!(outcome.completion(), Some(Completion::loss()));
        assert_eq!(game.attempts_remaining(), 0);
        assert_eq!(game.failed_tries().len(), 6);
        assert!(game.is_over());
    }

    #[test]
    fn finished_game_rejects_before_validation() {
        let mut game = Hangman::new(vec!['A']);
        game.guess("a").unwrap();
        let before = game.clone();
        assert_eq!(game.guess("!!"), Err(GuessError::GameEnded));
        assert_eq!(game.guess("b"), Err(GuessError::GameEnded));
        assert_eq!(game, before);
    }

    #[test]
    fn invalid_guess_does_not_mutate() {
        let mut game = cat();
        let before = game.clone();
        assert_eq!(game.guess("ca"), Err(GuessError::InvalidGuess));
        assert_eq!(game.guess("7"), Err(GuessError::InvalidGuess));
        assert_eq!(game, before);
    }

    #[test]
    fn restore_rejects_mismatched_answer() {
        let restored = Hangman::restore(
            vec!['C', 'A', 'T'],
            vec!['C', 'X', '_'],
            vec!['C'],
            vec![],
            7,
            GameStatus::InProgress,
        );
        assert!(restored.is_none());
    }
}
