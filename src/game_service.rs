//! Game session business logic layer.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use derive_getters::Getters;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::games::hangman::{GuessOutcome, Hangman, format_letters};
use crate::{
    Game, GameRemoval, HangmanError, HangmanRepository, NewGame, ProfileService, User,
    WordCatalog,
};

/// Durable reference to a game session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameKey(i32);

impl GameKey {
    /// The row id behind the reference.
    pub fn id(self) -> i32 {
        self.0
    }
}

impl From<&Game> for GameKey {
    fn from(game: &Game) -> Self {
        Self(*game.id())
    }
}

impl fmt::Display for GameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for GameKey {
    type Err = HangmanError;

    /// Unparsable references cannot name a game, so they are `NotFound`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i32>()
            .map(Self)
            .map_err(|_| HangmanError::not_found("Game not found!"))
    }
}

/// A user who should be reminded about unfinished games.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, schemars::JsonSchema)]
pub struct Reminder {
    name: String,
    email: String,
    open_games: i64,
}

/// Service layer for game sessions.
///
/// Picks words through [`WordCatalog`] with an injected random source and
/// funnels every guess through [`HangmanRepository::play_turn`], so a guess
/// and the bookkeeping of a completed game commit together.
#[derive(Debug, Clone)]
pub struct GameService {
    repository: HangmanRepository,
    catalog: WordCatalog,
    profiles: ProfileService,
    rng: Arc<Mutex<StdRng>>,
}

impl GameService {
    /// Creates a game service that draws words with an OS-seeded generator.
    #[instrument(skip(repository))]
    pub fn new(repository: HangmanRepository) -> Self {
        Self::with_rng(repository, StdRng::from_os_rng())
    }

    /// Creates a game service with a fixed seed for reproducible word picks.
    #[instrument(skip(repository))]
    pub fn with_seed(repository: HangmanRepository, seed: u64) -> Self {
        Self::with_rng(repository, StdRng::seed_from_u64(seed))
    }

    /// Creates a game service drawing words from the given generator.
    #[instrument(skip_all)]
    pub fn with_rng(repository: HangmanRepository, rng: StdRng) -> Self {
        info!("Creating GameService");
        Self {
            catalog: WordCatalog::new(repository.clone()),
            profiles: ProfileService::new(repository.clone()),
            repository,
            rng: Arc::new(Mutex::new(rng)),
        }
    }

    /// Starts a game for the named user against a random catalog word.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown user and `Unavailable` if the
    /// catalog is empty.
    #[instrument(skip(self))]
    pub fn start(&self, user_name: &str) -> Result<(Game, User), HangmanError> {
        let user = self.profiles.get_user(user_name)?;
        let word = self.catalog.pick_with(|count| {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            rng.random_range(0..count)
        })?;
        let hangman = Hangman::new(word.letters());
        let game = self.repository.insert_game(NewGame::new(*user.id(), &hangman))?;
        info!(game_id = game.id(), user = %user.name(), "Game started");
        Ok((game, user))
    }

    /// Loads a game with its owner.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the reference does not resolve.
    #[instrument(skip(self))]
    pub fn get(&self, reference: &str) -> Result<(Game, User), HangmanError> {
        let key: GameKey = reference.parse()?;
        let game = self
            .repository
            .get_game(key.id())?
            .ok_or_else(|| HangmanError::not_found("Game not found!"))?;
        let user = self.owner(&game)?;
        Ok((game, user))
    }

    /// Applies one guess to a game.
    ///
    /// The guess, the updated game, the score of a finished game and the
    /// owner's aggregates are committed in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown game, `GameEnded` if it is over and
    /// `InvalidInput` for anything but a single letter.
    #[instrument(skip(self))]
    pub fn submit_guess(
        &self,
        reference: &str,
        guess: &str,
    ) -> Result<(Game, User, GuessOutcome), HangmanError> {
        let key: GameKey = reference.parse()?;
        let (game, outcome) = self
            .repository
            .play_turn(key.id(), |hangman| {
                hangman.guess(guess).map_err(|e| {
                    warn!(error = %e, "Guess rejected");
                    HangmanError::from(e)
                })
            })?
            .ok_or_else(|| HangmanError::not_found("Game not found!"))?;
        let user = self.owner(&game)?;
        info!(game_id = game.id(), outcome = ?outcome, "Guess applied");
        Ok((game, user, outcome))
    }

    /// Deletes an unfinished game.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if the game is over and `NotFound` if it
    /// does not exist.
    #[instrument(skip(self))]
    pub fn cancel(&self, reference: &str) -> Result<GameKey, HangmanError> {
        let key: GameKey = reference.parse()?;
        match self.repository.remove_open_game(key.id())? {
            GameRemoval::Removed => {
                info!(game_id = key.id(), "Game cancelled");
                Ok(key)
            }
            GameRemoval::AlreadyOver => {
                Err(HangmanError::invalid_operation("Game is already over!"))
            }
            GameRemoval::Missing => Err(HangmanError::not_found("Game not found!")),
        }
    }

    /// Lists a user's games that are finished (`completed`) or in progress.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown user.
    #[instrument(skip(self))]
    pub fn list_for_user(
        &self,
        user_name: &str,
        completed: bool,
    ) -> Result<(User, Vec<Game>), HangmanError> {
        let user = self.profiles.get_user(user_name)?;
        let games = self.repository.list_games(*user.id(), completed)?;
        debug!(count = games.len(), "Listed user games");
        Ok((user, games))
    }

    /// Renders the ordered guesses of a game.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the reference does not resolve.
    #[instrument(skip(self))]
    pub fn history_of(&self, reference: &str) -> Result<String, HangmanError> {
        let key: GameKey = reference.parse()?;
        let game = self
            .repository
            .get_game(key.id())?
            .ok_or_else(|| HangmanError::not_found("Game not found!"))?;
        let history: Vec<char> = game.history().chars().collect();
        Ok(format!("Moves made: {}", format_letters(&history)))
    }

    /// Lists users with an email and unfinished games.
    ///
    /// Read-only; delivering the reminder is up to the caller.
    #[instrument(skip(self))]
    pub fn pending_reminders(&self) -> Result<Vec<Reminder>, HangmanError> {
        let reminders = self
            .repository
            .users_with_open_games()?
            .into_iter()
            .filter_map(|(user, open_games)| {
                user.email().clone().map(|email| Reminder {
                    name: user.name().clone(),
                    email,
                    open_games,
                })
            })
            .collect::<Vec<_>>();
        info!(count = reminders.len(), "Pending reminders collected");
        Ok(reminders)
    }

    fn owner(&self, game: &Game) -> Result<User, HangmanError> {
        self.repository
            .get_user(*game.user_id())?
            .ok_or_else(|| HangmanError::not_found("Game owner not found"))
    }
}
