//! Operation surface exposed to transports.
//!
//! Each method maps to exactly one game operation and returns a plain
//! serializable record. Entities are converted to records here and nowhere
//! else.

use derive_new::new;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::games::hangman::format_letters;
use crate::{
    Game, GameKey, GameService, HangmanConfig, HangmanError,
    HangmanRepository, ProfileService, Reminder, Score, ScoreLedger, User, WordCatalog,
};

/// A plain text acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema, new)]
pub struct Confirmation {
    /// Message for the caller.
    pub message: String,
}

/// External view of a game session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GameSnapshot {
    /// Reference used to address the game.
    pub session_ref: String,
    /// Owner's name.
    pub user_name: String,
    /// Wrong guesses left.
    pub attempts_remaining: i32,
    /// Whether the game is finished.
    pub game_over: bool,
    /// Accepted guesses in order, e.g. `C, X, A`.
    pub history: String,
    /// Revealed letters with placeholders, e.g. `CA_`.
    pub answer: String,
    /// Wrong letters in order, e.g. `X`.
    pub failed_tries: String,
    /// Status message.
    pub message: String,
}

impl GameSnapshot {
    /// Builds the snapshot of a game owned by `user`.
    pub fn new(game: &Game, user: &User, message: impl Into<String>) -> Self {
        let letters = |s: &str| format_letters(&s.chars().collect::<Vec<_>>());
        Self {
            session_ref: GameKey::from(game).to_string(),
            user_name: user.name().clone(),
            attempts_remaining: *game.attempts_remaining(),
            game_over: *game.game_over(),
            history: letters(game.history()),
            answer: game.answer().clone(),
            failed_tries: letters(game.failed_tries()),
            message: message.into(),
        }
    }
}

/// External view of a user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct UserProfileView {
    /// Unique user name.
    pub name: String,
    /// Contact address, if given.
    pub email: Option<String>,
    /// Games won.
    pub wins: i32,
    /// Games finished.
    pub total_played: i32,
    /// Sum of awarded points.
    pub total_score: i32,
    /// Points per finished game.
    pub average_score: f64,
}

impl From<&User> for UserProfileView {
    fn from(user: &User) -> Self {
        Self {
            name: user.name().clone(),
            email: user.email().clone(),
            wins: *user.wins(),
            total_played: *user.total_played(),
            total_score: *user.total_score(),
            average_score: *user.average_score(),
        }
    }
}

/// A user's position in a ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct UserRank {
    /// User name.
    pub name: String,
    /// Games finished.
    pub total_played: i32,
    /// Sum of awarded points.
    pub total_score: i32,
    /// Points per finished game.
    pub average_score: f64,
}

impl From<&User> for UserRank {
    fn from(user: &User) -> Self {
        Self {
            name: user.name().clone(),
            total_played: *user.total_played(),
            total_score: *user.total_score(),
            average_score: *user.average_score(),
        }
    }
}

/// One completed game in the score ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ScoreEntry {
    /// Owner's name.
    pub user_name: String,
    /// Completion date, `YYYY-MM-DD`.
    pub date: String,
    /// Whether the game was won.
    pub won: bool,
    /// Attempts remaining at completion.
    pub guesses: i32,
    /// Points awarded.
    pub points: i32,
}

impl ScoreEntry {
    /// Builds the entry for a score owned by `user_name`.
    pub fn new(score: &Score, user_name: String) -> Self {
        Self {
            user_name,
            date: score.played_on().to_string(),
            won: *score.won(),
            guesses: *score.guesses(),
            points: *score.points(),
        }
    }
}

/// Every hangman operation behind one handle.
#[derive(Debug, Clone)]
pub struct HangmanApi {
    profiles: ProfileService,
    catalog: WordCatalog,
    games: GameService,
    ledger: ScoreLedger,
    leaderboard_limit: u32,
}

impl HangmanApi {
    /// Opens the configured database, migrating it if needed.
    ///
    /// # Errors
    ///
    /// Returns a database error if the store cannot be opened.
    #[instrument(skip(config), fields(db_path = %config.db_path()))]
    pub fn open(config: &HangmanConfig) -> Result<Self, HangmanError> {
        let repository = HangmanRepository::open(config.db_path().clone())?;
        let games = match config.rng_seed() {
            Some(seed) => GameService::with_seed(repository.clone(), *seed),
            None => GameService::new(repository.clone()),
        };
        Ok(Self::with_games(repository, games, *config.leaderboard_limit()))
    }

    /// Builds the API from a repository and a game service.
    #[instrument(skip(repository, games))]
    pub fn with_games(
        repository: HangmanRepository,
        games: GameService,
        leaderboard_limit: u32,
    ) -> Self {
        info!("Creating HangmanApi");
        Self {
            profiles: ProfileService::new(repository.clone()),
            catalog: WordCatalog::new(repository.clone()),
            ledger: ScoreLedger::new(repository),
            games,
            leaderboard_limit,
        }
    }

    /// Registers a user.
    #[instrument(skip(self, email))]
    pub fn register_user(
        &self,
        name: &str,
        email: Option<String>,
    ) -> Result<Confirmation, HangmanError> {
        let user = self.profiles.register(name, email)?;
        Ok(Confirmation::new(format!("User {} created!", user.name())))
    }

    /// Returns a user's profile.
    #[instrument(skip(self))]
    pub fn get_user(&self, name: &str) -> Result<UserProfileView, HangmanError> {
        Ok(UserProfileView::from(&self.profiles.get_user(name)?))
    }

    /// Starts a game for the named user.
    #[instrument(skip(self))]
    pub fn start_game(&self, user_name: &str) -> Result<GameSnapshot, HangmanError> {
        let (game, user) = self.games.start(user_name)?;
        Ok(GameSnapshot::new(&game, &user, "Good luck playing Hangman!"))
    }

    /// Returns the current state of a game.
    #[instrument(skip(self))]
    pub fn get_game(&self, session_ref: &str) -> Result<GameSnapshot, HangmanError> {
        let (game, user) = self.games.get(session_ref)?;
        let message = if *game.game_over() {
            "This game has ended!"
        } else {
            "Game in progress!"
        };
        Ok(GameSnapshot::new(&game, &user, message))
    }

    /// Submits one guess.
    #[instrument(skip(self))]
    pub fn submit_guess(
        &self,
        session_ref: &str,
        guess: &str,
    ) -> Result<GameSnapshot, HangmanError> {
        let (game, user, outcome) = self.games.submit_guess(session_ref, guess)?;
        Ok(GameSnapshot::new(&game, &user, outcome.message()))
    }

    /// Lists a user's finished or unfinished games.
    #[instrument(skip(self))]
    pub fn list_user_games(
        &self,
        user_name: &str,
        completed: bool,
    ) -> Result<Vec<GameSnapshot>, HangmanError> {
        let (user, games) = self.games.list_for_user(user_name, completed)?;
        let message = if completed {
            "Game complete"
        } else {
            "Game in progress"
        };
        Ok(games
            .iter()
            .map(|game| GameSnapshot::new(game, &user, message))
            .collect())
    }

    /// Deletes an unfinished game.
    #[instrument(skip(self))]
    pub fn cancel_game(&self, session_ref: &str) -> Result<Confirmation, HangmanError> {
        let key = self.games.cancel(session_ref)?;
        Ok(Confirmation::new(format!("Game {} deleted.", key)))
    }

    /// Returns the guesses made in a game.
    #[instrument(skip(self))]
    pub fn game_history(&self, session_ref: &str) -> Result<Confirmation, HangmanError> {
        Ok(Confirmation::new(self.games.history_of(session_ref)?))
    }

    /// Users with the highest total score; `None` uses the configured limit.
    #[instrument(skip(self))]
    pub fn leaderboard(&self, limit: Option<u32>) -> Result<Vec<UserRank>, HangmanError> {
        let users = self.profiles.leaderboard(limit.unwrap_or(self.leaderboard_limit))?;
        Ok(users.iter().map(UserRank::from).collect())
    }

    /// Best single-game scores; `None` uses the configured limit.
    #[instrument(skip(self))]
    pub fn high_scores(&self, limit: Option<u32>) -> Result<Vec<ScoreEntry>, HangmanError> {
        let scores = self.ledger.top(limit.unwrap_or(self.leaderboard_limit))?;
        Ok(scores
            .into_iter()
            .map(|(score, name)| ScoreEntry::new(&score, name))
            .collect())
    }

    /// Every user, highest average score first.
    #[instrument(skip(self))]
    pub fn rankings(&self) -> Result<Vec<UserRank>, HangmanError> {
        Ok(self.profiles.rankings()?.iter().map(UserRank::from).collect())
    }

    /// Adds a word to the catalog.
    #[instrument(skip(self))]
    pub fn register_word(&self, word: &str) -> Result<Confirmation, HangmanError> {
        let stored = self.catalog.register_word(word)?;
        Ok(Confirmation::new(format!("Added {} to the list!", stored.word())))
    }

    /// Users to remind about unfinished games.
    #[instrument(skip(self))]
    pub fn pending_reminders(&self) -> Result<Vec<Reminder>, HangmanError> {
        self.games.pending_reminders()
    }
}

