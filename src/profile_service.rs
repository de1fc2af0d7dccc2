//! Profile management business logic layer.

use tracing::{debug, info, instrument};

use crate::{HangmanError, HangmanRepository, NewUser, User};

/// Number of users on a leaderboard when no limit is given.
pub const DEFAULT_LEADERBOARD_LIMIT: u32 = 10;

/// Service layer for user profile operations.
///
/// Wraps [`HangmanRepository`] with registration rules and the aggregate
/// bookkeeping applied when a game completes.
#[derive(Debug, Clone)]
pub struct ProfileService {
    repository: HangmanRepository,
}

impl ProfileService {
    /// Creates a new profile service backed by the given repository.
    #[instrument(skip(repository))]
    pub fn new(repository: HangmanRepository) -> Self {
        info!("Creating ProfileService");
        Self { repository }
    }

    /// Registers a new user with zeroed statistics.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for an empty name and `Conflict` if the name is
    /// already registered.
    #[instrument(skip(self, email))]
    pub fn register(&self, name: &str, email: Option<String>) -> Result<User, HangmanError> {
        if name.is_empty() {
            return Err(HangmanError::invalid_input("A user name is required"));
        }
        let email = email.filter(|e| !e.is_empty());
        debug!(has_email = email.is_some(), "Registering user");

        self.repository
            .insert_user(NewUser::new(name.to_string(), email))?
            .ok_or_else(|| HangmanError::conflict("A user with that name already exists!"))
    }

    /// Looks up a user by exact name.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no user has that name.
    #[instrument(skip(self))]
    pub fn get_user(&self, name: &str) -> Result<User, HangmanError> {
        self.repository
            .get_user_by_name(name)?
            .ok_or_else(|| HangmanError::not_found("A user with that name does not exist!"))
    }

    /// Counts a win worth `points` for the user.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist.
    #[instrument(skip(self))]
    pub fn record_win(&self, user_id: i32, points: i32) -> Result<User, HangmanError> {
        self.record(user_id, true, points)
    }

    /// Counts a loss for the user.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist.
    #[instrument(skip(self))]
    pub fn record_loss(&self, user_id: i32) -> Result<User, HangmanError> {
        self.record(user_id, false, 0)
    }

    fn record(&self, user_id: i32, won: bool, points: i32) -> Result<User, HangmanError> {
        self.repository
            .record_outcome(user_id, won, points)?
            .ok_or_else(|| HangmanError::not_found(format!("No user with id {}", user_id)))
    }

    /// Returns every user, highest average score first.
    #[instrument(skip(self))]
    pub fn rankings(&self) -> Result<Vec<User>, HangmanError> {
        Ok(self.repository.users_by_average_score()?)
    }

    /// Returns up to `limit` users, highest total score first.
    #[instrument(skip(self))]
    pub fn leaderboard(&self, limit: u32) -> Result<Vec<User>, HangmanError> {
        Ok(self.repository.users_by_total_score(i64::from(limit))?)
    }
}
