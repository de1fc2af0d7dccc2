//! Database models and domain types.

use chrono::{NaiveDate, NaiveDateTime, Utc};
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use tracing::{debug, instrument};

use crate::db::{DbError, schema};
use crate::games::hangman::{Completion, GameStatus, Hangman};

/// User profile database model.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::users)]
pub struct User {
    id: i32,
    name: String,
    email: Option<String>,
    wins: i32,
    total_played: i32,
    total_score: i32,
    average_score: f64,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl User {
    /// Counts a won game worth `points`.
    #[instrument(skip(self), fields(user = %self.name))]
    pub fn record_win(&mut self, points: i32) {
        self.total_score += points;
        self.wins += 1;
        self.total_played += 1;
        self.recompute_average();
    }

    /// Counts a lost game. The total score is unchanged.
    #[instrument(skip(self), fields(user = %self.name))]
    pub fn record_loss(&mut self) {
        self.total_played += 1;
        self.recompute_average();
    }

    /// Applies a game result to the aggregates. Losses carry no points.
    pub fn apply(&mut self, won: bool, points: i32) {
        if won {
            self.record_win(points);
        } else {
            self.record_loss();
        }
    }

    fn recompute_average(&mut self) {
        self.average_score = if self.total_played == 0 {
            0.0
        } else {
            f64::from(self.total_score) / f64::from(self.total_played)
        };
        debug!(
            total_score = self.total_score,
            total_played = self.total_played,
            average = self.average_score,
            "Average recomputed"
        );
    }
}

/// Insertable user model for creating new users.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::users)]
pub struct NewUser {
    name: String,
    email: Option<String>,
}

/// Aggregate columns written back after a game completes.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = schema::users)]
pub struct UserStatsChanges {
    wins: i32,
    total_played: i32,
    total_score: i32,
    average_score: f64,
    updated_at: NaiveDateTime,
}

impl From<&User> for UserStatsChanges {
    fn from(user: &User) -> Self {
        Self {
            wins: user.wins,
            total_played: user.total_played,
            total_score: user.total_score,
            average_score: user.average_score,
            updated_at: Utc::now().naive_utc(),
        }
    }
}

/// Catalog word database model. The word is stored uppercase.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::words)]
pub struct Word {
    id: i32,
    word: String,
    created_at: NaiveDateTime,
}

impl Word {
    /// The word split into its letters.
    pub fn letters(&self) -> Vec<char> {
        self.word.chars().collect()
    }
}

/// Insertable word model.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::words)]
pub struct NewWord {
    word: String,
}

/// Game session database model.
///
/// Letter sequences are stored as plain strings, one character per letter.
#[derive(Debug, Clone, Queryable, Identifiable, Associations, Selectable, Getters)]
#[diesel(table_name = schema::games)]
#[diesel(belongs_to(User))]
pub struct Game {
    id: i32,
    user_id: i32,
    target: String,
    answer: String,
    history: String,
    failed_tries: String,
    attempts_remaining: i32,
    status: String,
    game_over: bool,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl Game {
    /// Parses the stored status string into a [`GameStatus`].
    #[instrument(skip(self), fields(status = %self.status))]
    pub fn parse_status(&self) -> Result<GameStatus, DbError> {
        self.status
            .parse()
            .map_err(|_| DbError::new(format!("Invalid status: '{}'", self.status)))
    }

    /// Rebuilds the puzzle state stored in this row.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the stored status is unknown or the letters are
    /// inconsistent.
    #[instrument(skip(self), fields(game_id = self.id))]
    pub fn to_hangman(&self) -> Result<Hangman, DbError> {
        Hangman::restore(
            self.target.chars().collect(),
            self.answer.chars().collect(),
            self.history.chars().collect(),
            self.failed_tries.chars().collect(),
            self.attempts_remaining,
            self.parse_status()?,
        )
        .ok_or_else(|| DbError::new(format!("Game {} has inconsistent letters", self.id)))
    }
}

/// Insertable game model for starting a session.
#[derive(Debug, Clone, Insertable, Getters)]
#[diesel(table_name = schema::games)]
pub struct NewGame {
    user_id: i32,
    target: String,
    answer: String,
    attempts_remaining: i32,
    status: String,
    game_over: bool,
}

impl NewGame {
    /// Builds the row for a fresh puzzle owned by `user_id`.
    pub fn new(user_id: i32, hangman: &Hangman) -> Self {
        Self {
            user_id,
            target: hangman.word(),
            answer: hangman.answer_text(),
            attempts_remaining: hangman.attempts_remaining(),
            status: hangman.status().to_string(),
            game_over: hangman.is_over(),
        }
    }
}

/// Mutable game columns written back after a guess.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = schema::games)]
pub struct GameChanges {
    answer: String,
    history: String,
    failed_tries: String,
    attempts_remaining: i32,
    status: String,
    game_over: bool,
    updated_at: NaiveDateTime,
}

impl From<&Hangman> for GameChanges {
    fn from(hangman: &Hangman) -> Self {
        Self {
            answer: hangman.answer_text(),
            history: hangman.history().iter().collect(),
            failed_tries: hangman.failed_tries().iter().collect(),
            attempts_remaining: hangman.attempts_remaining(),
            status: hangman.status().to_string(),
            game_over: hangman.is_over(),
            updated_at: Utc::now().naive_utc(),
        }
    }
}

/// Completed game score database model.
#[derive(Debug, Clone, Queryable, Identifiable, Associations, Selectable, Getters)]
#[diesel(table_name = schema::scores)]
#[diesel(belongs_to(User))]
pub struct Score {
    id: i32,
    user_id: i32,
    game_id: i32,
    played_on: NaiveDate,
    won: bool,
    guesses: i32,
    points: i32,
}

/// Insertable score model, written once per completed game.
#[derive(Debug, Clone, Insertable, Getters)]
#[diesel(table_name = schema::scores)]
pub struct NewScore {
    user_id: i32,
    game_id: i32,
    played_on: NaiveDate,
    won: bool,
    guesses: i32,
    points: i32,
}

impl NewScore {
    /// Builds the score row for a game that ended today.
    pub fn new(user_id: i32, game_id: i32, completion: Completion) -> Self {
        Self {
            user_id,
            game_id,
            played_on: Utc::now().date_naive(),
            won: completion.won,
            guesses: completion.guesses,
            points: completion.points,
        }
    }
}
