//! Database repository for users, words, games and scores.

use std::collections::HashMap;

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument, warn};

use crate::db::{
    DbError, DbErrorKind, Game, GameChanges, NewGame, NewScore, NewUser, NewWord, Score, User,
    UserStatsChanges, Word, schema,
};
use crate::games::hangman::{Completion, GuessOutcome, Hangman};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Milliseconds a connection waits for a competing writer.
const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Result of removing an unfinished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameRemoval {
    /// The game was deleted.
    Removed,
    /// The game exists but is finished, so it was kept.
    AlreadyOver,
    /// No game has that id.
    Missing,
}

/// Database repository for hangman entities.
#[derive(Debug, Clone)]
pub struct HangmanRepository {
    db_path: String,
}

impl HangmanRepository {
    /// Creates a new repository for the database at the given path.
    ///
    /// Nothing is opened until the first query. Every query opens its own
    /// connection, so `":memory:"` does not persist between calls; use a file.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the path is empty.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, DbError> {
        if db_path.is_empty() {
            return Err(DbError::with_kind(
                DbErrorKind::Connection,
                "Database path is empty",
            ));
        }
        info!(path = %db_path, "Creating HangmanRepository");
        Ok(Self { db_path })
    }

    /// Creates a repository and applies any pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the database cannot be opened or migrated.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn open(db_path: String) -> Result<Self, DbError> {
        let repository = Self::new(db_path)?;
        repository.run_migrations()?;
        Ok(repository)
    }

    /// Applies pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a migration fails.
    #[instrument(skip(self))]
    pub fn run_migrations(&self) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::with_kind(DbErrorKind::Migration, e.to_string()))?;
        info!(count = applied.len(), "Migrations applied");
        Ok(())
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        let mut conn = SqliteConnection::establish(&self.db_path).map_err(|e| {
            DbError::with_kind(
                DbErrorKind::Connection,
                format!("Failed to connect to '{}': {}", self.db_path, e),
            )
        })?;
        conn.batch_execute(&format!(
            "PRAGMA busy_timeout = {BUSY_TIMEOUT_MS}; PRAGMA foreign_keys = ON;"
        ))?;
        Ok(conn)
    }

    /// Inserts a user unless the name is taken.
    ///
    /// Returns `None` when the unique name constraint rejects the row.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] on any other database error.
    #[instrument(skip(self, user))]
    pub fn insert_user(&self, user: NewUser) -> Result<Option<User>, DbError> {
        let mut conn = self.connection()?;
        let inserted = diesel::insert_into(schema::users::table)
            .values(&user)
            .returning(User::as_returning())
            .get_result(&mut conn);
        match absent_on_conflict(inserted)? {
            Some(user) => {
                info!(user_id = user.id(), name = %user.name(), "User created");
                Ok(Some(user))
            }
            None => {
                debug!("User name already taken");
                Ok(None)
            }
        }
    }

    /// Gets a user by name. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_user_by_name(&self, name: &str) -> Result<Option<User>, DbError> {
        let mut conn = self.connection()?;
        let user = schema::users::table
            .filter(schema::users::name.eq(name))
            .select(User::as_select())
            .first(&mut conn)
            .optional()?;
        debug!(found = user.is_some(), "User lookup by name");
        Ok(user)
    }

    /// Gets a user by id. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_user(&self, user_id: i32) -> Result<Option<User>, DbError> {
        let mut conn = self.connection()?;
        Ok(schema::users::table
            .find(user_id)
            .select(User::as_select())
            .first(&mut conn)
            .optional()?)
    }

    /// Lists all users, highest average score first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn users_by_average_score(&self) -> Result<Vec<User>, DbError> {
        let mut conn = self.connection()?;
        let users = schema::users::table
            .order((
                schema::users::average_score.desc(),
                schema::users::name.asc(),
            ))
            .select(User::as_select())
            .load(&mut conn)?;
        info!(count = users.len(), "Users ranked by average score");
        Ok(users)
    }

    /// Lists up to `limit` users, highest total score first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn users_by_total_score(&self, limit: i64) -> Result<Vec<User>, DbError> {
        let mut conn = self.connection()?;
        let users = schema::users::table
            .order((schema::users::total_score.desc(), schema::users::name.asc()))
            .limit(limit)
            .select(User::as_select())
            .load(&mut conn)?;
        info!(count = users.len(), "Users ranked by total score");
        Ok(users)
    }

    /// Applies a game result to a user's aggregates in one transaction.
    ///
    /// `points` only counts for a win. Returns `None` if the user does not
    /// exist.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn record_outcome(
        &self,
        user_id: i32,
        won: bool,
        points: i32,
    ) -> Result<Option<User>, DbError> {
        let mut conn = self.connection()?;
        let user = conn.immediate_transaction::<_, DbError, _>(|conn| {
            let exists = schema::users::table
                .find(user_id)
                .select(schema::users::id)
                .first::<i32>(conn)
                .optional()?
                .is_some();
            if !exists {
                return Ok(None);
            }
            Ok(Some(apply_outcome(conn, user_id, won, points)?))
        })?;
        Ok(user)
    }

    /// Lists users that have an email and at least one unfinished game,
    /// with their unfinished game count.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn users_with_open_games(&self) -> Result<Vec<(User, i64)>, DbError> {
        let mut conn = self.connection()?;
        let users = schema::users::table
            .filter(schema::users::email.is_not_null())
            .order(schema::users::name.asc())
            .select(User::as_select())
            .load(&mut conn)?;
        let ids: Vec<i32> = users.iter().map(|u| *u.id()).collect();
        let owners = schema::games::table
            .filter(schema::games::game_over.eq(false))
            .filter(schema::games::user_id.eq_any(ids))
            .select(schema::games::user_id)
            .load::<i32>(&mut conn)?;

        let mut counts: HashMap<i32, i64> = HashMap::new();
        for owner in owners {
            *counts.entry(owner).or_default() += 1;
        }
        let pending: Vec<(User, i64)> = users
            .into_iter()
            .filter_map(|u| counts.get(u.id()).map(|&n| (u, n)))
            .collect();
        info!(count = pending.len(), "Users with open games loaded");
        Ok(pending)
    }

    /// Inserts a word unless it is already in the catalog.
    ///
    /// Returns `None` when the unique word constraint rejects the row.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] on any other database error.
    #[instrument(skip(self), fields(word = %word.word()))]
    pub fn insert_word(&self, word: NewWord) -> Result<Option<Word>, DbError> {
        let mut conn = self.connection()?;
        let inserted = diesel::insert_into(schema::words::table)
            .values(&word)
            .returning(Word::as_returning())
            .get_result(&mut conn);
        let word = absent_on_conflict(inserted)?;
        if let Some(ref w) = word {
            info!(word_id = w.id(), "Word added");
        }
        Ok(word)
    }

    /// Counts the words in the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn count_words(&self) -> Result<i64, DbError> {
        let mut conn = self.connection()?;
        Ok(schema::words::table.count().get_result(&mut conn)?)
    }

    /// Gets the word at `offset` in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn word_at(&self, offset: i64) -> Result<Option<Word>, DbError> {
        let mut conn = self.connection()?;
        Ok(schema::words::table
            .order(schema::words::id.asc())
            .offset(offset)
            .select(Word::as_select())
            .first(&mut conn)
            .optional()?)
    }

    /// Inserts a new game.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self, game), fields(user_id = game.user_id()))]
    pub fn insert_game(&self, game: NewGame) -> Result<Game, DbError> {
        let mut conn = self.connection()?;
        let game = diesel::insert_into(schema::games::table)
            .values(&game)
            .returning(Game::as_returning())
            .get_result(&mut conn)?;
        info!(game_id = game.id(), "Game created");
        Ok(game)
    }

    /// Gets a game by id. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_game(&self, game_id: i32) -> Result<Option<Game>, DbError> {
        let mut conn = self.connection()?;
        Ok(schema::games::table
            .find(game_id)
            .select(Game::as_select())
            .first(&mut conn)
            .optional()?)
    }

    /// Lists a user's games with the given `game_over` flag, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list_games(&self, user_id: i32, game_over: bool) -> Result<Vec<Game>, DbError> {
        let mut conn = self.connection()?;
        let games = schema::games::table
            .filter(schema::games::user_id.eq(user_id))
            .filter(schema::games::game_over.eq(game_over))
            .order(schema::games::id.asc())
            .select(Game::as_select())
            .load(&mut conn)?;
        info!(user_id, game_over, count = games.len(), "Games loaded");
        Ok(games)
    }

    /// Deletes a game if it is unfinished.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn remove_open_game(&self, game_id: i32) -> Result<GameRemoval, DbError> {
        let mut conn = self.connection()?;
        let removal = conn.immediate_transaction::<_, DbError, _>(|conn| {
            let game_over = schema::games::table
                .find(game_id)
                .select(schema::games::game_over)
                .first::<bool>(conn)
                .optional()?;
            match game_over {
                None => Ok(GameRemoval::Missing),
                Some(true) => Ok(GameRemoval::AlreadyOver),
                Some(false) => {
                    diesel::delete(schema::games::table.find(game_id)).execute(conn)?;
                    Ok(GameRemoval::Removed)
                }
            }
        })?;
        info!(game_id, ?removal, "Game removal attempted");
        Ok(removal)
    }

    /// Runs one turn against a stored game inside a single write transaction.
    ///
    /// The game row is loaded, handed to `turn`, and written back if the turn
    /// changed it. When the turn ends the game, the score row and the owner's
    /// aggregates are written in the same transaction. Returns `None` if the
    /// game does not exist; an error from `turn` leaves the database untouched.
    ///
    /// # Errors
    ///
    /// Returns the error from `turn`, or a database error.
    #[instrument(skip(self, turn))]
    pub fn play_turn<E, F>(&self, game_id: i32, turn: F) -> Result<Option<(Game, GuessOutcome)>, E>
    where
        F: FnOnce(&mut Hangman) -> Result<GuessOutcome, E>,
        E: From<DbError> + From<DieselError>,
    {
        let mut conn = self.connection()?;
        conn.immediate_transaction::<_, E, _>(|conn| {
            let Some(game) = schema::games::table
                .find(game_id)
                .select(Game::as_select())
                .first(conn)
                .optional()?
            else {
                return Ok(None);
            };

            let mut hangman = game.to_hangman()?;
            let outcome = turn(&mut hangman)?;
            if !outcome.is_mutation() {
                return Ok(Some((game, outcome)));
            }

            let updated = diesel::update(schema::games::table.find(game_id))
                .set(GameChanges::from(&hangman))
                .returning(Game::as_returning())
                .get_result(conn)?;

            if let Some(completion) = outcome.completion() {
                let score = NewScore::new(*game.user_id(), game_id, completion);
                diesel::insert_into(schema::scores::table)
                    .values(&score)
                    .execute(conn)?;
                apply_outcome(conn, *game.user_id(), completion.won, completion.points)?;
                info!(game_id, won = completion.won, points = completion.points, "Game completed");
            }
            Ok(Some((updated, outcome)))
        })
    }

    /// Appends a score row for a finished game.
    ///
    /// Returns `None` if the game does not exist or has not ended; the game
    /// is checked in the same transaction as the insert.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs, including a second
    /// score for the same game.
    #[instrument(skip(self, score), fields(game_id = score.game_id()))]
    pub fn insert_score(&self, score: NewScore) -> Result<Option<Score>, DbError> {
        let mut conn = self.connection()?;
        let score = conn.immediate_transaction::<_, DbError, _>(|conn| {
            let game_over = schema::games::table
                .find(*score.game_id())
                .select(schema::games::game_over)
                .first::<bool>(conn)
                .optional()?;
            if game_over != Some(true) {
                debug!(?game_over, "Score refused for unfinished game");
                return Ok(None);
            }
            let score = diesel::insert_into(schema::scores::table)
                .values(&score)
                .returning(Score::as_returning())
                .get_result(conn)?;
            Ok(Some(score))
        })?;
        if let Some(ref s) = score {
            info!(score_id = s.id(), points = s.points(), "Score recorded");
        }
        Ok(score)
    }

    /// Lists up to `limit` scores with their owner's name, most points first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn top_scores(&self, limit: i64) -> Result<Vec<(Score, String)>, DbError> {
        let mut conn = self.connection()?;
        let scores = schema::scores::table
            .inner_join(schema::users::table)
            .order((schema::scores::points.desc(), schema::scores::id.asc()))
            .limit(limit)
            .select((Score::as_select(), schema::users::name))
            .load::<(Score, String)>(&mut conn)?;
        info!(count = scores.len(), "Top scores loaded");
        Ok(scores)
    }

    /// Lists a user's scores, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn scores_for_user(&self, user_id: i32) -> Result<Vec<Score>, DbError> {
        let mut conn = self.connection()?;
        Ok(schema::scores::table
            .filter(schema::scores::user_id.eq(user_id))
            .order(schema::scores::id.desc())
            .select(Score::as_select())
            .load(&mut conn)?)
    }
}

/// Maps a unique-constraint rejection to `None`.
fn absent_on_conflict<T>(result: Result<T, DieselError>) -> Result<Option<T>, DbError> {
    match result {
        Ok(row) => Ok(Some(row)),
        Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            warn!("Unique constraint rejected insert");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Loads a user, applies the result and writes the aggregates back.
fn apply_outcome(
    conn: &mut SqliteConnection,
    user_id: i32,
    won: bool,
    points: i32,
) -> Result<User, DieselError> {
    let mut user = schema::users::table
        .find(user_id)
        .select(User::as_select())
        .first(conn)?;
    user.apply(won, points);
    let user = diesel::update(schema::users::table.find(user_id))
        .set(UserStatsChanges::from(&user))
        .returning(User::as_returning())
        .get_result(conn)?;
    debug!(
        user_id,
        wins = user.wins(),
        total_played = user.total_played(),
        "User aggregates updated"
    );
    Ok(user)
}
