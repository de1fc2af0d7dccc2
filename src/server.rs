//! MCP server exposing the hangman operations as tools.

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, ServerCapabilities, ServerInfo};
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use crate::{HangmanApi, HangmanError, HangmanErrorKind};

/// Request for registering a user.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RegisterUserRequest {
    /// Unique user name.
    pub user_name: String,
    /// Optional contact address.
    #[serde(default)]
    pub email: Option<String>,
}

/// Request naming a user.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UserRequest {
    /// User name.
    pub user_name: String,
}

/// Request for listing a user's games.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ListGamesRequest {
    /// User name.
    pub user_name: String,
    /// List finished games instead of games in progress.
    #[serde(default)]
    pub completed: bool,
}

/// Request naming a game.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GameRequest {
    /// Game reference returned by `start_game`.
    pub session_ref: String,
}

/// Request for guessing a letter.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GuessRequest {
    /// Game reference returned by `start_game`.
    pub session_ref: String,
    /// A single letter A-Z, either case.
    pub guess: String,
}

/// Request with an optional result limit.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LimitRequest {
    /// Maximum rows to return.
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Request for adding a catalog word.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WordRequest {
    /// A single word of letters A-Z.
    pub word: String,
}

/// Main server handler.
pub struct HangmanServer {
    api: HangmanApi,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl HangmanServer {
    /// Creates a server dispatching to the given API.
    #[instrument(skip(api))]
    pub fn new(api: HangmanApi) -> Self {
        info!("Creating hangman server");
        Self {
            api,
            tool_router: Self::tool_router(),
        }
    }

    /// Registers a user.
    #[instrument(skip(self, req), fields(user_name = %req.user_name))]
    #[tool(description = "Register a new player with a unique name and an optional email.")]
    pub async fn register_user(
        &self,
        Parameters(req): Parameters<RegisterUserRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.call(move |api| api.register_user(&req.user_name, req.email)).await
    }

    /// Returns a user's profile.
    #[instrument(skip(self, req), fields(user_name = %req.user_name))]
    #[tool(description = "Get a player's profile and statistics.")]
    pub async fn get_user(
        &self,
        Parameters(req): Parameters<UserRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.call(move |api| api.get_user(&req.user_name)).await
    }

    /// Starts a game.
    #[instrument(skip(self, req), fields(user_name = %req.user_name))]
    #[tool(description = "Start a new hangman game for a player. Returns the game reference.")]
    pub async fn start_game(
        &self,
        Parameters(req): Parameters<UserRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.call(move |api| api.start_game(&req.user_name)).await
    }

    /// Returns a game's state.
    #[instrument(skip(self, req), fields(session_ref = %req.session_ref))]
    #[tool(description = "Get the current state of a game.")]
    pub async fn get_game(
        &self,
        Parameters(req): Parameters<GameRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.call(move |api| api.get_game(&req.session_ref)).await
    }

    /// Guesses a letter.
    #[instrument(skip(self, req), fields(session_ref = %req.session_ref))]
    #[tool(description = "Guess one letter in a game. Seven wrong guesses lose the game.")]
    pub async fn submit_guess(
        &self,
        Parameters(req): Parameters<GuessRequest>,
    ) -> Result<CallToolResult, McpError> {
        debug!(guess = %req.guess, "Processing guess");
        self.call(move |api| api.submit_guess(&req.session_ref, &req.guess)).await
    }

    /// Lists a user's games.
    #[instrument(skip(self, req), fields(user_name = %req.user_name, completed = req.completed))]
    #[tool(
        description = "List a player's games in progress, or finished games when completed is true."
    )]
    pub async fn list_user_games(
        &self,
        Parameters(req): Parameters<ListGamesRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.call(move |api| api.list_user_games(&req.user_name, req.completed)).await
    }

    /// Cancels an unfinished game.
    #[instrument(skip(self, req), fields(session_ref = %req.session_ref))]
    #[tool(description = "Delete a game that has not ended yet.")]
    pub async fn cancel_game(
        &self,
        Parameters(req): Parameters<GameRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.call(move |api| api.cancel_game(&req.session_ref)).await
    }

    /// Returns a game's guesses.
    #[instrument(skip(self, req), fields(session_ref = %req.session_ref))]
    #[tool(description = "Get the letters guessed in a game, in order.")]
    pub async fn game_history(
        &self,
        Parameters(req): Parameters<GameRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.call(move |api| api.game_history(&req.session_ref)).await
    }

    /// Top users by total score.
    #[instrument(skip(self, req))]
    #[tool(description = "Players with the highest total score (default 10).")]
    pub async fn leaderboard(
        &self,
        Parameters(req): Parameters<LimitRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.call(move |api| api.leaderboard(req.limit)).await
    }

    /// Top single-game scores.
    #[instrument(skip(self, req))]
    #[tool(description = "Finished games with the most points (default 10).")]
    pub async fn high_scores(
        &self,
        Parameters(req): Parameters<LimitRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.call(move |api| api.high_scores(req.limit)).await
    }

    /// All users by average score.
    #[instrument(skip(self))]
    #[tool(description = "All players ranked by average score per game.")]
    pub async fn rankings(&self) -> Result<CallToolResult, McpError> {
        self.call(move |api| api.rankings()).await
    }

    /// Adds a catalog word.
    #[instrument(skip(self, req))]
    #[tool(description = "Add a word (letters A-Z only) to the list of possible targets.")]
    pub async fn register_word(
        &self,
        Parameters(req): Parameters<WordRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.call(move |api| api.register_word(&req.word)).await
    }

    /// Users with unfinished games and an email.
    #[instrument(skip(self))]
    #[tool(description = "Players with an email address who have unfinished games.")]
    pub async fn pending_reminders(&self) -> Result<CallToolResult, McpError> {
        self.call(move |api| api.pending_reminders()).await
    }
}

impl HangmanServer {
    /// Runs an operation on the blocking pool and serializes its result.
    ///
    /// Every operation opens its own SQLite connection and may wait on a
    /// competing writer, so none of it runs on a runtime worker.
    async fn call<T, F>(&self, op: F) -> Result<CallToolResult, McpError>
    where
        T: Serialize + Send + 'static,
        F: FnOnce(HangmanApi) -> Result<T, HangmanError> + Send + 'static,
    {
        let api = self.api.clone();
        let result = tokio::task::spawn_blocking(move || op(api))
            .await
            .map_err(|e| {
                error!(error = %e, "Blocking operation failed");
                McpError::internal_error("Operation did not complete", None)
            })?;
        respond(result)
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for HangmanServer {
    fn get_info(&self) -> ServerInfo {
        let mut info = ServerInfo::default();
        info.instructions = Some(
            "Hangman game server: register a player, add words, then start a game and guess letters"
                .into(),
        );
        info.capabilities = ServerCapabilities::builder().enable_tools().build();
        info
    }
}

/// Serializes a successful result, or maps the failure to an MCP error.
fn respond<T: Serialize>(result: Result<T, HangmanError>) -> Result<CallToolResult, McpError> {
    let value = result.map_err(to_mcp_error)?;
    let text = serde_json::to_string_pretty(&value).map_err(|e| {
        error!(error = %e, "Failed to serialize response");
        McpError::internal_error(format!("Failed to serialize response: {}", e), None)
    })?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

/// Caller mistakes become `invalid_params` and an empty catalog is
/// `invalid_request`. Storage failures are logged in full but reported
/// without detail.
fn to_mcp_error(err: HangmanError) -> McpError {
    match err.kind() {
        HangmanErrorKind::Database(_) => {
            error!(error = %err, "Operation failed");
            McpError::internal_error("Storage error", None)
        }
        HangmanErrorKind::Unavailable(message) => {
            warn!(error = %err, "Request cannot be served");
            McpError::invalid_request(message.clone(), None)
        }
        kind => {
            warn!(error = %err, "Request rejected");
            McpError::invalid_params(kind.to_string(), None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::ErrorCode;

    #[test]
    fn storage_errors_hide_details() {
        let err = to_mcp_error(HangmanError::new(HangmanErrorKind::Database(
            "Database error: disk I/O error at src/db/repository.rs:90".to_string(),
        )));
        assert_eq!(err.code, ErrorCode::INTERNAL_ERROR);
        assert_eq!(err.message, "Storage error");
    }

    #[test]
    fn empty_catalog_is_a_request_error() {
        let err = to_mcp_error(HangmanError::unavailable("No words are registered"));
        assert_eq!(err.code, ErrorCode::INVALID_REQUEST);
        assert!(err.message.contains("No words are registered"));
    }

    #[test]
    fn caller_faults_are_invalid_params() {
        let err = to_mcp_error(HangmanError::not_found("Game not found!"));
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert!(err.message.contains("Game not found!"));
    }
}
