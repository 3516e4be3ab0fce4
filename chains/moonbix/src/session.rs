//! Session protocol driver
//!
//! Drives one account through one game:
//!
//! ```text
//! Idle --accessToken--> TokenFetched --game/start--> GameStarted --game/complete--> Completed
//!   \                        \                            \
//!    `------------------------`----------------------------`------> Failed
//! ```
//!
//! A driver is built fresh for each account on each cycle and consumed by
//! [`SessionDriver::run`]. No step is retried; any error ends the run in
//! [`SessionState::Failed`] and is logged, never returned.

use crate::config::MoonbixConfig;
use crate::payload;
use crate::trace::TraceGenerator;
use core_logic::{
    AccountCredential, Clock, CoreError, HttpTransport, ProtocolError, SESSION_TARGET,
};
use rand::{CryptoRng, RngCore};
use serde_json::{Value, json};
use std::fmt;
use tracing::{debug, error, info};

pub const GROWTH_TOKEN_HEADER: &str = "X-Growth-Token";
pub const START_SUCCESS_CODE: &str = "000000";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStep {
    /// Building the HTTP client for the account, before any request.
    BuildClient,
    Authenticate,
    StartSession,
    Simulate,
    CompleteSession,
}

impl SessionStep {
    pub(crate) fn failure_message(self) -> &'static str {
        match self {
            SessionStep::BuildClient => "Failed to build HTTP client",
            SessionStep::Authenticate => "Failed to fetch access token",
            SessionStep::StartSession => "Unable to start game",
            SessionStep::Simulate => "Failed to build game payload",
            SessionStep::CompleteSession => "Failed to complete the game",
        }
    }
}

impl fmt::Display for SessionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionStep::BuildClient => "client",
            SessionStep::Authenticate => "authenticate",
            SessionStep::StartSession => "start",
            SessionStep::Simulate => "simulate",
            SessionStep::CompleteSession => "complete",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    TokenFetched,
    GameStarted,
    /// The completion call was answered; `success` is the server's verdict.
    Completed { success: bool },
    Failed { step: SessionStep, reason: String },
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Completed { .. } | SessionState::Failed { .. }
        )
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SessionState::Completed { success: true })
    }
}

/// Per-account, per-cycle state. Filled strictly in protocol order.
#[derive(Debug, Default)]
struct SessionContext {
    access_token: Option<String>,
    game_tag: Option<String>,
}

pub struct SessionDriver<'a> {
    transport: &'a dyn HttpTransport,
    config: &'a MoonbixConfig,
    clock: &'a dyn Clock,
    state: SessionState,
    context: SessionContext,
}

impl<'a> SessionDriver<'a> {
    pub fn new(
        transport: &'a dyn HttpTransport,
        config: &'a MoonbixConfig,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            transport,
            config,
            clock,
            state: SessionState::Idle,
            context: SessionContext::default(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Runs the four steps and returns the terminal state.
    pub async fn run<R: RngCore + CryptoRng + Send>(
        mut self,
        credential: &AccountCredential,
        rng: &mut R,
    ) -> SessionState {
        match self.fetch_access_token(credential).await {
            Ok(token) => {
                self.context.access_token = Some(token);
                self.transition(SessionState::TokenFetched);
            }
            Err(e) => return self.fail(SessionStep::Authenticate, e),
        }

        match self.start_game().await {
            Ok(game_tag) => {
                info!(target: SESSION_TARGET, "Game started successfully");
                self.context.game_tag = Some(game_tag);
                self.transition(SessionState::GameStarted);
            }
            Err(e) => return self.fail(SessionStep::StartSession, e),
        }

        let payload = match self.simulate(rng) {
            Ok(payload) => payload,
            Err(e) => return self.fail(SessionStep::Simulate, e),
        };

        match self.complete_game(payload).await {
            Ok(true) => {
                info!(target: SESSION_TARGET, "Game completed successfully");
                self.transition(SessionState::Completed { success: true });
            }
            Ok(false) => {
                error!(target: SESSION_TARGET, "Game completion failed");
                self.transition(SessionState::Completed { success: false });
            }
            Err(e) => return self.fail(SessionStep::CompleteSession, e),
        }

        self.state
    }

    async fn fetch_access_token(&self, credential: &AccountCredential) -> Result<String, CoreError> {
        let body = json!({
            "queryString": credential.as_str(),
            "socialType": "telegram",
        });
        let response = self
            .transport
            .post_json(&self.config.access_token_url(), &[], &body)
            .await?;

        non_empty_str(&response, "/data/accessToken")
            .map(str::to_string)
            .ok_or_else(|| missing(SessionStep::Authenticate, "data.accessToken"))
    }

    async fn start_game(&self) -> Result<String, CoreError> {
        let token = self.access_token(SessionStep::StartSession)?;
        let body = json!({ "resourceId": self.config.resource_id });
        let response = self
            .transport
            .post_json(
                &self.config.game_start_url(),
                &[(GROWTH_TOKEN_HEADER, token)],
                &body,
            )
            .await?;

        let code = response.get("code").and_then(Value::as_str);
        if code != Some(START_SUCCESS_CODE) {
            return Err(ProtocolError::UnexpectedCode {
                step: SessionStep::StartSession.to_string(),
                code: code.map(str::to_string),
            }
            .into());
        }

        non_empty_str(&response, "/data/gameTag")
            .map(str::to_string)
            .ok_or_else(|| missing(SessionStep::StartSession, "data.gameTag"))
    }

    /// Local only: builds the trace and encrypts it under the game tag.
    fn simulate<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Result<String, CoreError> {
        let game_tag = self
            .context
            .game_tag
            .as_deref()
            .ok_or_else(|| missing(SessionStep::Simulate, "gameTag"))?;

        let trace = TraceGenerator::new(self.clock).generate(self.config.game_duration_ms, rng);
        debug!("Generated trace with {} events", trace.len());

        Ok(payload::encode(&trace, game_tag, rng)?.into_wire())
    }

    async fn complete_game(&self, payload: String) -> Result<bool, CoreError> {
        let token = self.access_token(SessionStep::CompleteSession)?;
        let body = json!({
            "resourceId": self.config.resource_id,
            "payload": payload,
        });
        let response = self
            .transport
            .post_json(
                &self.config.game_complete_url(),
                &[(GROWTH_TOKEN_HEADER, token)],
                &body,
            )
            .await?;

        Ok(response
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(false))
    }

    fn access_token(&self, step: SessionStep) -> Result<&str, CoreError> {
        self.context
            .access_token
            .as_deref()
            .ok_or_else(|| missing(step, "accessToken"))
    }

    fn transition(&mut self, next: SessionState) {
        debug!("Session {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn fail(mut self, step: SessionStep, err: CoreError) -> SessionState {
        error!(
            target: SESSION_TARGET,
            "{} ({} step): {}",
            step.failure_message(),
            step,
            err
        );
        self.transition(SessionState::Failed {
            step,
            reason: err.to_string(),
        });
        self.state
    }
}

fn non_empty_str<'v>(value: &'v Value, pointer: &str) -> Option<&'v str> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn missing(step: SessionStep, field: &str) -> CoreError {
    ProtocolError::MissingField {
        step: step.to_string(),
        field: field.to_string(),
    }
    .into()
}
