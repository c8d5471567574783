//! Policy simulation sessions.
//!
//! A [`Session`] holds the transcript of one conversation with a single
//! policy. It is a plain state machine: submitting a turn is split into
//! [`Session::begin_turn`], which records the user message and hands out a
//! [`TurnRequest`], and [`Session::finish_turn`], which records the outcome.
//! [`Simulator`] drives both halves against an [`Assistant`] without holding
//! the session lock across the model call.
//!
//! Every reset bumps the session generation. Tickets carry the generation
//! they were issued for, so a response that arrives after the user switched
//! policy or cleared the conversation is discarded instead of being mixed into
//! the new transcript.

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, info, warn};
use warden_claude::Assistant;
use warden_policy::{ChatMessage, Policy};

/// Whether a chat turn is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    /// Ready for input.
    Idle,
    /// A user turn was sent and its reply is pending.
    AwaitingResponse,
}

/// Whether suggested test prompts are available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionState {
    /// Prompts were requested for the current generation.
    Loading,
    /// Prompts are available.
    Ready,
}

/// Why a turn was refused. A rejected turn changes nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    /// The text was empty or whitespace.
    #[error("message is empty")]
    EmptyInput,
    /// Another turn is awaiting its reply.
    #[error("a reply is still pending")]
    Busy,
}

/// Identifies the session generation a suggestion request belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionTicket {
    policy_id: String,
    generation: u64,
}

/// Identifies the session generation a chat turn belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnTicket {
    policy_id: String,
    generation: u64,
}

/// Everything needed to ask the model for the next reply.
#[derive(Debug, Clone)]
pub struct TurnRequest {
    /// Ticket to hand back to [`Session::finish_turn`].
    pub ticket: TurnTicket,
    /// Policy the reply must follow.
    pub policy: Policy,
    /// Full transcript, ending with the new user turn.
    pub transcript: Vec<ChatMessage>,
}

/// Result of finishing a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The reply was appended to the transcript.
    Replied(String),
    /// The model call failed; nothing was appended.
    Failed(String),
    /// The session was reset while the turn was in flight.
    Discarded,
}

/// One conversation with one policy.
#[derive(Debug, Clone)]
pub struct Session {
    policy: Policy,
    generation: u64,
    transcript: Vec<ChatMessage>,
    turn: TurnState,
    suggestion_state: SuggestionState,
    suggestions: Vec<String>,
}

impl Session {
    /// Opens a session for `policy` with suggestions still to be loaded.
    #[must_use]
    pub const fn new(policy: Policy) -> Self {
        Self {
            policy,
            generation: 0,
            transcript: Vec::new(),
            turn: TurnState::Idle,
            suggestion_state: SuggestionState::Loading,
            suggestions: Vec::new(),
        }
    }

    /// The active policy.
    pub const fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Messages in append order.
    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Suggested test prompts; empty while loading.
    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    /// Current turn state.
    pub const fn turn_state(&self) -> TurnState {
        self.turn
    }

    /// Current suggestion state.
    pub const fn suggestion_state(&self) -> SuggestionState {
        self.suggestion_state
    }

    /// Number of resets since the session was opened.
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Ticket for loading suggestions, if the current generation still needs them.
    pub fn pending_suggestions(&self) -> Option<SuggestionTicket> {
        (self.suggestion_state == SuggestionState::Loading).then(|| SuggestionTicket {
            policy_id: self.policy.id.clone(),
            generation: self.generation,
        })
    }

    /// Starts over with `policy`.
    ///
    /// Clears the transcript and the suggestions and starts a new generation.
    /// A turn still in flight from the previous generation will be discarded
    /// when it finishes.
    pub fn reset(&mut self, policy: Policy) -> SuggestionTicket {
        self.generation += 1;
        info!(
            "Resetting session to policy {} (generation {})",
            policy.id, self.generation
        );
        self.policy = policy;
        self.transcript.clear();
        self.turn = TurnState::Idle;
        self.suggestion_state = SuggestionState::Loading;
        self.suggestions.clear();
        SuggestionTicket {
            policy_id: self.policy.id.clone(),
            generation: self.generation,
        }
    }

    /// Stores suggestions fetched for `ticket`.
    ///
    /// Returns false, leaving the session untouched, when the ticket belongs
    /// to an earlier generation or another policy.
    pub fn accept_suggestions(&mut self, ticket: &SuggestionTicket, prompts: Vec<String>) -> bool {
        if !self.is_current(&ticket.policy_id, ticket.generation) {
            debug!(
                "Discarding suggestions for policy {} (generation {})",
                ticket.policy_id, ticket.generation
            );
            return false;
        }
        self.suggestions = prompts;
        self.suggestion_state = SuggestionState::Ready;
        true
    }

    /// Records a user message and enters [`TurnState::AwaitingResponse`].
    ///
    /// The text is stored as typed.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::EmptyInput`] for blank text and
    /// [`Rejection::Busy`] while another turn is pending. Either way the
    /// session is unchanged.
    pub fn begin_turn(&mut self, text: &str) -> Result<TurnRequest, Rejection> {
        if text.trim().is_empty() {
            return Err(Rejection::EmptyInput);
        }
        if self.turn == TurnState::AwaitingResponse {
            return Err(Rejection::Busy);
        }

        self.transcript.push(ChatMessage::user(text));
        self.turn = TurnState::AwaitingResponse;

        Ok(TurnRequest {
            ticket: TurnTicket {
                policy_id: self.policy.id.clone(),
                generation: self.generation,
            },
            policy: self.policy.clone(),
            transcript: self.transcript.clone(),
        })
    }

    /// Records the result of the model call started by `ticket`.
    pub fn finish_turn(
        &mut self,
        ticket: &TurnTicket,
        result: warden_claude::Result<String>,
    ) -> TurnOutcome {
        if !self.is_current(&ticket.policy_id, ticket.generation) {
            debug!(
                "Discarding reply for policy {} (generation {})",
                ticket.policy_id, ticket.generation
            );
            return TurnOutcome::Discarded;
        }

        self.turn = TurnState::Idle;
        match result {
            Ok(reply) => {
                self.transcript.push(ChatMessage::assistant(reply.clone()));
                TurnOutcome::Replied(reply)
            }
            Err(e) => {
                warn!("Turn failed for policy {}: {}", self.policy.id, e);
                TurnOutcome::Failed(e.to_string())
            }
        }
    }

    fn is_current(&self, policy_id: &str, generation: u64) -> bool {
        self.generation == generation && self.policy.id == policy_id
    }
}

/// Drives a [`Session`] against the model.
///
/// The session lock is released while a request is in flight; concurrent
/// callers see [`TurnState::AwaitingResponse`] and are rejected.
#[derive(Debug)]
pub struct Simulator {
    assistant: Assistant,
    session: Mutex<Session>,
}

impl Simulator {
    /// Creates a simulator for `policy`. Suggestions are not loaded yet.
    #[must_use]
    pub fn new(assistant: Assistant, policy: Policy) -> Self {
        Self {
            assistant,
            session: Mutex::new(Session::new(policy)),
        }
    }

    /// Copy of the current session state.
    pub fn snapshot(&self) -> Session {
        self.session.lock().clone()
    }

    /// Id of the active policy.
    pub fn policy_id(&self) -> String {
        self.session.lock().policy().id.clone()
    }

    /// Loads suggestions for the current generation if they are still missing.
    pub async fn load_suggestions(&self) {
        let pending = {
            let session = self.session.lock();
            session
                .pending_suggestions()
                .map(|ticket| (ticket, session.policy().clone()))
        };
        if let Some((ticket, policy)) = pending {
            self.fetch_suggestions(ticket, &policy).await;
        }
    }

    /// Switches to `policy` (or restarts it) and loads fresh suggestions.
    pub async fn reset_session(&self, policy: Policy) {
        let (ticket, policy) = {
            let mut session = self.session.lock();
            let ticket = session.reset(policy);
            (ticket, session.policy().clone())
        };
        self.fetch_suggestions(ticket, &policy).await;
    }

    /// Sends `text` as the next user turn and records the reply.
    ///
    /// # Errors
    ///
    /// Returns a [`Rejection`] when the text is blank or a turn is already
    /// in flight. Model failures are not errors; they yield
    /// [`TurnOutcome::Failed`].
    pub async fn submit_turn(&self, text: &str) -> Result<TurnOutcome, Rejection> {
        let request = self.session.lock().begin_turn(text)?;
        debug!(
            "Submitting turn {} for policy {}",
            request.transcript.len(),
            request.policy.id
        );

        let result = self
            .assistant
            .simulate_turn(&request.policy, &request.transcript)
            .await;

        Ok(self.session.lock().finish_turn(&request.ticket, result))
    }

    async fn fetch_suggestions(&self, ticket: SuggestionTicket, policy: &Policy) {
        let prompts = self.assistant.suggest_prompts(policy).await;
        self.session.lock().accept_suggestions(&ticket, prompts);
    }
}
