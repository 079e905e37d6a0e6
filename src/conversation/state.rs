use crate::api::{CreateSessionResponse, SendMessageResponse, SessionSnapshot};
use crate::error::Result;
use crate::models::{Message, MessageRole, RecommendationSet};
use crate::recommendation::normalize_recommendations;
use std::fmt;

pub const APOLOGY_MESSAGE: &str =
    "Sorry, there was an error processing your message. Please try again.";
pub const CONNECTIVITY_MESSAGE: &str =
    "Unable to reach the recommendation service. Check that the backend is running, then start a new search.";
pub const DEFAULT_GREETING: &str =
    "Hi! Tell me how you plan to use your next laptop and I'll find the best matches.";
pub const EMPTY_REPLY: &str = "(The assistant sent an empty reply.)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Initializing,
    Ready,
    AwaitingResponse,
    /// Session creation failed; only a reset leaves this state.
    Errored,
}

/// Why a send did not go out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendBlocked {
    Blank,
    InFlight,
    NoSession,
}

impl fmt::Display for SendBlocked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendBlocked::Blank => write!(f, "message is empty"),
            SendBlocked::InFlight => write!(f, "still waiting for the previous reply"),
            SendBlocked::NoSession => write!(f, "no active session"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// The conversation was reset after the request went out.
    Stale,
}

#[derive(Debug, Clone)]
pub struct InitTicket {
    generation: u64,
}

#[derive(Debug, Clone)]
pub struct SendTicket {
    generation: u64,
    session_id: String,
    text: String,
}

impl SendTicket {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Conversation state for one chat view.
///
/// Transitions come in `begin_*`/`complete_*` pairs. `begin_*` applies the
/// synchronous part and hands out a ticket stamped with the current
/// generation; `complete_*` applies the backend result only if the generation
/// still matches. Every (re)initialization bumps the generation, so replies
/// to requests issued before a reset are discarded.
#[derive(Debug, Clone)]
pub struct Conversation {
    session_id: Option<String>,
    messages: Vec<Message>,
    recommendations: Option<RecommendationSet>,
    recommendations_revision: u64,
    phase: Phase,
    banner: Option<String>,
    generation: u64,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            session_id: None,
            messages: Vec::new(),
            recommendations: None,
            recommendations_revision: 0,
            phase: Phase::Uninitialized,
            banner: None,
            generation: 0,
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn recommendations(&self) -> Option<&RecommendationSet> {
        self.recommendations.as_ref()
    }

    /// Bumped whenever the recommendation set is replaced or cleared.
    pub fn recommendations_revision(&self) -> u64 {
        self.recommendations_revision
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Initializing | Phase::AwaitingResponse)
    }

    /// Start (or restart) the view: wipe everything and wait for a session.
    pub fn begin_initialize(&mut self) -> InitTicket {
        self.generation += 1;
        self.session_id = None;
        self.messages.clear();
        self.banner = None;
        self.clear_recommendations();
        self.phase = Phase::Initializing;
        InitTicket {
            generation: self.generation,
        }
    }

    pub fn complete_initialize(
        &mut self,
        ticket: &InitTicket,
        result: Result<CreateSessionResponse>,
    ) -> Outcome {
        if ticket.generation != self.generation {
            tracing::debug!(generation = ticket.generation, "dropping stale session creation");
            return Outcome::Stale;
        }

        match result {
            Ok(created) => {
                let greeting = if created.message.trim().is_empty() {
                    DEFAULT_GREETING.to_string()
                } else {
                    created.message
                };
                tracing::info!(session_id = %created.session_id, "session created");
                self.session_id = Some(created.session_id);
                self.messages.push(Message::assistant(greeting));
                self.phase = Phase::Ready;
            }
            Err(err) => {
                tracing::warn!(error = %err, "session creation failed");
                self.fail_connectivity();
            }
        }
        Outcome::Applied
    }

    /// Rebuild the view from a backend snapshot of an existing session.
    /// Backend system prompts are not part of the visible log.
    pub fn complete_resume(
        &mut self,
        ticket: &InitTicket,
        session_id: &str,
        result: Result<SessionSnapshot>,
    ) -> Outcome {
        if ticket.generation != self.generation {
            tracing::debug!(generation = ticket.generation, "dropping stale session resume");
            return Outcome::Stale;
        }

        match result {
            Ok(snapshot) => {
                self.messages = snapshot
                    .conversation
                    .iter()
                    .filter_map(|turn| match MessageRole::parse(&turn.role) {
                        Some(MessageRole::System) | None => None,
                        Some(role) => Some(Message::new(role, turn.content.clone())),
                    })
                    .collect();
                if let Some(records) = snapshot.recommendations.filter(|r| !r.is_empty()) {
                    self.replace_recommendations(normalize_recommendations(
                        &records,
                        snapshot.user_profile.as_ref(),
                    ));
                }
                tracing::info!(session_id, turns = self.messages.len(), "session resumed");
                self.session_id = Some(session_id.to_string());
                self.phase = Phase::Ready;
            }
            Err(err) => {
                tracing::warn!(session_id, error = %err, "session resume failed");
                self.fail_connectivity();
            }
        }
        Outcome::Applied
    }

    /// Optimistically append the user's turn and clear stale recommendations.
    pub fn begin_send(&mut self, text: &str) -> std::result::Result<SendTicket, SendBlocked> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SendBlocked::Blank);
        }
        if self.phase == Phase::AwaitingResponse {
            return Err(SendBlocked::InFlight);
        }
        let Some(session_id) = self.session_id.clone() else {
            return Err(SendBlocked::NoSession);
        };

        self.messages.push(Message::user(text));
        self.clear_recommendations();
        self.phase = Phase::AwaitingResponse;

        Ok(SendTicket {
            generation: self.generation,
            session_id,
            text: text.to_string(),
        })
    }

    pub fn complete_send(
        &mut self,
        ticket: &SendTicket,
        result: Result<SendMessageResponse>,
    ) -> Outcome {
        if ticket.generation != self.generation || self.phase != Phase::AwaitingResponse {
            tracing::warn!(
                session_id = %ticket.session_id,
                generation = ticket.generation,
                current = self.generation,
                "dropping reply for a superseded conversation"
            );
            return Outcome::Stale;
        }

        match result {
            Ok(reply) => {
                let text = reply.reply_text().unwrap_or(EMPTY_REPLY).to_string();
                self.messages.push(Message::assistant(text));

                let records = reply.recommendations.unwrap_or_default();
                if reply.intent_confirmed && !records.is_empty() {
                    let set = normalize_recommendations(&records, reply.user_profile.as_ref());
                    tracing::info!(count = set.len(), "recommendations received");
                    self.replace_recommendations(set);
                }
            }
            Err(err) => {
                tracing::warn!(session_id = %ticket.session_id, error = %err, "send failed");
                self.messages.push(Message::assistant(APOLOGY_MESSAGE));
            }
        }

        self.phase = Phase::Ready;
        Outcome::Applied
    }

    fn fail_connectivity(&mut self) {
        self.session_id = None;
        self.banner = Some(CONNECTIVITY_MESSAGE.to_string());
        self.phase = Phase::Errored;
    }

    fn replace_recommendations(&mut self, set: RecommendationSet) {
        self.recommendations = Some(set);
        self.recommendations_revision += 1;
    }

    fn clear_recommendations(&mut self) {
        if self.recommendations.take().is_some() {
            self.recommendations_revision += 1;
        }
    }
}
