use super::state::{Conversation, Outcome, Phase, SendBlocked};
use crate::api::AdvisorApi;
use crate::error::AdvisorError;
use crate::models::{Message, RecommendationSet};
use crate::prices::{PriceBoard, PriceState, ToggleOutcome};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::timeout;

/// Read-only copy of the conversation for rendering.
#[derive(Debug, Clone)]
pub struct ConversationView {
    pub phase: Phase,
    pub session_id: Option<String>,
    pub messages: Vec<Message>,
    pub recommendations: Option<RecommendationSet>,
    pub banner: Option<String>,
}

/// Drives a [`Conversation`] and its [`PriceBoard`] over an [`AdvisorApi`].
///
/// Locks are never held across a backend call, so a reset or a price toggle
/// can run while a send is in flight; the state machine's tickets decide
/// whether a late result still applies.
pub struct ChatController {
    api: Arc<dyn AdvisorApi>,
    conversation: Mutex<Conversation>,
    prices: Mutex<PriceBoard>,
    price_timeout: Duration,
}

impl ChatController {
    pub fn new(api: Arc<dyn AdvisorApi>, price_timeout: Duration) -> Self {
        Self {
            api,
            conversation: Mutex::new(Conversation::new()),
            prices: Mutex::new(PriceBoard::new()),
            price_timeout,
        }
    }

    pub async fn initialize(&self) -> Outcome {
        let ticket = self.conversation.lock().await.begin_initialize();
        self.sync_prices().await;

        let result = self.api.create_session().await;

        self.conversation
            .lock()
            .await
            .complete_initialize(&ticket, result)
    }

    /// "New search": same as a fresh initialize.
    pub async fn reset(&self) -> Outcome {
        tracing::debug!("resetting conversation");
        self.initialize().await
    }

    pub async fn resume(&self, session_id: &str) -> Outcome {
        let ticket = self.conversation.lock().await.begin_initialize();
        self.sync_prices().await;

        let result = self.api.get_session(session_id).await;

        let outcome = self
            .conversation
            .lock()
            .await
            .complete_resume(&ticket, session_id, result);
        self.sync_prices().await;
        outcome
    }

    pub async fn send(&self, text: &str) -> Result<Outcome, SendBlocked> {
        let ticket = self.conversation.lock().await.begin_send(text)?;
        self.sync_prices().await;

        let result = self
            .api
            .send_message(ticket.session_id(), ticket.text())
            .await;

        let outcome = self
            .conversation
            .lock()
            .await
            .complete_send(&ticket, result);
        self.sync_prices().await;
        Ok(outcome)
    }

    /// Flip the price panel of one card. Returns the card's resulting state,
    /// or `None` if there is no such card.
    pub async fn toggle_prices(&self, card: usize) -> Option<PriceState> {
        let ticket = match self.prices.lock().await.toggle(card) {
            ToggleOutcome::Fetch(ticket) => ticket,
            ToggleOutcome::Closed => return Some(PriceState::Hidden),
            ToggleOutcome::NoSuchCard => return None,
        };

        tracing::debug!(card, laptop = ticket.laptop_name(), "looking up prices");
        let lookup = self.api.scrape_prices(ticket.laptop_name());
        let result = match timeout(self.price_timeout, lookup).await {
            Ok(result) => result,
            Err(_) => Err(AdvisorError::Timeout),
        };
        if let Err(err) = &result {
            tracing::warn!(card, laptop = ticket.laptop_name(), error = %err, "price lookup failed");
        }

        let mut board = self.prices.lock().await;
        if !board.resolve(&ticket, result) {
            tracing::debug!(card, "dropping superseded price lookup");
        }
        board.state(card).cloned()
    }

    pub async fn view(&self) -> ConversationView {
        let conversation = self.conversation.lock().await;
        ConversationView {
            phase: conversation.phase(),
            session_id: conversation.session_id().map(str::to_string),
            messages: conversation.messages().to_vec(),
            recommendations: conversation.recommendations().cloned(),
            banner: conversation.banner().map(str::to_string),
        }
    }

    pub async fn price_state(&self, card: usize) -> Option<PriceState> {
        self.prices.lock().await.state(card).cloned()
    }

    pub async fn price_states(&self) -> Vec<PriceState> {
        self.prices.lock().await.states()
    }

    pub async fn is_loading(&self) -> bool {
        self.conversation.lock().await.is_loading()
    }

    async fn sync_prices(&self) {
        let (revision, recommendations) = {
            let conversation = self.conversation.lock().await;
            (
                conversation.recommendations_revision(),
                conversation.recommendations().cloned(),
            )
        };
        self.prices
            .lock()
            .await
            .sync(revision, recommendations.as_ref());
    }
}
