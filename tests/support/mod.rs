//! In-memory backend for driving `ChatController` without a network.

#![allow(dead_code)]

use async_trait::async_trait;
use laptop_advisor::api::{
    AdvisorApi, CreateSessionResponse, ScrapeResponse, SendMessageResponse, SessionSnapshot,
};
use laptop_advisor::error::{AdvisorError, Result};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::{oneshot, Notify};

pub enum Reply<T> {
    Now(Result<T>),
    Deferred(oneshot::Receiver<Result<T>>),
    /// Never resolves; for timeout tests.
    Hang,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateSession,
    SendMessage { session_id: String, message: String },
    GetSession(String),
    ScrapePrices(String),
}

#[derive(Default)]
pub struct FakeApi {
    sessions: Mutex<VecDeque<Result<CreateSessionResponse>>>,
    sends: Mutex<VecDeque<Reply<SendMessageResponse>>>,
    snapshots: Mutex<VecDeque<Result<SessionSnapshot>>>,
    scrapes: Mutex<VecDeque<Reply<ScrapeResponse>>>,
    calls: Mutex<Vec<Call>>,
    pub send_started: Notify,
    pub scrape_started: Notify,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_session(&self, session_id: &str, greeting: &str) {
        self.sessions
            .lock()
            .unwrap()
            .push_back(Ok(CreateSessionResponse {
                session_id: session_id.to_string(),
                message: greeting.to_string(),
            }));
    }

    pub fn queue_session_error(&self, error: AdvisorError) {
        self.sessions.lock().unwrap().push_back(Err(error));
    }

    pub fn queue_reply(&self, body: Value) {
        let reply = serde_json::from_value(body).unwrap();
        self.sends.lock().unwrap().push_back(Reply::Now(Ok(reply)));
    }

    pub fn queue_send_error(&self, error: AdvisorError) {
        self.sends.lock().unwrap().push_back(Reply::Now(Err(error)));
    }

    /// The next send waits until the returned sender fires.
    pub fn defer_reply(&self) -> oneshot::Sender<Result<SendMessageResponse>> {
        let (tx, rx) = oneshot::channel();
        self.sends.lock().unwrap().push_back(Reply::Deferred(rx));
        tx
    }

    pub fn queue_snapshot(&self, body: Value) {
        let snapshot = serde_json::from_value(body).unwrap();
        self.snapshots.lock().unwrap().push_back(Ok(snapshot));
    }

    pub fn queue_prices(&self, body: Value) {
        let response = serde_json::from_value(body).unwrap();
        self.scrapes
            .lock()
            .unwrap()
            .push_back(Reply::Now(Ok(response)));
    }

    pub fn queue_prices_error(&self, error: AdvisorError) {
        self.scrapes.lock().unwrap().push_back(Reply::Now(Err(error)));
    }

    pub fn defer_prices(&self) -> oneshot::Sender<Result<ScrapeResponse>> {
        let (tx, rx) = oneshot::channel();
        self.scrapes.lock().unwrap().push_back(Reply::Deferred(rx));
        tx
    }

    pub fn hang_prices(&self) {
        self.scrapes.lock().unwrap().push_back(Reply::Hang);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn scrape_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::ScrapePrices(_)))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

/// Only requests that stay in flight signal their start.
fn is_pending<T>(reply: &Option<Reply<T>>) -> bool {
    matches!(reply, Some(Reply::Deferred(_)) | Some(Reply::Hang))
}

async fn settle<T>(reply: Option<Reply<T>>) -> Result<T> {
    match reply {
        Some(Reply::Now(result)) => result,
        Some(Reply::Deferred(rx)) => rx
            .await
            .unwrap_or_else(|_| Err(AdvisorError::Other("deferred reply dropped".into()))),
        Some(Reply::Hang) => std::future::pending().await,
        None => Err(AdvisorError::Other("no fake response queued".into())),
    }
}

#[async_trait]
impl AdvisorApi for FakeApi {
    async fn create_session(&self) -> Result<CreateSessionResponse> {
        self.record(Call::CreateSession);
        let next = self.sessions.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(AdvisorError::Other("no fake session queued".into())))
    }

    async fn send_message(&self, session_id: &str, message: &str) -> Result<SendMessageResponse> {
        self.record(Call::SendMessage {
            session_id: session_id.to_string(),
            message: message.to_string(),
        });
        let next = self.sends.lock().unwrap().pop_front();
        if is_pending(&next) {
            self.send_started.notify_one();
        }
        settle(next).await
    }

    async fn get_session(&self, session_id: &str) -> Result<SessionSnapshot> {
        self.record(Call::GetSession(session_id.to_string()));
        let next = self.snapshots.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(AdvisorError::Api {
            status: 404,
            message: "Session not found".into(),
        }))
    }

    async fn scrape_prices(&self, laptop_name: &str) -> Result<ScrapeResponse> {
        self.record(Call::ScrapePrices(laptop_name.to_string()));
        let next = self.scrapes.lock().unwrap().pop_front();
        if is_pending(&next) {
            self.scrape_started.notify_one();
        }
        settle(next).await
    }
}
