use crate::api::models::{
    CreateSessionResponse, ErrorBody, ScrapeRequest, ScrapeResponse, SendMessageRequest,
    SendMessageResponse, SessionSnapshot,
};
use crate::config::ApiSettings;
use crate::error::{AdvisorError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Backend surface consumed by the chat. Every call is one-shot; retries are
/// left to whoever drives the conversation.
#[async_trait]
pub trait AdvisorApi: Send + Sync {
    async fn create_session(&self) -> Result<CreateSessionResponse>;

    async fn send_message(&self, session_id: &str, message: &str) -> Result<SendMessageResponse>;

    async fn get_session(&self, session_id: &str) -> Result<SessionSnapshot>;

    async fn scrape_prices(&self, laptop_name: &str) -> Result<ScrapeResponse>;
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    price_timeout: Duration,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings) -> Result<Self> {
        let base_url = Url::parse(&settings.base_url).map_err(|e| {
            AdvisorError::ConfigError(format!("Invalid API base URL {}: {}", settings.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(AdvisorError::ConfigError(format!(
                "API base URL cannot carry paths: {}",
                settings.base_url
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(settings.request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url,
            price_timeout: settings.price_timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AdvisorError::ConfigError("API base URL cannot carry paths".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl AdvisorApi for ApiClient {
    async fn create_session(&self) -> Result<CreateSessionResponse> {
        let url = self.endpoint(&["chat", "session"])?;
        tracing::debug!(%url, "creating chat session");
        let response = self.http.post(url).send().await?;
        decode(response).await
    }

    async fn send_message(&self, session_id: &str, message: &str) -> Result<SendMessageResponse> {
        let url = self.endpoint(&["chat", "message"])?;
        tracing::debug!(%url, session_id, "sending chat message");
        let response = self
            .http
            .post(url)
            .json(&SendMessageRequest {
                session_id,
                message,
            })
            .send()
            .await?;
        decode(response).await
    }

    async fn get_session(&self, session_id: &str) -> Result<SessionSnapshot> {
        let url = self.endpoint(&["chat", "session", session_id])?;
        tracing::debug!(%url, "fetching session snapshot");
        let response = self.http.get(url).send().await?;
        decode(response).await
    }

    async fn scrape_prices(&self, laptop_name: &str) -> Result<ScrapeResponse> {
        let url = self.endpoint(&["scraper", "prices"])?;
        tracing::debug!(%url, laptop_name, "requesting price comparison");
        let response = self
            .http
            .post(url)
            .timeout(self.price_timeout)
            .json(&ScrapeRequest { laptop_name })
            .send()
            .await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(AdvisorError::Api {
            status: status.as_u16(),
            message: error_message(status, &body),
        });
    }

    serde_json::from_str(&body).map_err(|e| {
        AdvisorError::InvalidResponse(format!("{} (body: {})", e, truncate(&body, 200)))
    })
}

fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return match parsed.detail {
            serde_json::Value::String(detail) => detail,
            other => other.to_string(),
        };
    }
    if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    } else {
        truncate(body, 500)
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}
