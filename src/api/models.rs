use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
    /// Greeting produced by the assistant for the fresh session.
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SendMessageRequest<'a> {
    pub session_id: &'a str,
    pub message: &'a str,
}

/// Recommendation records stay raw here; they are normalized once in
/// `recommendation` before anything downstream sees them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SendMessageResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub intent_confirmed: bool,
    #[serde(default)]
    pub recommendations: Option<Vec<Value>>,
    #[serde(default)]
    pub user_profile: Option<Map<String, Value>>,
}

impl SendMessageResponse {
    /// Reply text, whichever field the backend used for it.
    pub fn reply_text(&self) -> Option<&str> {
        self.message
            .as_deref()
            .or(self.response.as_deref())
            .filter(|text| !text.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotMessage {
    pub role: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSnapshot {
    #[serde(default)]
    pub conversation: Vec<SnapshotMessage>,
    #[serde(default)]
    pub user_profile: Option<Map<String, Value>>,
    #[serde(default)]
    pub recommendations: Option<Vec<Value>>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ScrapeRequest<'a> {
    pub laptop_name: &'a str,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScrapeResponse {
    /// Retailer map; the backend mixes in scalar keys such as `laptop_name`.
    #[serde(default)]
    pub prices: Map<String, Value>,
    #[serde(default)]
    pub from_cache: bool,
}

/// FastAPI `HTTPException` body.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub detail: Value,
}
