use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    /// Seconds; applies to session and message calls.
    #[serde(default)]
    pub request_timeout: Option<u64>,
    /// Seconds; bound on the price comparison lookup.
    #[serde(default)]
    pub price_timeout: Option<u64>,
}
