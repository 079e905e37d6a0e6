use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const MAX_MATCH_SCORE: u8 = 9;

/// Canonical laptop record. Built only by `recommendation::normalize_laptop`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Laptop {
    pub brand: String,
    pub model_name: String,
    pub price: Option<f64>,
    pub processor: String,
    pub memory: String,
    pub storage: String,
    pub display: String,
    pub graphics: String,
    pub weight: String,
    pub battery_life: String,
    pub score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warranty: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub match_details: BTreeMap<String, String>,
}

impl Laptop {
    /// Name used for the price lookup and card titles.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.brand, self.model_name).trim().to_string()
    }

    pub fn match_percent(&self) -> u32 {
        u32::from(self.score.min(MAX_MATCH_SCORE)) * 100 / u32::from(MAX_MATCH_SCORE)
    }

    /// Features the backend marked as satisfied.
    pub fn matched_features(&self) -> Vec<&str> {
        self.match_details
            .iter()
            .filter(|(_, verdict)| verdict.contains('✅'))
            .map(|(feature, _)| feature.as_str())
            .collect()
    }
}

/// Attribute name to stringified value, sorted by key.
pub type UserProfile = BTreeMap<String, String>;

/// One backend response worth of ranked results. Replaced wholesale, never merged.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecommendationSet {
    pub laptops: Vec<Laptop>,
    pub profile: Option<UserProfile>,
}

impl RecommendationSet {
    pub fn len(&self) -> usize {
        self.laptops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.laptops.is_empty()
    }
}
