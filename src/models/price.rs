use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub name: String,
    /// Already formatted by the retailer, e.g. "₹50,000".
    pub price: String,
    pub link: String,
}

/// Quotes grouped by retailer identifier (e.g. "flipkart", "croma").
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceQuoteSet {
    pub retailers: BTreeMap<String, Vec<PriceQuote>>,
    pub from_cache: bool,
}

impl PriceQuoteSet {
    pub fn quotes(&self, retailer: &str) -> &[PriceQuote] {
        self.retailers
            .get(retailer)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn total_quotes(&self) -> usize {
        self.retailers.values().map(Vec::len).sum()
    }
}
