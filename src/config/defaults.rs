pub const DEFAULT_API_BASE: &str = "http://localhost:8000/api";

pub fn default_request_timeout() -> u64 {
    30
}

pub fn default_price_timeout() -> u64 {
    60 // scraping two retailers is slow
}

pub fn default_currency_symbol() -> String {
    "₹".to_string()
}

pub fn default_verbose() -> bool {
    false
}
