//! Turns backend recommendation records into canonical [`Laptop`] values.
//!
//! The backend is loose about key names (`model_name`, `modelName`, `Model Name`
//! all show up), so every attribute has a fixed list of candidate keys tried in
//! order: exact matches first, then the same candidates compared
//! case-insensitively with `_`, `-` and spaces ignored. A candidate whose value
//! is unusable (empty, wrong type, unparseable) is skipped in favour of the
//! next one. Anything still missing becomes [`PLACEHOLDER`]. Canonical key names lead every list, which makes
//! normalizing a serialized [`Laptop`] a no-op.

use crate::models::{Laptop, RecommendationSet, UserProfile, MAX_MATCH_SCORE};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const PLACEHOLDER: &str = "N/A";

const BRAND_KEYS: &[&str] = &["brand", "manufacturer", "make"];
const MODEL_KEYS: &[&str] = &["model_name", "model", "name", "title"];
const PRICE_KEYS: &[&str] = &["price", "price_inr", "cost"];
const PROCESSOR_KEYS: &[&str] = &["processor", "cpu"];
const CPU_MAKER_KEYS: &[&str] = &["cpu_manufacturer", "processor_brand"];
const CORE_KEYS: &[&str] = &["core", "processor_name", "cpu_model"];
const CLOCK_KEYS: &[&str] = &["clock_speed", "cpu_speed"];
const MEMORY_KEYS: &[&str] = &["memory", "ram_size", "ram"];
const STORAGE_KEYS: &[&str] = &["storage", "storage_type", "storage_capacity", "ssd"];
const DISPLAY_KEYS: &[&str] = &["display", "screen"];
const DISPLAY_SIZE_KEYS: &[&str] = &["display_size", "screen_size"];
const DISPLAY_TYPE_KEYS: &[&str] = &["display_type", "panel_type"];
const RESOLUTION_KEYS: &[&str] = &["screen_resolution", "resolution"];
const GRAPHICS_KEYS: &[&str] = &["graphics", "graphics_processor", "gpu"];
const WEIGHT_KEYS: &[&str] = &["weight", "laptop_weight"];
const BATTERY_KEYS: &[&str] = &["battery_life", "average_battery_life", "battery"];
const SCORE_KEYS: &[&str] = &["score", "match_score", "rating"];
const DESCRIPTION_KEYS: &[&str] = &["description", "summary"];
const OS_KEYS: &[&str] = &["os", "operating_system"];
const WARRANTY_KEYS: &[&str] = &["warranty"];
const MATCH_DETAILS_KEYS: &[&str] = &["match_details"];

/// Normalize one backend record. Never fails and never touches `record`;
/// non-object input yields an all-placeholder laptop.
pub fn normalize_laptop(record: &Value) -> Laptop {
    let empty = Map::new();
    let fields = record.as_object().unwrap_or(&empty);

    Laptop {
        brand: text_or_placeholder(fields, BRAND_KEYS),
        model_name: text_or_placeholder(fields, MODEL_KEYS),
        price: pick(fields, PRICE_KEYS, parse_price),
        processor: text(fields, PROCESSOR_KEYS)
            .or_else(|| compose_processor(fields))
            .unwrap_or_else(placeholder),
        memory: text_or_placeholder(fields, MEMORY_KEYS),
        storage: text_or_placeholder(fields, STORAGE_KEYS),
        display: text(fields, DISPLAY_KEYS)
            .or_else(|| compose_display(fields))
            .unwrap_or_else(placeholder),
        graphics: text_or_placeholder(fields, GRAPHICS_KEYS),
        weight: text_or_placeholder(fields, WEIGHT_KEYS),
        battery_life: text_or_placeholder(fields, BATTERY_KEYS),
        score: pick(fields, SCORE_KEYS, parse_score).unwrap_or(0),
        description: text(fields, DESCRIPTION_KEYS),
        os: text(fields, OS_KEYS),
        warranty: text(fields, WARRANTY_KEYS),
        match_details: pick(fields, MATCH_DETAILS_KEYS, |value| {
            value.as_object().map(string_map)
        })
        .unwrap_or_default(),
    }
}

/// Normalize a whole response worth of records, keeping backend rank order.
pub fn normalize_recommendations(
    records: &[Value],
    profile: Option<&Map<String, Value>>,
) -> RecommendationSet {
    RecommendationSet {
        laptops: records.iter().map(normalize_laptop).collect(),
        profile: profile.map(normalize_profile),
    }
}

pub fn normalize_profile(profile: &Map<String, Value>) -> UserProfile {
    string_map(profile)
}

/// `80000 -> "₹80,000"`, `150000 -> "₹1,50,000"`. Whole units only.
pub fn format_price(price: Option<f64>, currency_symbol: &str) -> String {
    let Some(amount) = price.filter(|p| p.is_finite()) else {
        return PLACEHOLDER.to_string();
    };

    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", rounded.abs());

    format!("{}{}{}", sign, currency_symbol, group_indian(&digits))
}

fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("{},{}", groups.join(","), tail)
}

fn placeholder() -> String {
    PLACEHOLDER.to_string()
}

fn canonical_key(key: &str) -> String {
    key.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// First candidate value that `read` accepts: exact keys in order, then the
/// loose key comparison in the same order.
fn pick<T>(
    fields: &Map<String, Value>,
    candidates: &[&str],
    read: impl Fn(&Value) -> Option<T>,
) -> Option<T> {
    candidates
        .iter()
        .filter_map(|key| fields.get(*key))
        .find_map(&read)
        .or_else(|| {
            candidates.iter().find_map(|candidate| {
                let wanted = canonical_key(candidate);
                fields
                    .iter()
                    .filter(|(key, _)| canonical_key(key) == wanted)
                    .find_map(|(_, value)| read(value))
            })
        })
}

fn value_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn text(fields: &Map<String, Value>, candidates: &[&str]) -> Option<String> {
    pick(fields, candidates, value_text)
}

fn text_or_placeholder(fields: &Map<String, Value>, candidates: &[&str]) -> String {
    text(fields, candidates).unwrap_or_else(placeholder)
}

fn compose_processor(fields: &Map<String, Value>) -> Option<String> {
    let name = [text(fields, CPU_MAKER_KEYS), text(fields, CORE_KEYS)]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");

    match (name.is_empty(), text(fields, CLOCK_KEYS)) {
        (true, None) => None,
        (true, Some(clock)) => Some(clock),
        (false, None) => Some(name),
        (false, Some(clock)) => Some(format!("{} @ {}", name, clock)),
    }
}

fn compose_display(fields: &Map<String, Value>) -> Option<String> {
    let panel = [text(fields, DISPLAY_SIZE_KEYS), text(fields, DISPLAY_TYPE_KEYS)]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");

    match (panel.is_empty(), text(fields, RESOLUTION_KEYS)) {
        (true, None) => None,
        (true, Some(resolution)) => Some(resolution),
        (false, None) => Some(panel),
        (false, Some(resolution)) => Some(format!("{} ({})", panel, resolution)),
    }
}

/// Accepts numbers and strings such as "₹80,000", "Rs. 80,000" or
/// "80000.50". Currency prefixes are skipped up to the first digit.
fn parse_price(value: &Value) -> Option<f64> {
    let price = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let start = s.find(|c: char| c.is_ascii_digit())?;
            let mut seen_point = false;
            let cleaned: String = s[start..]
                .chars()
                .filter(|c| match c {
                    '.' if !seen_point => {
                        seen_point = true;
                        true
                    }
                    c => c.is_ascii_digit(),
                })
                .collect();
            cleaned.parse().ok()
        }
        _ => None,
    };
    price.filter(|p: &f64| p.is_finite())
}

/// Numbers or strings like "7" and "6/9", rounded and clamped to the scale.
fn parse_score(value: &Value) -> Option<u8> {
    let raw = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.split('/').next().and_then(|head| head.trim().parse().ok()),
        _ => None,
    };
    raw.filter(|v: &f64| v.is_finite())
        .map(|v| v.round().clamp(0.0, f64::from(MAX_MATCH_SCORE)) as u8)
}

fn string_map(fields: &Map<String, Value>) -> BTreeMap<String, String> {
    fields
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| {
            let rendered = match value {
                Value::String(s) => s.trim().to_string(),
                other => other.to_string(),
            };
            (key.trim().to_string(), rendered)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_record() {
        let laptop = normalize_laptop(&json!({
            "brand": "Dell",
            "model_name": "XPS",
            "price": 80000,
            "score": 8
        }));
        assert_eq!(laptop.brand, "Dell");
        assert_eq!(laptop.model_name, "XPS");
        assert_eq!(laptop.price, Some(80000.0));
        assert_eq!(laptop.score, 8);
        assert_eq!(laptop.memory, PLACEHOLDER);
        assert!(laptop.description.is_none());
    }

    #[test]
    fn test_backend_shape_composes_descriptors() {
        let laptop = normalize_laptop(&json!({
            "brand": "Lenovo",
            "model_name": "Legion 5",
            "cpu_manufacturer": "AMD",
            "core": "Ryzen 7 7840HS",
            "clock_speed": "5.1 GHz",
            "ram_size": "16 GB",
            "storage_type": "1 TB SSD",
            "display_size": "15.6\"",
            "display_type": "IPS",
            "screen_resolution": "2560x1440",
            "graphics_processor": "RTX 4060",
            "laptop_weight": "2.4 kg",
            "average_battery_life": "6 hours",
            "price": "₹1,15,990",
            "score": 7,
            "os": "Windows 11",
            "match_details": {"gpu intensity": "✅ high (need: high)"}
        }));
        assert_eq!(laptop.processor, "AMD Ryzen 7 7840HS @ 5.1 GHz");
        assert_eq!(laptop.display, "15.6\" IPS (2560x1440)");
        assert_eq!(laptop.memory, "16 GB");
        assert_eq!(laptop.storage, "1 TB SSD");
        assert_eq!(laptop.graphics, "RTX 4060");
        assert_eq!(laptop.weight, "2.4 kg");
        assert_eq!(laptop.battery_life, "6 hours");
        assert_eq!(laptop.price, Some(115990.0));
        assert_eq!(laptop.os.as_deref(), Some("Windows 11"));
        assert_eq!(laptop.matched_features(), vec!["gpu intensity"]);
    }

    #[test]
    fn test_case_and_synonym_variants() {
        let laptop = normalize_laptop(&json!({
            "Brand": "HP",
            "modelName": "Spectre x360",
            "Price": 129999.0,
            "RAM": "16GB",
            "GPU": "Intel Arc",
            "Match Score": "6/9"
        }));
        assert_eq!(laptop.brand, "HP");
        assert_eq!(laptop.model_name, "Spectre x360");
        assert_eq!(laptop.price, Some(129999.0));
        assert_eq!(laptop.memory, "16GB");
        assert_eq!(laptop.graphics, "Intel Arc");
        assert_eq!(laptop.score, 6);
    }

    #[test]
    fn test_exact_key_wins_over_variant() {
        let laptop = normalize_laptop(&json!({"brand": "Asus", "Brand": "Other"}));
        assert_eq!(laptop.brand, "Asus");
    }

    #[test]
    fn test_price_strings_with_currency_prefix() {
        let price = |raw: &str| normalize_laptop(&json!({"price": raw})).price;
        assert_eq!(price("Rs. 80,000"), Some(80000.0));
        assert_eq!(price("INR 1,15,990"), Some(115990.0));
        assert_eq!(price("₹74,990.00"), Some(74990.0));
        assert_eq!(price("Price on request"), None);
        assert_eq!(normalize_laptop(&json!({"price": "Rs."})).price, None);
    }

    #[test]
    fn test_unusable_value_falls_through_to_next_key() {
        let raw = json!({
            "model_name": "",
            "model": "XPS 13",
            "brand": {"name": "Dell"},
            "manufacturer": "Dell",
            "price": "call for price",
            "cost": 79990,
            "score": "n/a",
            "rating": 7
        });
        let laptop = normalize_laptop(&raw);
        assert_eq!(laptop.model_name, "XPS 13");
        assert_eq!(laptop.brand, "Dell");
        assert_eq!(laptop.price, Some(79990.0));
        assert_eq!(laptop.score, 7);

        let again = normalize_laptop(&serde_json::to_value(&laptop).unwrap());
        assert_eq!(again, laptop);
    }

    #[test]
    fn test_blank_exact_key_falls_back_to_loose_match() {
        let laptop = normalize_laptop(&json!({"model_name": "  ", "Model Name": "Zenbook 14"}));
        assert_eq!(laptop.model_name, "Zenbook 14");
    }

    #[test]
    fn test_missing_everything_yields_placeholders() {
        let laptop = normalize_laptop(&json!({}));
        for field in [
            &laptop.brand,
            &laptop.model_name,
            &laptop.processor,
            &laptop.memory,
            &laptop.storage,
            &laptop.display,
            &laptop.graphics,
            &laptop.weight,
            &laptop.battery_life,
        ] {
            assert_eq!(field, PLACEHOLDER);
        }
        assert_eq!(laptop.price, None);
        assert_eq!(laptop.score, 0);

        let from_garbage = normalize_laptop(&json!("not an object"));
        assert_eq!(from_garbage, laptop);
    }

    #[test]
    fn test_score_is_clamped() {
        assert_eq!(normalize_laptop(&json!({"score": 42})).score, 9);
        assert_eq!(normalize_laptop(&json!({"score": -3})).score, 0);
        assert_eq!(normalize_laptop(&json!({"score": 7.6})).score, 8);
    }

    #[test]
    fn test_normalizing_twice_is_identity() {
        let raw = json!({
            "Brand": "Acer",
            "model": "Swift Go",
            "cpu_manufacturer": "Intel",
            "core": "Core Ultra 5",
            "price": "74,990",
            "score": 5,
            "description": "  Light and quick  "
        });
        let once = normalize_laptop(&raw);
        let twice = normalize_laptop(&serde_json::to_value(&once).unwrap());
        assert_eq!(once, twice);

        let sparse = normalize_laptop(&json!({}));
        assert_eq!(
            normalize_laptop(&serde_json::to_value(&sparse).unwrap()),
            sparse
        );
    }

    #[test]
    fn test_input_is_untouched() {
        let raw = json!({"modelName": "Zenbook"});
        let before = raw.clone();
        let _ = normalize_laptop(&raw);
        assert_eq!(raw, before);
    }

    #[test]
    fn test_profile_values_stringified() {
        let profile = json!({"budget": 80000, "gpu intensity": "high", "notes": null});
        let normalized = normalize_profile(profile.as_object().unwrap());
        assert_eq!(normalized.get("budget").map(String::as_str), Some("80000"));
        assert_eq!(normalized.get("gpu intensity").map(String::as_str), Some("high"));
        assert!(!normalized.contains_key("notes"));
    }

    #[test]
    fn test_format_price_indian_grouping() {
        assert_eq!(format_price(Some(80000.0), "₹"), "₹80,000");
        assert_eq!(format_price(Some(150000.0), "₹"), "₹1,50,000");
        assert_eq!(format_price(Some(12345678.0), "₹"), "₹1,23,45,678");
        assert_eq!(format_price(Some(999.0), "₹"), "₹999");
        assert_eq!(format_price(Some(1000.4), "$"), "$1,000");
        assert_eq!(format_price(None, "₹"), PLACEHOLDER);
    }
}
