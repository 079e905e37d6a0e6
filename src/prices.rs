//! Per-card price comparison.
//!
//! Each recommendation card owns a [`PriceLookup`] that flips between hidden
//! and shown. Cards never share state, and every fetch carries a ticket so a
//! result that arrives after the card was closed, or after the cards were
//! rebuilt for a new recommendation set, is dropped instead of applied.

use crate::api::ScrapeResponse;
use crate::error::{AdvisorError, Result};
use crate::models::{PriceQuote, PriceQuoteSet, RecommendationSet};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriceLookupError {
    Timeout,
    Unavailable(String),
}

impl fmt::Display for PriceLookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceLookupError::Timeout => {
                write!(f, "Price lookup timed out. Retailer sites may be slow, try again.")
            }
            PriceLookupError::Unavailable(reason) => {
                write!(f, "Could not fetch prices: {}", reason)
            }
        }
    }
}

impl From<&AdvisorError> for PriceLookupError {
    fn from(err: &AdvisorError) -> Self {
        if err.is_timeout() {
            PriceLookupError::Timeout
        } else {
            PriceLookupError::Unavailable(err.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PriceState {
    Hidden,
    Loading,
    Shown(PriceQuoteSet),
    Errored(PriceLookupError),
}

#[derive(Debug, Clone)]
pub struct LookupTicket {
    card: usize,
    board_generation: u64,
    generation: u64,
    laptop_name: String,
}

impl LookupTicket {
    pub fn laptop_name(&self) -> &str {
        &self.laptop_name
    }
}

#[derive(Debug)]
pub enum ToggleOutcome {
    /// Card went to `Loading`; the caller must run the lookup and resolve it.
    Fetch(LookupTicket),
    Closed,
    NoSuchCard,
}

#[derive(Debug, Clone)]
pub struct PriceLookup {
    laptop_name: String,
    state: PriceState,
    generation: u64,
}

impl PriceLookup {
    pub fn new(laptop_name: impl Into<String>) -> Self {
        Self {
            laptop_name: laptop_name.into(),
            state: PriceState::Hidden,
            generation: 0,
        }
    }

    pub fn state(&self) -> &PriceState {
        &self.state
    }

    /// Shown and Loading close without a network call. Hidden and Errored
    /// start a fresh lookup.
    fn toggle(&mut self) -> Option<u64> {
        match self.state {
            PriceState::Shown(_) | PriceState::Loading => {
                self.generation += 1;
                self.state = PriceState::Hidden;
                None
            }
            PriceState::Hidden | PriceState::Errored(_) => {
                self.generation += 1;
                self.state = PriceState::Loading;
                Some(self.generation)
            }
        }
    }

    fn resolve(&mut self, generation: u64, result: Result<ScrapeResponse>) -> bool {
        if generation != self.generation || self.state != PriceState::Loading {
            return false;
        }
        self.state = match result {
            Ok(response) => PriceState::Shown(quote_set_from_response(response)),
            Err(err) => PriceState::Errored(PriceLookupError::from(&err)),
        };
        true
    }
}

/// Lookups for the cards of the live recommendation set.
#[derive(Debug, Default)]
pub struct PriceBoard {
    revision: u64,
    board_generation: u64,
    cards: Vec<PriceLookup>,
}

impl PriceBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the cards when a newer recommendation set arrives. Revisions
    /// only move forward, so a sync that lost a race to a newer one is ignored.
    /// Returns true if a rebuild happened.
    pub fn sync(&mut self, revision: u64, recommendations: Option<&RecommendationSet>) -> bool {
        if revision <= self.revision {
            return false;
        }
        self.revision = revision;
        self.board_generation += 1;
        self.cards = recommendations
            .map(|set| {
                set.laptops
                    .iter()
                    .map(|laptop| PriceLookup::new(laptop.display_name()))
                    .collect()
            })
            .unwrap_or_default();
        true
    }

    pub fn state(&self, card: usize) -> Option<&PriceState> {
        self.cards.get(card).map(PriceLookup::state)
    }

    pub fn states(&self) -> Vec<PriceState> {
        self.cards.iter().map(|c| c.state.clone()).collect()
    }

    pub fn toggle(&mut self, card: usize) -> ToggleOutcome {
        let board_generation = self.board_generation;
        let Some(lookup) = self.cards.get_mut(card) else {
            return ToggleOutcome::NoSuchCard;
        };
        match lookup.toggle() {
            Some(generation) => ToggleOutcome::Fetch(LookupTicket {
                card,
                board_generation,
                generation,
                laptop_name: lookup.laptop_name.clone(),
            }),
            None => ToggleOutcome::Closed,
        }
    }

    /// Apply a finished lookup. Returns false when the ticket is stale.
    pub fn resolve(&mut self, ticket: &LookupTicket, result: Result<ScrapeResponse>) -> bool {
        if ticket.board_generation != self.board_generation {
            return false;
        }
        match self.cards.get_mut(ticket.card) {
            Some(lookup) => lookup.resolve(ticket.generation, result),
            None => false,
        }
    }
}

/// Keep only retailer entries that hold quote lists; scalar keys the backend
/// mixes into the map (`laptop_name`) are ignored.
pub fn quote_set_from_response(response: ScrapeResponse) -> PriceQuoteSet {
    let retailers = response
        .prices
        .into_iter()
        .filter_map(|(retailer, value)| match value {
            Value::Array(items) => Some((
                retailer,
                items.iter().filter_map(parse_quote).collect::<Vec<_>>(),
            )),
            _ => None,
        })
        .collect();

    PriceQuoteSet {
        retailers,
        from_cache: response.from_cache,
    }
}

fn parse_quote(item: &Value) -> Option<PriceQuote> {
    let fields = item.as_object()?;
    let field = |keys: &[&str]| {
        keys.iter().find_map(|key| match fields.get(*key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    };

    Some(PriceQuote {
        name: field(&["name", "title"])?,
        price: field(&["price"]).unwrap_or_else(|| "N/A".to_string()),
        link: field(&["link", "url"]).unwrap_or_default(),
    })
}
