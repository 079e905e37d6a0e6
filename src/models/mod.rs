mod laptop;
mod message;
mod price;

pub use laptop::{Laptop, RecommendationSet, UserProfile, MAX_MATCH_SCORE};
pub use message::{Message, MessageRole};
pub use price::{PriceQuote, PriceQuoteSet};
