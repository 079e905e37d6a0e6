use crate::models::{Laptop, Message, MessageRole, RecommendationSet, UserProfile, MAX_MATCH_SCORE};
use crate::prices::PriceState;
use crate::recommendation::format_price;
use colored::*;
use terminal_size::{terminal_size, Width};

const MIN_WIDTH: usize = 40;
const MAX_WIDTH: usize = 96;

/// Card width that fits the current terminal.
pub fn card_width() -> usize {
    terminal_size()
        .map(|(Width(w), _)| usize::from(w).saturating_sub(4))
        .unwrap_or(72)
        .clamp(MIN_WIDTH, MAX_WIDTH)
}

pub fn render_message(message: &Message) -> String {
    match message.role {
        MessageRole::System => format!("  {} {}", "•".dimmed(), message.content.dimmed()),
        MessageRole::User => format!(
            "{} {}\n{}",
            "You".green().bold(),
            message.display_time().dimmed(),
            indent(&message.content, 2)
        ),
        MessageRole::Assistant => format!(
            "{} {}\n{}",
            "Assistant".cyan().bold(),
            message.display_time().dimmed(),
            indent(&message.content, 2)
        ),
    }
}

pub fn render_banner(text: &str) -> String {
    format!("{} {}", "!".red().bold(), text.red())
}

pub fn render_recommendations(
    set: &RecommendationSet,
    currency_symbol: &str,
    prices: &[PriceState],
    width: usize,
) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}\n{}\n",
        "Perfect matches found!".magenta().bold(),
        format!(
            "Based on your requirements, here are the top {} recommendations:",
            set.len()
        )
        .dimmed()
    ));

    if let Some(profile) = &set.profile {
        out.push_str(&render_profile(profile));
    }

    for (index, laptop) in set.laptops.iter().enumerate() {
        out.push('\n');
        out.push_str(&render_card(
            index + 1,
            laptop,
            currency_symbol,
            prices.get(index),
            width,
        ));
    }
    out
}

pub fn render_profile(profile: &UserProfile) -> String {
    if profile.is_empty() {
        return String::new();
    }
    let entries: Vec<String> = profile
        .iter()
        .map(|(key, value)| format!("{}: {}", key.bold(), value))
        .collect();
    format!("{} {}\n", "Your profile:".bold(), entries.join(" | "))
}

pub fn render_card(
    rank: usize,
    laptop: &Laptop,
    currency_symbol: &str,
    prices: Option<&PriceState>,
    width: usize,
) -> String {
    let rule = "─".repeat(width);
    let mut lines = vec![
        rule.dimmed().to_string(),
        format!(
            "{} {}",
            format!("#{}", rank).yellow().bold(),
            laptop.display_name().bold()
        ),
        format!(
            "  Match {}/{} ({}%)  {}",
            laptop.score,
            MAX_MATCH_SCORE,
            laptop.match_percent(),
            score_bar(laptop.score, 18).green()
        ),
        format!("  {:<10}{}", "CPU", laptop.processor),
        format!("  {:<10}{} | {}", "Memory", laptop.memory, laptop.storage),
        format!("  {:<10}{}", "Display", laptop.display),
        format!("  {:<10}{}", "GPU", laptop.graphics),
        format!("  {:<10}{}", "Weight", laptop.weight),
        format!("  {:<10}{}", "Battery", laptop.battery_life),
    ];
    if let Some(os) = &laptop.os {
        lines.push(format!("  {:<10}{}", "OS", os));
    }
    if let Some(warranty) = &laptop.warranty {
        lines.push(format!("  {:<10}{}", "Warranty", warranty));
    }
    lines.push(format!(
        "  {}",
        format_price(laptop.price, currency_symbol).blue().bold()
    ));

    let matched = laptop.matched_features();
    if !matched.is_empty() {
        lines.push(format!("  {} {}", "Matches:".dimmed(), matched.join(", ")));
    }
    if let Some(description) = &laptop.description {
        lines.push(format!("  {}", truncate_chars(description, width.saturating_sub(2)).dimmed()));
    }
    if let Some(state) = prices {
        let rendered = render_price_state(state);
        if !rendered.is_empty() {
            lines.push(indent(&rendered, 2));
        }
    }

    lines.join("\n")
}

/// Hidden renders as nothing.
pub fn render_price_state(state: &PriceState) -> String {
    match state {
        PriceState::Hidden => String::new(),
        PriceState::Loading => "Comparing prices...".dimmed().to_string(),
        PriceState::Errored(err) => err.to_string().red().to_string(),
        PriceState::Shown(quotes) => {
            let mut lines = vec![if quotes.from_cache {
                "Price comparison (cached):".bold().to_string()
            } else {
                "Price comparison:".bold().to_string()
            }];
            for (retailer, listings) in &quotes.retailers {
                if listings.is_empty() {
                    lines.push(format!("{}: {}", capitalize(retailer), "no listings found".dimmed()));
                    continue;
                }
                lines.push(format!("{}:", capitalize(retailer).bold()));
                for quote in listings {
                    lines.push(format!("  {} {}", quote.price.blue(), quote.name));
                    if !quote.link.is_empty() {
                        lines.push(format!("    {}", quote.link.dimmed()));
                    }
                }
            }
            lines.join("\n")
        }
    }
}

fn score_bar(score: u8, width: usize) -> String {
    let filled = usize::from(score.min(MAX_MATCH_SCORE)) * width / usize::from(MAX_MATCH_SCORE);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn indent(text: &str, spaces: usize) -> String {
    let pad = " ".repeat(spaces);
    text.lines()
        .map(|line| format!("{}{}", pad, line))
        .collect::<Vec<_>>()
        .join("\n")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", cut)
}
