use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "advisor")]
#[command(about = "Chat with the laptop recommendation assistant", long_about = None)]
pub struct Args {
    #[arg(
        long = "api-base",
        help = "Backend API base URL (default: http://localhost:8000/api)"
    )]
    pub api_base: Option<String>,

    #[arg(
        long = "request-timeout",
        help = "Timeout in seconds for session and message requests"
    )]
    pub request_timeout: Option<u64>,

    #[arg(
        long = "price-timeout",
        help = "Timeout in seconds for price comparison lookups"
    )]
    pub price_timeout: Option<u64>,

    #[arg(
        short = 's',
        long = "session",
        help = "Resume an existing session by id instead of starting a new one"
    )]
    pub session: Option<String>,

    #[arg(long = "config", help = "Read configuration from this file")]
    pub config: Option<PathBuf>,

    #[arg(short = 'v', long = "verbose", help = "Print diagnostic output")]
    pub verbose: bool,

    #[arg(help = "Optional first message to send once the session is ready")]
    pub message: Vec<String>,
}

impl Args {
    pub fn initial_message(&self) -> Option<String> {
        let joined = self.message.join(" ");
        if joined.trim().is_empty() {
            None
        } else {
            Some(joined)
        }
    }
}

pub const QUICK_PROMPTS: &[&str] = &[
    "I need a gaming laptop under ₹1,00,000 with a strong GPU",
    "Suggest a light laptop for college with long battery life, budget ₹50,000",
    "I'm a programmer and want fast processing and 16 GB RAM under ₹90,000",
    "Show me a thin and light laptop with a great display for travel",
];

/// One line of interactive input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Send(String),
    NewSearch,
    /// 1-based card number as typed.
    TogglePrices(usize),
    Profile,
    Examples,
    Example(usize),
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Command::Empty;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Command::Send(line.to_string());
        };

        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or_default().to_lowercase();
        let number = parts.next().and_then(|n| n.parse::<usize>().ok());

        match (name.as_str(), number) {
            ("new" | "reset", _) => Command::NewSearch,
            ("prices" | "price", Some(n)) if n > 0 => Command::TogglePrices(n),
            ("profile", _) => Command::Profile,
            ("examples", _) => Command::Examples,
            ("example", Some(n)) if n > 0 && n <= QUICK_PROMPTS.len() => Command::Example(n),
            ("help" | "?", _) => Command::Help,
            ("quit" | "exit" | "q", _) => Command::Quit,
            _ => Command::Unknown(line.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_send() {
        assert_eq!(
            Command::parse("  gaming laptop  "),
            Command::Send("gaming laptop".to_string())
        );
        assert_eq!(Command::parse("   "), Command::Empty);
    }

    #[test]
    fn test_slash_commands() {
        assert_eq!(Command::parse("/new"), Command::NewSearch);
        assert_eq!(Command::parse("/prices 2"), Command::TogglePrices(2));
        assert_eq!(Command::parse("/example 1"), Command::Example(1));
        assert_eq!(Command::parse("/QUIT"), Command::Quit);
        assert!(matches!(Command::parse("/prices 0"), Command::Unknown(_)));
        assert!(matches!(Command::parse("/example 99"), Command::Unknown(_)));
        assert!(matches!(Command::parse("/dance"), Command::Unknown(_)));
    }

    #[test]
    fn test_initial_message_joins_words() {
        let args = Args::parse_from(["advisor", "budget", "laptop"]);
        assert_eq!(args.initial_message().as_deref(), Some("budget laptop"));
        let args = Args::parse_from(["advisor"]);
        assert!(args.initial_message().is_none());
    }
}
