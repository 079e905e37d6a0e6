use clap::Parser;
use colored::*;
use laptop_advisor::api::ApiClient;
use laptop_advisor::cli::{Args, Command, QUICK_PROMPTS};
use laptop_advisor::config::Config;
use laptop_advisor::conversation::{ChatController, Outcome, SendBlocked};
use laptop_advisor::logging;
use laptop_advisor::prices::PriceState;
use laptop_advisor::ui::{
    card_width, render_banner, render_card, render_message, render_profile,
    render_recommendations,
};
use std::io::{self, Write};
use std::process;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match Config::from_env_and_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            process::exit(1);
        }
    };

    logging::init(config.verbose);

    let client = match ApiClient::new(&config.api) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            process::exit(1);
        }
    };

    if config.verbose {
        eprintln!(
            "{}",
            format!("[advisor] Backend: {}", client.base_url()).dimmed()
        );
    }

    let controller = Arc::new(ChatController::new(
        Arc::new(client),
        config.api.price_timeout,
    ));

    println!("{}", "Laptop Recommendation Assistant".blue().bold());
    println!(
        "{}",
        "Find your perfect laptop with AI assistance. Type /help for commands.".dimmed()
    );
    println!();

    match &args.session {
        Some(session_id) => {
            println!("{}", "Resuming session...".dimmed());
            controller.resume(session_id).await;
        }
        None => {
            println!("{}", "Connecting...".dimmed());
            controller.initialize().await;
        }
    }
    print_full_view(&controller, &config, 0).await;

    if let Some(first) = args.initial_message() {
        send_and_render(&controller, &config, &first).await;
    }

    if let Err(e) = run_repl(controller, config).await {
        eprintln!("{} {}", "Error:".red(), e);
        process::exit(1);
    }
}

async fn run_repl(controller: Arc<ChatController>, config: Config) -> io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        prompt()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match Command::parse(&line) {
            Command::Empty => continue,
            Command::Quit => break,
            Command::Help => print_help(),
            Command::Send(text) => send_and_render(&controller, &config, &text).await,
            Command::Example(n) => {
                send_and_render(&controller, &config, QUICK_PROMPTS[n - 1]).await;
            }
            Command::Examples => {
                for (i, prompt) in QUICK_PROMPTS.iter().enumerate() {
                    println!("  {} {}", format!("/example {}", i + 1).cyan(), prompt);
                }
            }
            Command::NewSearch => {
                println!("{}", "Starting a new search...".dimmed());
                controller.reset().await;
                print_full_view(&controller, &config, 0).await;
            }
            Command::Profile => {
                let view = controller.view().await;
                match view.recommendations.as_ref().and_then(|r| r.profile.as_ref()) {
                    Some(profile) if !profile.is_empty() => print!("{}", render_profile(profile)),
                    _ => println!("{}", "No profile yet. Describe what you need first.".dimmed()),
                }
            }
            Command::TogglePrices(card) => spawn_price_toggle(&controller, &config, card),
            Command::Unknown(input) => {
                println!("{} {}", "Unknown command:".yellow(), input);
            }
        }
    }

    Ok(())
}

async fn send_and_render(controller: &ChatController, config: &Config, text: &str) {
    let before = controller.view().await.messages.len();
    println!("{}", "Thinking...".dimmed());

    match controller.send(text).await {
        Ok(Outcome::Applied) => print_full_view(controller, config, before).await,
        Ok(Outcome::Stale) => {}
        Err(SendBlocked::Blank) => {}
        Err(blocked) => println!("{} {}", "Not sent:".yellow(), blocked),
    }
}

/// Price lookups run in the background so the chat stays usable while
/// retailers are scraped.
fn spawn_price_toggle(controller: &Arc<ChatController>, config: &Config, card: usize) {
    let controller = Arc::clone(controller);
    let currency = config.currency_symbol.clone();
    let index = card - 1;

    tokio::spawn(async move {
        let view = controller.view().await;
        let Some(laptop) = view
            .recommendations
            .as_ref()
            .and_then(|set| set.laptops.get(index))
            .cloned()
        else {
            println!("{} {}", "No recommendation card".yellow(), card);
            return;
        };

        if matches!(controller.price_state(index).await, Some(PriceState::Hidden | PriceState::Errored(_))) {
            println!(
                "{}",
                format!("Comparing prices for {}...", laptop.display_name()).dimmed()
            );
        }
        let Some(state) = controller.toggle_prices(index).await else {
            return;
        };

        // A newer recommendation set may have replaced this card meanwhile.
        if controller.view().await.recommendations.as_ref().and_then(|s| s.laptops.get(index))
            != Some(&laptop)
        {
            return;
        }
        println!();
        println!(
            "{}",
            render_card(card, &laptop, &currency, Some(&state), card_width())
        );
        if let Err(e) = prompt() {
            tracing::debug!(error = %e, "could not redraw prompt");
        }
    });
}

async fn print_full_view(controller: &ChatController, config: &Config, from: usize) {
    let view = controller.view().await;

    if let Some(banner) = &view.banner {
        println!("{}", render_banner(banner));
    }
    for message in view.messages.iter().skip(from) {
        println!("{}", render_message(message));
        println!();
    }
    if let Some(set) = view.recommendations.as_ref().filter(|s| !s.is_empty()) {
        let prices = controller.price_states().await;
        println!(
            "{}",
            render_recommendations(set, &config.currency_symbol, &prices, card_width())
        );
        println!(
            "{}",
            "Type /prices N to compare retailer prices for card N.".dimmed()
        );
    }
}

fn prompt() -> io::Result<()> {
    write_prompt(&mut io::stdout())
}

fn write_prompt(out: &mut impl Write) -> io::Result<()> {
    write!(out, "{} ", ">".blue().bold())?;
    out.flush()
}

fn print_help() {
    println!("{}", "Commands:".bold());
    println!("{}", "  <text>          Send a message to the assistant".dimmed());
    println!("{}", "  /new            Start a new search".dimmed());
    println!("{}", "  /prices N       Show or hide price comparison for card N".dimmed());
    println!("{}", "  /profile        Show the profile behind the recommendations".dimmed());
    println!("{}", "  /examples       List example prompts".dimmed());
    println!("{}", "  /example N      Send example prompt N".dimmed());
    println!("{}", "  /quit           Exit".dimmed());
}
