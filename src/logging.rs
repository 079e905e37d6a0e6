use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_ENV: &str = "ADVISOR_LOG";

/// Install the stderr subscriber. `ADVISOR_LOG` takes precedence over the
/// verbose flag. Calling this twice is harmless.
pub fn init(verbose: bool) {
    let fallback = if verbose {
        "laptop_advisor=debug"
    } else {
        "laptop_advisor=warn"
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .try_init();
}
