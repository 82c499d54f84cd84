use envkey_core::constants::ENVKEY_LOG_VAR;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Re-export tracing macros for convenience
pub use tracing::{debug, error, info, instrument, span, trace, warn, Level, Span};

/// Default filter when `ENVKEY_LOG` is unset or invalid
const DEFAULT_FILTER: &str = "warn";

/// Initialize the tracing system
///
/// Reads the filter from `ENVKEY_LOG` and writes compact lines to stderr so
/// stdout stays free for resolver output. Colour is used only when stderr is
/// a terminal. Fails if a global subscriber is already installed.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let filter = EnvFilter::try_from_env(ENVKEY_LOG_VAR)
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(is_tty())
        .compact()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Check if we're running in a TTY environment
fn is_tty() -> bool {
    std::io::IsTerminal::is_terminal(&std::io::stderr())
}

/// Span wrapping one resolver invocation
pub fn fetch_span(binary: &str) -> Span {
    span!(Level::DEBUG, "fetch", binary = %binary)
}
