//! Tracing subscriber setup for the CLI.

use tracing_subscriber::{EnvFilter, fmt};

/// Builds the filter directive for `level`, scoped to this crate.
///
/// Dependencies stay at `warn` so HTTP client chatter does not drown out
/// poll progress.
#[must_use]
pub fn filter_directive(level: &str) -> String {
    format!("flexcheck={level},reqwest=warn,hyper=warn")
}

/// Installs a stderr `fmt` subscriber.
///
/// `RUST_LOG` wins over `level` when set. Installing twice is a no-op, so
/// tests and the binary can both call this.
pub fn init(level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_directive(level)));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .try_init()
        .ok();
}
