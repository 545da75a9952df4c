//! Development-time tracing for the workplace CLI.
//!
//! Workflow diagnostics (which file was scanned, which line leaked a key,
//! why a plan fell back) are emitted as `tracing` events. They are not part
//! of the workflow result returned to callers.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing subscriber for development logging.
///
/// Reads `RUST_LOG` env var. Defaults to `warn` if unset.
/// Output: stderr, compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=workplace=debug cargo run -p workplace -- scan https://github.com/alice/demo
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
