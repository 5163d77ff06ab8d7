//! Subscriber setup for the `persona-review` binary.
//!
//! The batch report is the only thing written to stdout, so it can be piped
//! straight into another tool; every log line goes to stderr instead.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise `level` is the floor. With `json`
/// each event is one JSON object per line. A second call leaves the first
/// subscriber in place.
pub fn init_tracing(json: bool, level: Level) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    let registry = tracing_subscriber::registry().with(filter);
    let stderr_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    let installed = if json {
        registry.with(stderr_layer.json()).try_init()
    } else {
        registry.with(stderr_layer).try_init()
    };
    if installed.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}
