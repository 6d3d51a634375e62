//! Log output for the `twinval` binary.
//!
//! Issue lines and JSON reports are the program's result and go to stdout.
//! Run progress from the engine and the directory client goes to stderr,
//! so `twinval validate > issues.txt` captures findings only.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins when set (e.g. `RUST_LOG=twin_directory=debug` to see
/// every directory response); otherwise `level` applies. With `json` each
/// log event is one JSON object per line. A subscriber that is already
/// installed is left in place.
pub fn init_tracing(json: bool, level: Level) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    let stderr_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if json {
        registry.with(stderr_layer.json()).try_init()
    } else {
        registry.with(stderr_layer).try_init()
    };
    if installed.is_err() {
        tracing::debug!("Log subscriber already installed");
    }
}
