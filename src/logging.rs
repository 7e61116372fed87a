//! Tracing subscriber bootstrap.

use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

static INITIALIZED: OnceLock<()> = OnceLock::new();

/// Install a global fmt subscriber. `RUST_LOG` takes precedence over `level`.
///
/// Returns `false` when a subscriber was already installed.
pub fn init_logging(level: &str) -> bool {
    if INITIALIZED.get().is_some() {
        return false;
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init()
        .is_ok();

    INITIALIZED.set(()).is_ok() && installed
}
