//! Compose tagged markdown fragments into context files for coding assistants.

pub mod app;
pub mod cli;
pub mod domain;
pub mod infra;
pub mod ui;

#[cfg(test)]
mod test_support;

use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber. `CTX_LOG` takes precedence over `verbose`.
pub fn init_logging(verbose: bool) {
    let fallback = if verbose { "ctx=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("CTX_LOG").unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
