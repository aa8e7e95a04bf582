//! Diagnostic logging setup
//!
//! Logs go to stderr so command output on stdout stays clean. `RUST_LOG`
//! overrides the default filter.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn filter(verbose: bool) -> EnvFilter {
    let default = if verbose {
        "capex_ledger=debug,info"
    } else {
        "capex_ledger=info"
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install the global subscriber: compact text, or JSON lines for servers
pub fn init_logging(verbose: bool, json: bool) {
    let registry = tracing_subscriber::registry().with(filter(verbose));

    let base = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    // a second init (e.g. from tests) is harmless
    let _ = if json {
        registry.with(base.json()).try_init()
    } else {
        registry.with(base.with_target(false).compact()).try_init()
    };
}
