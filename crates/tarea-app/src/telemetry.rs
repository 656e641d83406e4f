use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

/// Install a compact stderr subscriber for the embedding shell.
///
/// `RUST_LOG` selects the filter; INFO applies when it is unset or invalid.
/// Calling this more than once keeps the first subscriber.
pub fn install_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .compact()
        .try_init();
}
