//! Tracing setup shared by the desktop and web binaries.

/// Install a `tracing` subscriber filtered by `RUST_LOG`, falling back to `default_filter`.
///
/// Returns `false` if a global subscriber was already set.
pub fn init_tracing(default_filter: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .compact()
        .try_init()
        .is_ok()
}
