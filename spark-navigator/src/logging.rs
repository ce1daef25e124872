use tracing_subscriber::EnvFilter;

/// Used when `RUST_LOG` is not set. Dry-run commands and dropped input are
/// logged by the library crates, so they get the same level as the navigator.
pub const DEFAULT_LOG_FILTER: &str = "spark_navigator=info,spark_transport=info,spark_detect=info";

pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Installs the global subscriber. `log` records are forwarded to it.
pub fn init() {
    tracing_subscriber::fmt().with_env_filter(env_filter()).init();
}
