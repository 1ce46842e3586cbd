use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "AURA_FIND_LOG";

/// Installs the stderr subscriber. `AURA_FIND_LOG` takes precedence over
/// `--verbose`; stdout stays reserved for command output.
pub fn init(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
