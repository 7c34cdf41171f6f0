use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Maps the `-v` count to the most verbose level shown.
pub fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::ERROR,
        1 => LevelFilter::WARN,
        2 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    }
}

/// Installs the stderr subscriber. `RUST_LOG` takes precedence over `verbosity`.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init(verbosity: u8) -> bool {
    let filter = EnvFilter::builder()
        .with_default_directive(level_for(verbosity).into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init()
        .is_ok()
}
