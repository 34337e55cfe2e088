//! Tracing initialization

use tracing_subscriber::EnvFilter;

/// Initialize tracing/logging.
///
/// JSON output mode suppresses console logging entirely so structured
/// output stays machine-parseable. Otherwise logs go to stderr, at debug
/// level when `--debug` is set and `RUST_LOG` is honored throughout.
pub fn init_tracing(json_mode: bool, debug_enabled: bool) {
    if json_mode {
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
        return;
    }

    let default_filter = if debug_enabled {
        "info,tinybrew=debug,tinybrew_builder=debug"
    } else {
        "warn,tinybrew=warn"
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();
}
