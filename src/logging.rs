use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. Logs go to stderr so that stdout stays
/// parseable; `RUST_LOG` overrides the default directives.
pub fn init_logging(debug: bool) {
    let default_directive = if debug {
        "comment_dashboard=debug,tower_http=debug,info"
    } else {
        "comment_dashboard=info,warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}
