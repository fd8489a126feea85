use tracing_subscriber::EnvFilter;

use crate::config::LogFormat;

/// Install the process-wide subscriber. Writes to stderr, `info` unless
/// `RUST_LOG` says otherwise. Call once, before anything is spawned.
pub fn init(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Full => builder.init(),
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
}
