//! Process-wide `tracing` subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::logging::{LogFormat, LogLevel};

/// Install the global subscriber for library-level `tracing` events.
///
/// `RUST_LOG` takes precedence over `level`. Safe to call more than once;
/// later calls are no-ops.
pub fn init_tracing(level: LogLevel, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Human => builder.compact().try_init(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        init_tracing(LogLevel::Warn, LogFormat::Human);
        init_tracing(LogLevel::Debug, LogFormat::Json);
        tracing::debug!("subscriber installed");
    }
}
