//! Tracing subscriber setup

use crate::config::LoggingSettings;
use crate::domain::LogFormat;
use crate::{Error, Result};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init(settings: &LoggingSettings) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.level.as_str()));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match settings.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };

    installed.map_err(|e| Error::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LogLevel;

    #[test]
    fn test_second_init_is_reported() {
        let settings = LoggingSettings {
            level: LogLevel::Debug,
            format: LogFormat::Compact,
        };

        // Whichever call loses the race for the global subscriber must error
        let first = init(&settings);
        let second = init(&settings);
        assert!(first.is_err() || second.is_err());
        assert!(matches!(second, Err(Error::Logging(_))));
    }
}
