//! Logging configuration
//!
//! Structured logging through `tracing`, printed with a compact console
//! formatter. Progress lines for the training loop go to stdout directly;
//! everything else goes through these macros.

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Maximum level to emit
    pub level: Level,
    /// Include timestamps in output
    pub show_timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            show_timestamps: true,
        }
    }
}

impl LogConfig {
    /// Verbose configuration for debugging
    pub fn verbose() -> Self {
        Self {
            level: Level::DEBUG,
            ..Self::default()
        }
    }

    /// Quiet configuration, warnings and errors only
    pub fn quiet() -> Self {
        Self {
            level: Level::WARN,
            show_timestamps: false,
        }
    }
}

/// Install the global tracing subscriber.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging(config: &LogConfig) {
    let builder = FmtSubscriber::builder()
        .with_max_level(config.level)
        .with_target(false);

    let result = if config.show_timestamps {
        tracing::subscriber::set_global_default(builder.finish())
    } else {
        tracing::subscriber::set_global_default(builder.without_time().finish())
    };

    // A subscriber may already be installed (e.g. in tests)
    let _ = result;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level_is_info() {
        assert_eq!(LogConfig::default().level, Level::INFO);
    }

    #[test]
    fn test_verbose_and_quiet_levels() {
        assert_eq!(LogConfig::verbose().level, Level::DEBUG);
        assert_eq!(LogConfig::quiet().level, Level::WARN);
        assert!(!LogConfig::quiet().show_timestamps);
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init_logging(&LogConfig::quiet());
        init_logging(&LogConfig::default());
    }
}
