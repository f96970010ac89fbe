//! Tracing setup: compact stdout output plus an optional daily log file.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::LoggingConfig;

/// Keeps the file writer flushing; drop it only at exit.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Install the global subscriber.
///
/// `RUST_LOG` overrides the configured level. If the log directory cannot be
/// created, logging continues on stdout only.
pub fn init(config: &LoggingConfig) -> LoggingGuard {
    let stdout_layer = fmt::layer().with_target(true).compact();

    let mut warn_msg = None;
    let (file_layer, file_guard) = match &config.dir {
        Some(dir) => match std::fs::create_dir_all(dir) {
            Ok(()) => {
                let appender = tracing_appender::rolling::daily(dir, &config.file_prefix);
                let (writer, guard) = tracing_appender::non_blocking(appender);
                let layer = fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_ansi(false)
                    .compact()
                    .with_writer(writer);
                (Some(layer), Some(guard))
            }
            Err(e) => {
                warn_msg = Some(format!(
                    "file logging disabled ({}): {e}",
                    dir.display()
                ));
                (None, None)
            }
        },
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(build_filter(config))
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .ok();

    if let Some(message) = warn_msg {
        tracing::warn!("{message}");
    }

    LoggingGuard {
        _file_guard: file_guard,
    }
}

fn build_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_level_falls_back() {
        let config = LoggingConfig {
            level: "not a [filter".to_string(),
            ..LoggingConfig::default()
        };
        // Must not panic; RUST_LOG may or may not be set in the test env
        let _ = build_filter(&config);
    }

    #[test]
    fn init_creates_log_dir() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");
        let config = LoggingConfig {
            dir: Some(log_dir.clone()),
            ..LoggingConfig::default()
        };

        let _guard = init(&config);
        assert!(log_dir.is_dir());
    }
}
