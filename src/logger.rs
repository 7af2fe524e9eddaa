use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use spdlog::sink::{RotatingFileSink, RotationPolicy, StdStream, StdStreamSink};
use spdlog::{Level, LevelFilter, Logger, LoggerBuilder};

use crate::config::{Config, Log, LogLevel};

const MAX_LOG_FILES: usize = 60;

impl From<LogLevel> for Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Critical => Level::Critical,
            LogLevel::Error => Level::Error,
            LogLevel::Warn => Level::Warn,
            LogLevel::Info => Level::Info,
            LogLevel::Debug => Level::Debug,
            LogLevel::Trace => Level::Trace,
        }
    }
}

fn daily_file_sink(location: &Path) -> spdlog::Result<Arc<RotatingFileSink>> {
    let sink = RotatingFileSink::builder()
        .base_path(location)
        .rotation_policy(RotationPolicy::Daily { hour: 0, minute: 0 })
        .max_files(MAX_LOG_FILES)
        .rotate_on_open(false)
        .build()?;
    Ok(Arc::new(sink))
}

/// Warnings and errors go to stderr, everything below to stdout.
fn add_console_sinks(builder: &mut LoggerBuilder) -> spdlog::Result<()> {
    let split = Level::Warn;
    let out = StdStreamSink::builder()
        .std_stream(StdStream::Stdout)
        .level_filter(LevelFilter::MoreVerbose(split))
        .build()?;
    let err = StdStreamSink::builder()
        .std_stream(StdStream::Stderr)
        .level_filter(LevelFilter::MoreSevereEqual(split))
        .build()?;

    builder.sink(Arc::new(out)).sink(Arc::new(err));
    Ok(())
}

/// Logger for a `[log]` section. Without a file location it logs to the console only.
pub fn build_logger(log: &Log) -> spdlog::Result<Arc<Logger>> {
    let mut builder = Logger::builder();

    if let Some(ref location) = log.location {
        builder.sink(daily_file_sink(location)?);
    }
    if log.log_to_console || log.location.is_none() {
        add_console_sinks(&mut builder)?;
    }

    let logger = Arc::new(builder.build()?);
    logger.set_level_filter(LevelFilter::MoreSevereEqual(log.level.into()));
    logger.set_flush_level_filter(LevelFilter::MoreSevereEqual(Level::Info));
    logger.set_flush_period(Some(Duration::from_secs(2)));
    Ok(logger)
}

/// Replaces spdlog's default console logger when the configuration has a `[log]` section.
pub fn configure_logger(config: &Config) -> spdlog::Result<()> {
    if let Some(ref log) = config.log {
        spdlog::set_default_logger(build_logger(log)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use spdlog::info;

    use super::*;

    #[test]
    fn test_file_logger() {
        let dir = tempfile::tempdir().unwrap();
        let log = Log {
            level: LogLevel::Info,
            log_to_console: false,
            location: Some(dir.path().join("instagent.log")),
        };

        let logger = build_logger(&log).unwrap();
        assert!(logger.should_log(Level::Warn));
        assert!(!logger.should_log(Level::Debug));

        info!(logger: logger, "Image written");
        logger.flush();

        let files: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_console_only_logger() {
        let log = Log {
            level: LogLevel::Error,
            log_to_console: false,
            location: None,
        };
        let logger = build_logger(&log).unwrap();
        assert_eq!(logger.sinks().len(), 2);
        assert!(!logger.should_log(Level::Warn));
    }
}
