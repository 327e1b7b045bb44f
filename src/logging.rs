use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::Config;
use thiserror::Error;

const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {l} [{M}] {m}{n}";

/// Sets up the global logger, always logging to file and optionally also to stdout
///
/// # Arguments
///
/// * 'log_path' - path to the log file
/// * 'log_level' - the level to log at
/// * 'log_to_stdout' - whether to also log to stdout
pub fn setup_logger(log_path: &str, log_level: LevelFilter, log_to_stdout: bool) -> Result<log4rs::Handle, LoggerError> {
    let file = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build(log_path)
        .map_err(|e| LoggerError(format!("file appender for {}: {}", log_path, e)))?;

    let mut builder = Config::builder()
        .appender(Appender::builder().build("file", Box::new(file)));
    let mut root = Root::builder().appender("file");

    if log_to_stdout {
        let stdout = ConsoleAppender::builder()
            .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
            .build();
        builder = builder.appender(Appender::builder().build("stdout", Box::new(stdout)));
        root = root.appender("stdout");
    }

    let config = builder
        .build(root.build(log_level))
        .map_err(|e| LoggerError(e.to_string()))?;

    log4rs::init_config(config)
        .map_err(|e| LoggerError(e.to_string()))
}

/// Error depicting errors that occur while setting up the logger
///
#[derive(Debug, Error)]
#[error("LoggerError: {0}")]
pub struct LoggerError(pub String);
