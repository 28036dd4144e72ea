//! Structured Logger
//!
//! Wraps `tracing` to provide console output, optional JSON formatting,
//! daily-rotated NDJSON files, and environment-based level control.

use std::path::Path;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// File name prefix for rotated log files.
pub const LOG_FILE_PREFIX: &str = "phoneagent.log";

/// Initialize the global structured logger.
///
/// Console output goes to stderr so replies printed on stdout stay clean.
/// When `log_dir` is set, NDJSON is also written to
/// `<log_dir>/phoneagent.log.YYYY-MM-DD`. A directory that cannot be created
/// leaves console logging only.
pub fn init_logger(log_dir: Option<&Path>, level: &str, json: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    let plain_console = (!json).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_ansi(true)
    });

    let json_console = json.then(|| fmt::layer().json().with_writer(std::io::stderr));

    let mut file_error = None;
    let file_layer = log_dir
        .and_then(|dir| match file_appender(dir) {
            Ok(appender) => Some(appender),
            Err(e) => {
                file_error = Some(format!("{}: {e}", dir.display()));
                None
            }
        })
        .map(|appender| fmt::layer().json().with_writer(appender).with_ansi(false));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(plain_console)
        .with(json_console)
        .with(file_layer)
        .try_init();

    if let Some(error) = file_error {
        tracing::warn!(error = %error, "File logging disabled; logging to console only");
    }
}

/// Daily rolling appender under `dir`, creating the directory if needed.
pub fn file_appender(dir: &Path) -> Result<RollingFileAppender, InitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .build(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_appender_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join("logs");
        assert!(file_appender(&logs).is_ok());
        assert!(logs.is_dir());
    }

    #[test]
    fn test_file_appender_reports_unusable_directory() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(file_appender(&file.path().join("logs")).is_err());
    }

    #[test]
    fn test_init_logger_survives_unusable_directory() {
        let file = tempfile::NamedTempFile::new().unwrap();
        init_logger(Some(&file.path().join("logs")), "info", false);
    }
}
