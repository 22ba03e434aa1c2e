//! Logger setup for the binary.
//!
//! The library only logs through the `log` facade; only `main` starts a
//! backend. The level spec comes from `RUST_LOG` when set, otherwise from
//! the default passed in (e.g. `"info"` or `"fluidbox=debug"`).

use flexi_logger::{DeferredNow, FlexiLoggerError, Logger, LoggerHandle, Record};

/// Starts logging to stderr. Keep the returned handle alive for as long as
/// logs should be written.
pub fn setup(default_spec: &str) -> Result<LoggerHandle, FlexiLoggerError> {
    Logger::try_with_env_or_str(default_spec)?
        .log_to_stderr()
        .format(line_format)
        .start()
}

/// One line per record: level, wall time, module, message.
pub fn line_format(
    w: &mut dyn std::io::Write,
    now: &mut DeferredNow,
    record: &Record,
) -> Result<(), std::io::Error> {
    write!(
        w,
        "{:<5} [{}] [{}] {}",
        record.level(),
        now.format("%H:%M:%S%.3f"),
        record.module_path().unwrap_or("<unnamed>"),
        record.args()
    )
}
