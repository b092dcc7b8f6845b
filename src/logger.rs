//! Process-wide logger setup.
//!
//! The `env_logger` backend is installed once; later calls only move the
//! global max level, so reconfiguring never stacks handlers.

use std::io::Write;

use log::LevelFilter;
use once_cell::sync::OnceCell;

use crate::config::LogLevel;
use crate::error::Result;

static INSTALLED: OnceCell<()> = OnceCell::new();

/// Install the backend on first call, starting at `initial`.
fn install(initial: LogLevel) {
    INSTALLED.get_or_init(|| {
        let result = env_logger::Builder::new()
            .filter_level(LevelFilter::Trace)
            .format(|buf, record| {
                writeln!(
                    buf,
                    "{} - {:<7} - {} - {}",
                    buf.timestamp(),
                    record.level(),
                    record.target(),
                    record.args()
                )
            })
            .try_init();
        // Another logger already owns the facade; keep using it.
        if result.is_err() {
            log::debug!("a global logger was already installed");
        }
        log::set_max_level(initial.to_filter());
    });
}

/// Install the logger if needed and set the threshold.
pub fn init(level: LogLevel) {
    install(level);
    log::set_max_level(level.to_filter());
}

/// Same as [`init`], from a level name such as `"warning"`.
pub fn set_log_level(level: &str) -> Result<()> {
    init(level.parse()?);
    Ok(())
}

/// Install at `level` unless already installed; an existing threshold is kept.
pub fn ensure_init_at(level: LogLevel) {
    install(level);
}

/// Install with the default threshold unless already installed.
pub fn ensure_init() {
    ensure_init_at(LogLevel::default());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reinit_only_moves_the_level() {
        init(LogLevel::Error);
        assert_eq!(log::max_level(), LevelFilter::Error);
        init(LogLevel::Debug);
        assert_eq!(log::max_level(), LevelFilter::Debug);
        ensure_init();
        assert_eq!(log::max_level(), LevelFilter::Debug);
        ensure_init_at(LogLevel::Error);
        assert_eq!(log::max_level(), LevelFilter::Debug);
        assert!(INSTALLED.get().is_some());
        assert!(set_log_level("loud").is_err());
        assert_eq!(log::max_level(), LevelFilter::Debug);
    }
}
