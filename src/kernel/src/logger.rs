//! `log` backend writing to COM1.

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

use crate::serial_println;

static LOGGER: SerialLogger = SerialLogger;

/// Installs the serial logger with `level` as the most verbose level.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}

struct SerialLogger;

impl Log for SerialLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let module = record.module_path().unwrap_or_default();
        serial_println!("[{:<5}] {}: {}", record.level(), module, record.args());
    }

    fn flush(&self) {}
}
