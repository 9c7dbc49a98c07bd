/*
 * Serial Logger
 *
 * Routes the `log` facade to the COM1 console.
 */

use crate::serial_println;
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

pub struct SerialLogger;

static LOGGER: SerialLogger = SerialLogger;

impl Log for SerialLogger {
	fn enabled(&self, metadata: &Metadata) -> bool {
		metadata.level() <= log::max_level()
	}

	fn log(&self, record: &Record) {
		if self.enabled(record.metadata()) {
			serial_println!("[{}] {}: {}", record.level(), record.target(), record.args());
		}
	}

	fn flush(&self) {}
}

/*
 * init_logger - Install the serial logger
 * @level: most verbose level that reaches the console
 *
 * The serial port must already be initialized.
 */
pub fn init_logger(level: LevelFilter) -> Result<(), SetLoggerError> {
	log::set_logger(&LOGGER)?;
	log::set_max_level(level);
	Ok(())
}
