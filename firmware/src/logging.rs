//! Global logger instance used by the `log` crate.
//!
//! Records are written to the PS UART so they interleave with the companion
//! core's own console output on the same serial line.

use crate::uart::Uart;
use core::fmt::Write;
use spin::Mutex;

static UART: Mutex<Option<Uart>> = Mutex::new(None);

/// The backed logger instance used for the `log` crate.
static LOGGER: UartLogger = UartLogger;

/// An API that is backed by the static UART writer.
struct UartLogger;

impl log::Log for UartLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        if cfg!(debug_assertions) {
            true
        } else {
            metadata.level() <= log::Level::Info
        }
    }

    fn log(&self, record: &log::Record) {
        if let Some(uart) = UART.lock().as_mut() {
            // The UART cannot fail and `write_str` never errors.
            let _ = write!(uart, "[{:5}] {}\r\n", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

pub fn init(mut uart: Uart) {
    uart.init();
    *UART.lock() = Some(uart);

    // Only fails if a logger is already set, and this runs exactly once.
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    });
}
