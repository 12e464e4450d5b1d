//! COM1 log sink.
//!
//! The kernel log goes here, never to the console the user programs own.

use core::fmt::{self, Write};
use spin::{Mutex, Once};
use uart_16550::SerialPort;

const COM1: u16 = 0x3F8;

static PORT: Once<Mutex<SerialPort>> = Once::new();

/// Programs the UART. Later calls do nothing.
pub fn init() {
    port();
}

fn port() -> &'static Mutex<SerialPort> {
    PORT.call_once(|| {
        // SAFETY: 0x3F8 is COM1 on every PC-compatible machine and nothing
        // else in the kernel drives it.
        let mut port = unsafe { SerialPort::new(COM1) };
        port.init();
        Mutex::new(port)
    })
}

/// Writes formatted text to COM1.
#[macro_export]
macro_rules! serial_print {
    ($($arg:tt)*) => {
        $crate::arch::x86_64::serial::write(format_args!($($arg)*))
    };
}

/// Writes formatted text and a newline to COM1.
#[macro_export]
macro_rules! serial_println {
    () => ($crate::serial_print!("\n"));
    ($($arg:tt)*) => ($crate::serial_print!("{}\n", format_args!($($arg)*)))
}

/// Backend of the serial macros.
///
/// The port is held with interrupts off: an exception handler that logs
/// would otherwise spin on a lock its own CPU holds.
#[doc(hidden)]
pub fn write(args: fmt::Arguments) {
    crate::arch::without_interrupts(|| {
        // Write errors are dropped.
        let _ = port().lock().write_fmt(args);
    });
}
