//! Bare-metal x86_64 support.
//!
//! The VGA text display the console renders to, the COM1 log sink, and the
//! IDT and PICs that turn keystrokes into keyboard queue entries.

pub mod interrupts;
pub mod serial;
pub mod vga;

pub use vga::VgaDisplay;

/// Parks the CPU for good. Interrupts still run.
pub fn halt_loop() -> ! {
    loop {
        ::x86_64::instructions::hlt();
    }
}
