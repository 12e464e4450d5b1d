//! NovumOS Kernel
//!
//! The console subsystem of a single-address-space kernel: the text console
//! state, the interrupt-fed keyboard queue, and the six-entry syscall table
//! user programs reach them through.
//!
//! # Architecture
//!
//! The kernel is structured into the following modules:
//! - `console`: cursor and screen buffer, the only writer of the display
//! - `task`: cooperative executor and the keyboard input queue
//! - `process`: process table and the user-mode gate
//! - `syscall`: decoding, validation and dispatch of traps
//! - `state`: the kernel-wide singleton tying the above together
//! - `arch`: platform-specific code (VGA, serial, interrupts)
//!
//! # Safety
//!
//! All unsafe code is documented with safety invariants explaining why the
//! usage is correct.

#![cfg_attr(not(test), no_std)]
#![cfg_attr(
    all(target_arch = "x86_64", target_os = "none"),
    feature(abi_x86_interrupt)
)]
#![warn(missing_docs)]

extern crate alloc;

pub mod arch;
pub mod boot;
pub mod config;
pub mod console;
pub mod process;
pub mod state;
pub mod syscall;
pub mod task;
pub mod testutil;

#[cfg(all(target_arch = "x86_64", target_os = "none"))]
pub mod allocator;
#[cfg(all(target_arch = "x86_64", target_os = "none"))]
pub mod logger;
#[cfg(all(target_arch = "x86_64", target_os = "none"))]
pub mod memory;

pub use config::KernelConfig;
pub use state::{init, kernel, KernelState};

/// Initializes the platform devices the kernel logs through.
///
/// Called first in the boot process, before the heap exists.
pub fn init_platform() {
    #[cfg(all(target_arch = "x86_64", target_os = "none"))]
    {
        arch::x86_64::serial::init();
    }
}
