//! Types shared between the NovumOS kernel and user-mode programs.
//!
//! Everything in here is part of the syscall wire contract: the operation
//! numbering, the register frame a trap carries, and the value types the
//! console operations exchange.

#![cfg_attr(not(test), no_std)]

pub mod cursor;
pub mod error;
pub mod syscall;

pub use cursor::{CursorPosition, SCREEN_COLS, SCREEN_ROWS};
pub use error::SyscallError;
pub use syscall::{ExitStatus, Syscall, SyscallFrame, Trap};
