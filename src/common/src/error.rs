//! System-wide error types for NovumOS.

use core::fmt;

use crate::syscall::Syscall;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Reasons syscall dispatch refuses a trap.
///
/// Rejection happens before any console or keyboard state is touched, and the
/// user-mode API has no channel to report it, so the kernel terminates the
/// calling process instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SyscallError {
    /// The operation code is not one of the six defined syscalls.
    InvalidSyscall(usize),
    /// A pointer argument was null.
    BadAddress(Syscall),
}

impl fmt::Display for SyscallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyscallError::InvalidSyscall(number) => write!(f, "invalid syscall {}", number),
            SyscallError::BadAddress(syscall) => write!(f, "bad address passed to {}", syscall),
        }
    }
}
