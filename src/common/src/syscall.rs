//! Syscall numbering and the trap frame.
//!
//! The numeric codes are the binary contract between user mode and the kernel
//! and must never be renumbered.

use core::fmt;
use core::future::Future;

use crate::error::SyscallError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The six console syscalls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(usize)]
pub enum Syscall {
    /// Terminate the calling process.
    Exit = 0,
    /// Write a NUL-terminated string at the cursor.
    Print = 1,
    /// Block until a key is available and return it.
    GetChar = 2,
    /// Move the cursor, clamping out-of-range coordinates.
    SetCursor = 3,
    /// Store the cursor coordinates through two output pointers.
    GetCursor = 4,
    /// Blank the screen and home the cursor.
    ClearScreen = 5,
}

impl Syscall {
    /// The wire number of this syscall.
    pub const fn number(self) -> usize {
        self as usize
    }

    /// Lower-case mnemonic, as used in log output.
    pub const fn name(self) -> &'static str {
        match self {
            Syscall::Exit => "exit",
            Syscall::Print => "print",
            Syscall::GetChar => "getchar",
            Syscall::SetCursor => "set_cursor",
            Syscall::GetCursor => "get_cursor",
            Syscall::ClearScreen => "clear_screen",
        }
    }
}

impl TryFrom<usize> for Syscall {
    type Error = SyscallError;

    fn try_from(number: usize) -> Result<Self, Self::Error> {
        match number {
            0 => Ok(Syscall::Exit),
            1 => Ok(Syscall::Print),
            2 => Ok(Syscall::GetChar),
            3 => Ok(Syscall::SetCursor),
            4 => Ok(Syscall::GetCursor),
            5 => Ok(Syscall::ClearScreen),
            other => Err(SyscallError::InvalidSyscall(other)),
        }
    }
}

impl fmt::Display for Syscall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Register image of a trap: the operation code plus up to three arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyscallFrame {
    /// Raw operation code; may be outside the defined set.
    pub number: usize,
    /// Argument registers. Unused slots are zero.
    pub args: [usize; 3],
}

impl SyscallFrame {
    /// A frame with no arguments.
    pub const fn new(syscall: Syscall) -> Self {
        Self::raw(syscall.number(), [0; 3])
    }

    /// A frame for a defined syscall with the given arguments.
    pub const fn with_args(syscall: Syscall, args: [usize; 3]) -> Self {
        Self::raw(syscall.number(), args)
    }

    /// A frame with an arbitrary operation code.
    pub const fn raw(number: usize, args: [usize; 3]) -> Self {
        Self { number, args }
    }
}

/// The gate from user mode into syscall dispatch.
///
/// The returned future resolves with the value of the return register once
/// the kernel has finished the call. A call that ends the process never
/// resolves.
pub trait Trap {
    /// Enter the kernel with `frame`.
    fn trap(&self, frame: SyscallFrame) -> impl Future<Output = usize>;
}

/// How a process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ExitStatus {
    /// The process called `exit` (or its entry point returned) with this code.
    Exited(i32),
    /// The kernel terminated the process for a rejected syscall.
    Faulted(SyscallError),
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitStatus::Exited(code) => write!(f, "exited with status {}", code),
            ExitStatus::Faulted(err) => write!(f, "terminated: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_numbers_are_stable() {
        assert_eq!(Syscall::Exit.number(), 0);
        assert_eq!(Syscall::Print.number(), 1);
        assert_eq!(Syscall::GetChar.number(), 2);
        assert_eq!(Syscall::SetCursor.number(), 3);
        assert_eq!(Syscall::GetCursor.number(), 4);
        assert_eq!(Syscall::ClearScreen.number(), 5);
    }

    #[test]
    fn test_decode_round_trips_defined_codes() {
        for number in 0..6 {
            let syscall = Syscall::try_from(number).expect("defined code");
            assert_eq!(syscall.number(), number);
        }
    }

    #[test]
    fn test_decode_rejects_unknown_codes() {
        assert_eq!(
            Syscall::try_from(6),
            Err(SyscallError::InvalidSyscall(6))
        );
        assert_eq!(
            Syscall::try_from(usize::MAX),
            Err(SyscallError::InvalidSyscall(usize::MAX))
        );
    }
}
