//! NovumOS user-mode library.
//!
//! Thin wrappers that pack arguments into a [`SyscallFrame`] and hand it to
//! the kernel through a [`Trap`]. Nothing here keeps state between calls.
//!
//! Every call is `async`: a process is a task on the kernel executor, and
//! awaiting a call is how the process yields to the kernel. Only
//! [`getchar`] ever leaves the process suspended for longer than one trap.

#![cfg_attr(not(test), no_std)]

use core::convert::Infallible;
use core::ffi::CStr;
use core::ptr;

pub use novum_common::{CursorPosition, ExitStatus, Syscall, SyscallFrame, Trap};

/// Terminate the calling process. Never resolves.
pub async fn exit<T: Trap>(sys: &T, code: i32) -> Infallible {
    sys.trap(SyscallFrame::with_args(
        Syscall::Exit,
        [code as usize, 0, 0],
    ))
    .await;
    core::future::pending().await
}

/// Print a NUL-terminated string at the cursor.
pub async fn print<T: Trap>(sys: &T, text: &CStr) {
    sys.trap(SyscallFrame::with_args(
        Syscall::Print,
        [text.as_ptr() as usize, 0, 0],
    ))
    .await;
}

/// Wait for a key and return its ASCII code.
pub async fn getchar<T: Trap>(sys: &T) -> u8 {
    sys.trap(SyscallFrame::new(Syscall::GetChar)).await as u8
}

/// Move the cursor. Values past row 24 or column 79 land on the last row or
/// column.
pub async fn set_cursor<T: Trap>(sys: &T, row: u8, col: u8) {
    sys.trap(SyscallFrame::with_args(
        Syscall::SetCursor,
        [usize::from(row), usize::from(col), 0],
    ))
    .await;
}

/// Current cursor position as `(row, col)`.
pub async fn get_cursor<T: Trap>(sys: &T) -> (u8, u8) {
    let mut row = 0u8;
    let mut col = 0u8;
    sys.trap(SyscallFrame::with_args(
        Syscall::GetCursor,
        [
            ptr::addr_of_mut!(row) as usize,
            ptr::addr_of_mut!(col) as usize,
            0,
        ],
    ))
    .await;
    (row, col)
}

/// Blank the screen and move the cursor to the top-left corner.
pub async fn clear_screen<T: Trap>(sys: &T) {
    sys.trap(SyscallFrame::new(Syscall::ClearScreen)).await;
}
