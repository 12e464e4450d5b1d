//! System Call Handler
//!
//! Decodes a trap frame and runs the matching operation.
//!
//! Unknown numbers and null pointers are rejected here, before any state is
//! touched. Past this point operations cannot fail.

use log::{debug, trace, warn};
use novum_common::{Syscall, SyscallError, SyscallFrame};

use super::validate;
use crate::process::Pid;
use crate::state::KernelState;

/// What the trap should do after dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Resume the caller with this return value.
    Return(usize),
    /// Park the caller until a key arrives, then return it.
    WaitForKey,
    /// Tear the caller down with this exit code.
    Exit(i32),
}

/// Dispatch a system call.
///
/// # Safety contract
///
/// Pointer arguments are dereferenced directly: the kernel shares the
/// caller's address space. Null pointers are rejected.
pub fn dispatch(kernel: &KernelState, pid: Pid, frame: SyscallFrame) -> Result<Outcome, SyscallError> {
    let syscall = match Syscall::try_from(frame.number) {
        Ok(syscall) => syscall,
        Err(err) => {
            warn!("process {}: {}", pid, err);
            return Err(err);
        }
    };
    trace!("process {}: {} {:x?}", pid, syscall, frame.args);

    let [arg0, arg1, _] = frame.args;
    match syscall {
        Syscall::Exit => sys_exit(pid, validate::exit_code(arg0)),
        Syscall::Print => sys_print(kernel, arg0),
        Syscall::GetChar => Ok(Outcome::WaitForKey),
        Syscall::SetCursor => sys_set_cursor(
            kernel,
            validate::coordinate(arg0),
            validate::coordinate(arg1),
        ),
        Syscall::GetCursor => sys_get_cursor(kernel, arg0, arg1),
        Syscall::ClearScreen => sys_clear_screen(kernel),
    }
}

fn sys_exit(pid: Pid, code: i32) -> Result<Outcome, SyscallError> {
    debug!("process {}: exit({})", pid, code);
    Ok(Outcome::Exit(code))
}

fn sys_print(kernel: &KernelState, addr: usize) -> Result<Outcome, SyscallError> {
    // SAFETY: single address space; the SDK passes a `&CStr` that outlives the trap.
    let text = unsafe { validate::user_str(Syscall::Print, addr)? };
    kernel.console.lock().print(text.to_bytes());
    Ok(Outcome::Return(0))
}

fn sys_set_cursor(kernel: &KernelState, row: u8, col: u8) -> Result<Outcome, SyscallError> {
    let stored = kernel.console.lock().set_cursor(row, col);
    if (stored.row, stored.col) != (row, col) {
        debug!("set_cursor({}, {}) clamped to ({}, {})", row, col, stored.row, stored.col);
    }
    Ok(Outcome::Return(0))
}

fn sys_get_cursor(kernel: &KernelState, row_addr: usize, col_addr: usize) -> Result<Outcome, SyscallError> {
    let row_out = validate::user_out_byte(Syscall::GetCursor, row_addr)?;
    let col_out = validate::user_out_byte(Syscall::GetCursor, col_addr)?;
    let cursor = kernel.console.lock().cursor();
    // SAFETY: both locations are non-null and, in the single address space,
    // point at the caller's live output bytes.
    unsafe {
        row_out.as_ptr().write(cursor.row);
        col_out.as_ptr().write(cursor.col);
    }
    Ok(Outcome::Return(0))
}

fn sys_clear_screen(kernel: &KernelState) -> Result<Outcome, SyscallError> {
    kernel.console.lock().clear();
    Ok(Outcome::Return(0))
}
