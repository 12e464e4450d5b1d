//! Argument validation for syscalls.
//!
//! Everything here runs before a handler touches console or keyboard state,
//! so a rejected call leaves no trace.

use core::ffi::{c_char, CStr};
use core::ptr::NonNull;

use novum_common::{Syscall, SyscallError};

/// Reads a NUL-terminated string argument.
///
/// # Safety
///
/// A non-null `addr` must point to a NUL-terminated string that stays valid
/// and unmodified for `'a`. In the single address space every process
/// pointer is directly addressable by the kernel.
pub(super) unsafe fn user_str<'a>(syscall: Syscall, addr: usize) -> Result<&'a CStr, SyscallError> {
    if addr == 0 {
        return Err(SyscallError::BadAddress(syscall));
    }
    // SAFETY: non-null checked above; validity is the caller's contract.
    Ok(unsafe { CStr::from_ptr(addr as *const c_char) })
}

/// Checks a one-byte output location.
pub(super) fn user_out_byte(syscall: Syscall, addr: usize) -> Result<NonNull<u8>, SyscallError> {
    NonNull::new(addr as *mut u8).ok_or(SyscallError::BadAddress(syscall))
}

/// Narrows a register to the 8-bit coordinate the ABI defines.
pub(super) fn coordinate(arg: usize) -> u8 {
    arg as u8
}

/// Narrows a register to the signed exit code.
pub(super) fn exit_code(arg: usize) -> i32 {
    arg as i32
}
