//! Architecture-specific implementations.
//!
//! This module provides platform abstractions for different target architectures.
//! Currently supported: bare-metal x86_64. Hosted builds (unit tests) get
//! the portable fallbacks below.

#[cfg(all(target_arch = "x86_64", target_os = "none"))]
pub mod x86_64;

/// Runs `f` with maskable interrupts disabled.
///
/// Used around state shared with the keyboard interrupt handler.
#[inline]
pub fn without_interrupts<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    #[cfg(all(target_arch = "x86_64", target_os = "none"))]
    {
        ::x86_64::instructions::interrupts::without_interrupts(f)
    }
    #[cfg(not(all(target_arch = "x86_64", target_os = "none")))]
    {
        f()
    }
}
