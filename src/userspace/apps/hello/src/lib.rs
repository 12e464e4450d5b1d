//! Hello-world sample program.
//!
//! Greets from the middle of the screen and exits on the first key press.

#![no_std]

use novum_sdk::{self as nv, Trap};

/// Program entry point.
pub async fn main<T: Trap>(sys: T) -> i32 {
    nv::clear_screen(&sys).await;
    nv::set_cursor(&sys, 10, 30).await;
    nv::print(&sys, c"Hello from ELF User Mode!").await;
    nv::set_cursor(&sys, 12, 30).await;
    nv::print(&sys, c"Press any key to exit...").await;

    nv::getchar(&sys).await;

    match nv::exit(&sys, 0).await {}
}
