//! Calculator demo program.
//!
//! Shows a title card describing the SDK and waits for a key before exiting.

#![no_std]

use novum_sdk::{self as nv, Trap};

const LEFT_MARGIN: u8 = 10;

/// Program entry point.
pub async fn main<T: Trap>(sys: T) -> i32 {
    nv::clear_screen(&sys).await;

    let lines = [
        (2, c"=== NovumOS Calculator ==="),
        (4, c"This is a demo application"),
        (5, c"showing SDK capabilities."),
        (7, c"Press any key to exit..."),
    ];
    for (row, text) in lines {
        nv::set_cursor(&sys, row, LEFT_MARGIN).await;
        nv::print(&sys, text).await;
    }

    nv::getchar(&sys).await;

    match nv::exit(&sys, 0).await {}
}
