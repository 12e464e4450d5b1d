//! Boot banner.

use crate::console::{self, Color};
use crate::println;

/// Print the NovumOS boot banner.
pub fn print_banner() {
    console::set_color(Color::LightBlue, Color::Black);
    println!("  _   _                            ___  ____  ");
    println!(" | \\ | | _____   ___   _ _ __ ___ / _ \\/ ___| ");
    println!(" |  \\| |/ _ \\ \\ / / | | | '_ ` _ \\ | | \\___ \\ ");
    println!(" | |\\  | (_) \\ V /| |_| | | | | | | |_| |___) |");
    println!(" |_| \\_|\\___/ \\_/  \\__,_|_| |_| |_|\\___/|____/ ");
    println!();
    console::reset_color();
    println!(" NovumOS v{}", env!("CARGO_PKG_VERSION"));
    println!();
}
