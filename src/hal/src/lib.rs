//! NovumOS Hardware Abstraction Layer (HAL) traits.
//!
//! This crate defines traits that abstract away platform-specific hardware details.

#![no_std]

/// A character-cell display the console state manager renders into.
///
/// Implementations only mirror what they are told; the authoritative screen
/// contents and cursor live in the kernel's console state.
pub trait TextDisplay {
    /// Stores one cell. `row` and `col` are always inside the 80x25 grid.
    fn write_cell(&mut self, row: usize, col: usize, character: u8, attribute: u8);

    /// Moves the visible hardware cursor.
    fn move_cursor(&mut self, row: usize, col: usize);
}
