//! VGA text mode display for x86_64.
//!
//! Mirrors console cells into the text buffer at 0xB8000 and drives the
//! CRTC hardware cursor. Holds no screen state of its own.

use core::ptr;
use novum_common::{SCREEN_COLS, SCREEN_ROWS};
use novum_hal::TextDisplay;
use x86_64::instructions::port::Port;

/// VGA text buffer memory-mapped I/O address.
const VGA_BUFFER_ADDR: usize = 0xB8000;

/// CRTC index register.
const CRTC_INDEX_PORT: u16 = 0x3D4;

/// CRTC data register.
const CRTC_DATA_PORT: u16 = 0x3D5;

/// CRTC registers holding the cursor location, high and low byte.
const CURSOR_LOCATION_HIGH: u8 = 0x0E;
const CURSOR_LOCATION_LOW: u8 = 0x0F;

/// One cell as the hardware lays it out.
#[derive(Clone, Copy)]
#[repr(C)]
struct VgaCell {
    character: u8,
    attribute: u8,
}

/// The VGA text buffer layout.
#[repr(transparent)]
struct Buffer {
    cells: [[VgaCell; SCREEN_COLS]; SCREEN_ROWS],
}

/// The VGA text-mode screen.
pub struct VgaDisplay {
    /// SAFETY: This pointer is valid for the lifetime of the kernel.
    /// The VGA buffer at 0xB8000 is always mapped in x86 real/protected mode.
    buffer: *mut Buffer,
    crtc_index: Port<u8>,
    crtc_data: Port<u8>,
}

// SAFETY: VgaDisplay only accesses the VGA buffer through volatile operations.
// The buffer is memory-mapped hardware that exists for the kernel's lifetime,
// and the single instance is owned by the console behind its lock.
unsafe impl Send for VgaDisplay {}

impl VgaDisplay {
    /// Takes over the VGA text buffer.
    ///
    /// # Safety
    ///
    /// At most one `VgaDisplay` may exist.
    pub unsafe fn new() -> Self {
        VgaDisplay {
            buffer: VGA_BUFFER_ADDR as *mut Buffer,
            crtc_index: Port::new(CRTC_INDEX_PORT),
            crtc_data: Port::new(CRTC_DATA_PORT),
        }
    }
}

impl TextDisplay for VgaDisplay {
    fn write_cell(&mut self, row: usize, col: usize, character: u8, attribute: u8) {
        debug_assert!(row < SCREEN_ROWS && col < SCREEN_COLS, "cell out of bounds");

        // SAFETY: the console only hands out on-screen coordinates and the
        // buffer pointer is valid for the kernel's lifetime. Volatile because
        // the VGA buffer is memory-mapped I/O read by the hardware.
        unsafe {
            ptr::write_volatile(
                &mut (*self.buffer).cells[row][col],
                VgaCell {
                    character,
                    attribute,
                },
            );
        }
    }

    fn move_cursor(&mut self, row: usize, col: usize) {
        let position = (row * SCREEN_COLS + col) as u16;
        // SAFETY: 0x3D4/0x3D5 are the standard CRTC ports in colour text
        // mode; writing the cursor location registers has no other effect.
        unsafe {
            self.crtc_index.write(CURSOR_LOCATION_HIGH);
            self.crtc_data.write((position >> 8) as u8);
            self.crtc_index.write(CURSOR_LOCATION_LOW);
            self.crtc_data.write(position as u8);
        }
    }
}
