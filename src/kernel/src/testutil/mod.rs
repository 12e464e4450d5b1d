//! Test infrastructure for the NovumOS kernel.
//!
//! Lets the console subsystem run hosted: a display that records what it is
//! shown, and a way to get private `'static` kernel state per test.
//!
//! # Usage
//!
//! ```rust,ignore
//! use novum_kernel::testutil::{self, RecordingDisplay};
//!
//! let display = RecordingDisplay::new();
//! let kernel = testutil::boot(display.clone());
//! ```

use alloc::{boxed::Box, sync::Arc};
use novum_common::{SCREEN_COLS, SCREEN_ROWS};
use novum_hal::TextDisplay;
use spin::Mutex;

use crate::config::KernelConfig;
use crate::state::KernelState;

struct Screen {
    glyphs: [[u8; SCREEN_COLS]; SCREEN_ROWS],
    attributes: [[u8; SCREEN_COLS]; SCREEN_ROWS],
    cursor: (usize, usize),
}

/// A [`TextDisplay`] that remembers every cell and the cursor.
///
/// Clones share the same screen, so a test keeps one clone and hands the
/// other to the kernel.
#[derive(Clone)]
pub struct RecordingDisplay {
    screen: Arc<Mutex<Screen>>,
}

impl Default for RecordingDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingDisplay {
    /// A display showing nothing, cursor at the origin.
    pub fn new() -> Self {
        RecordingDisplay {
            screen: Arc::new(Mutex::new(Screen {
                glyphs: [[0; SCREEN_COLS]; SCREEN_ROWS],
                attributes: [[0; SCREEN_COLS]; SCREEN_ROWS],
                cursor: (0, 0),
            })),
        }
    }

    /// Glyphs of one row.
    pub fn row(&self, row: usize) -> [u8; SCREEN_COLS] {
        self.screen.lock().glyphs[row]
    }

    /// Attribute byte of one cell.
    pub fn attribute(&self, row: usize, col: usize) -> u8 {
        self.screen.lock().attributes[row][col]
    }

    /// Hardware cursor as `(row, col)`.
    pub fn cursor(&self) -> (usize, usize) {
        self.screen.lock().cursor
    }

    /// Returns `true` if `text` appears on `row` starting at `col`.
    pub fn shows(&self, row: usize, col: usize, text: &[u8]) -> bool {
        let glyphs = self.row(row);
        glyphs
            .get(col..col + text.len())
            .is_some_and(|cells| cells == text)
    }
}

impl TextDisplay for RecordingDisplay {
    fn write_cell(&mut self, row: usize, col: usize, character: u8, attribute: u8) {
        let mut screen = self.screen.lock();
        screen.glyphs[row][col] = character;
        screen.attributes[row][col] = attribute;
    }

    fn move_cursor(&mut self, row: usize, col: usize) {
        self.screen.lock().cursor = (row, col);
    }
}

/// Builds private kernel state with the default configuration.
///
/// The state is leaked so processes can borrow it for `'static`; the
/// global singleton is left untouched.
pub fn boot(display: RecordingDisplay) -> &'static KernelState {
    boot_with(display, &KernelConfig::default())
}

/// Like [`boot`], with an explicit configuration.
pub fn boot_with(display: RecordingDisplay, config: &KernelConfig) -> &'static KernelState {
    Box::leak(Box::new(KernelState::new(Box::new(display), config)))
}
