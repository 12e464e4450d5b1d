//! Boot-time kernel configuration.

use log::LevelFilter;

use crate::console::{Color, ColorCode};

/// Start address of the kernel heap.
pub const HEAP_START: usize = 0x_4444_4444_0000;

/// Size of the kernel heap.
pub const HEAP_SIZE: usize = 100 * 1024; // 100 KiB

/// Values fixed at boot and handed to [`crate::init`].
#[derive(Debug, Clone, Copy)]
pub struct KernelConfig {
    /// Number of unread key events held before the oldest is dropped.
    pub keyboard_capacity: usize,
    /// Attribute of blank cells and of text printed by user programs.
    pub text_attribute: ColorCode,
    /// Most verbose level the serial logger emits.
    pub log_level: LevelFilter,
}

impl KernelConfig {
    /// Default keyboard queue depth.
    pub const DEFAULT_KEYBOARD_CAPACITY: usize = 128;

    /// Sets the keyboard queue depth. Zero is raised to one.
    pub fn with_keyboard_capacity(mut self, capacity: usize) -> Self {
        self.keyboard_capacity = capacity.max(1);
        self
    }

    /// Sets the serial log level.
    pub fn with_log_level(mut self, level: LevelFilter) -> Self {
        self.log_level = level;
        self
    }
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            keyboard_capacity: Self::DEFAULT_KEYBOARD_CAPACITY,
            text_attribute: ColorCode::new(Color::LightGray, Color::Black),
            log_level: LevelFilter::Info,
        }
    }
}
