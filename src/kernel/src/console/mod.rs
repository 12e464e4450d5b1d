//! Console state: the cursor and the 80x25 screen buffer.
//!
//! [`Console`] is the only place that mutates either. Every change is
//! mirrored to a [`TextDisplay`], so the hardware never holds state the
//! kernel does not.

use alloc::boxed::Box;
use core::fmt;

use novum_common::{CursorPosition, SCREEN_COLS, SCREEN_ROWS};
use novum_hal::TextDisplay;

/// Glyph shown for bytes outside printable ASCII.
pub const PLACEHOLDER_GLYPH: u8 = 0xfe;

/// Glyph of an empty cell.
pub const BLANK_GLYPH: u8 = b' ';

/// VGA color codes.
///
/// Standard 16-color VGA palette for text mode.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Color {
    Black = 0,
    Blue = 1,
    Green = 2,
    Cyan = 3,
    Red = 4,
    Magenta = 5,
    Brown = 6,
    LightGray = 7,
    DarkGray = 8,
    LightBlue = 9,
    LightGreen = 10,
    LightCyan = 11,
    LightRed = 12,
    Pink = 13,
    Yellow = 14,
    White = 15,
}

/// Combined foreground and background color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct ColorCode(u8);

impl ColorCode {
    /// Creates a new color code from foreground and background colors.
    pub const fn new(foreground: Color, background: Color) -> ColorCode {
        ColorCode((background as u8) << 4 | (foreground as u8))
    }

    /// The raw attribute byte.
    pub const fn as_u8(self) -> u8 {
        self.0
    }
}

/// A single character cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct ScreenChar {
    /// Glyph.
    pub ascii_character: u8,
    /// Display attribute.
    pub color_code: ColorCode,
}

impl ScreenChar {
    const fn blank(color_code: ColorCode) -> Self {
        ScreenChar {
            ascii_character: BLANK_GLYPH,
            color_code,
        }
    }
}

/// Fixed grid of cells. Allocated once, never resized.
pub struct ScreenBuffer {
    chars: [[ScreenChar; SCREEN_COLS]; SCREEN_ROWS],
}

impl ScreenBuffer {
    fn new(color_code: ColorCode) -> Self {
        ScreenBuffer {
            chars: [[ScreenChar::blank(color_code); SCREEN_COLS]; SCREEN_ROWS],
        }
    }

    /// The cell at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is off screen.
    pub fn cell(&self, row: usize, col: usize) -> ScreenChar {
        self.chars[row][col]
    }

    /// Glyphs of one row.
    pub fn row_bytes(&self, row: usize) -> [u8; SCREEN_COLS] {
        let mut bytes = [BLANK_GLYPH; SCREEN_COLS];
        for (byte, cell) in bytes.iter_mut().zip(self.chars[row].iter()) {
            *byte = cell.ascii_character;
        }
        bytes
    }

    fn fill(&mut self, color_code: ColorCode) {
        for row in self.chars.iter_mut() {
            row.fill(ScreenChar::blank(color_code));
        }
    }

    fn scroll_up(&mut self, color_code: ColorCode) {
        self.chars.copy_within(1.., 0);
        self.chars[SCREEN_ROWS - 1].fill(ScreenChar::blank(color_code));
    }
}

/// Owner of the cursor and screen buffer.
pub struct Console {
    cursor: CursorPosition,
    buffer: ScreenBuffer,
    /// Attribute of newly written characters.
    color_code: ColorCode,
    /// Attribute blank cells are filled with.
    default_color: ColorCode,
    display: Box<dyn TextDisplay + Send>,
}

impl Console {
    /// Creates a blank console and paints it onto `display`.
    pub fn new(display: Box<dyn TextDisplay + Send>, default_color: ColorCode) -> Self {
        let mut console = Console {
            cursor: CursorPosition::origin(),
            buffer: ScreenBuffer::new(default_color),
            color_code: default_color,
            default_color,
            display,
        };
        console.redraw();
        console.sync_cursor();
        console
    }

    /// Current cursor position.
    pub fn cursor(&self) -> CursorPosition {
        self.cursor
    }

    /// Read access to the screen contents.
    pub fn buffer(&self) -> &ScreenBuffer {
        &self.buffer
    }

    /// Moves the cursor, clamping each coordinate onto the screen.
    ///
    /// Returns the position actually stored.
    pub fn set_cursor(&mut self, row: u8, col: u8) -> CursorPosition {
        self.cursor = CursorPosition::clamped(row, col);
        self.sync_cursor();
        self.cursor
    }

    /// Sets the attribute for subsequent writes.
    pub fn set_color(&mut self, foreground: Color, background: Color) {
        self.color_code = ColorCode::new(foreground, background);
    }

    /// Restores the configured attribute for subsequent writes.
    pub fn reset_color(&mut self) {
        self.color_code = self.default_color;
    }

    /// Writes `bytes` starting at the cursor.
    pub fn print(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.write_byte(byte);
        }
        self.sync_cursor();
    }

    /// Blanks every cell with the default attribute and homes the cursor.
    pub fn clear(&mut self) {
        self.buffer.fill(self.default_color);
        self.cursor = CursorPosition::origin();
        self.redraw();
        self.sync_cursor();
    }

    fn write_byte(&mut self, byte: u8) {
        match byte {
            b'\n' => self.new_line(),
            b'\r' => self.cursor.col = 0,
            0x20..=0x7e => self.put(byte),
            _ => self.put(PLACEHOLDER_GLYPH),
        }
    }

    /// Stores a glyph at the cursor and advances, wrapping at column 80.
    fn put(&mut self, byte: u8) {
        let (row, col) = (self.cursor.row_index(), self.cursor.col_index());
        let cell = ScreenChar {
            ascii_character: byte,
            color_code: self.color_code,
        };
        self.buffer.chars[row][col] = cell;
        self.display
            .write_cell(row, col, cell.ascii_character, cell.color_code.as_u8());

        if col + 1 == SCREEN_COLS {
            self.new_line();
        } else {
            self.cursor.col += 1;
        }
    }

    /// Moves to column 0 of the next row, scrolling from the last row.
    fn new_line(&mut self) {
        self.cursor.col = 0;
        if self.cursor.row == CursorPosition::MAX_ROW {
            self.buffer.scroll_up(self.default_color);
            self.redraw();
        } else {
            self.cursor.row += 1;
        }
    }

    fn redraw(&mut self) {
        for (row, cells) in self.buffer.chars.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                self.display
                    .write_cell(row, col, cell.ascii_character, cell.color_code.as_u8());
            }
        }
    }

    fn sync_cursor(&mut self) {
        debug_assert!(self.cursor.in_bounds());
        self.display
            .move_cursor(self.cursor.row_index(), self.cursor.col_index());
    }
}

impl fmt::Write for Console {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.print(s.as_bytes());
        Ok(())
    }
}

/// Prints to the kernel console without a newline.
#[macro_export]
macro_rules! print {
    ($($arg:tt)*) => {
        $crate::console::_print(format_args!($($arg)*))
    };
}

/// Prints to the kernel console with a newline.
#[macro_export]
macro_rules! println {
    () => ($crate::print!("\n"));
    ($($arg:tt)*) => ($crate::print!("{}\n", format_args!($($arg)*)))
}

/// Internal print function used by macros.
///
/// Output before [`crate::init`] has nowhere to go and is dropped.
#[doc(hidden)]
pub fn _print(args: fmt::Arguments) {
    use fmt::Write;

    if let Some(kernel) = crate::state::kernel() {
        let _ = kernel.console.lock().write_fmt(args);
    }
}

/// Sets the kernel console color.
pub fn set_color(foreground: Color, background: Color) {
    if let Some(kernel) = crate::state::kernel() {
        kernel.console.lock().set_color(foreground, background);
    }
}

/// Restores the configured kernel console color.
pub fn reset_color() {
    if let Some(kernel) = crate::state::kernel() {
        kernel.console.lock().reset_color();
    }
}
