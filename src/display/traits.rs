/*
 *  display/traits.rs
 *
 *  shellfm-lcd - shell-fm on the front panel
 *  (c) 2020-26 Stuart Hunter
 *
 *  Core trait definitions for display driver abstraction
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use crate::display::error::DisplayError;
use crate::glyphs::GlyphBitmap;

/// Display capabilities and metadata
#[derive(Debug, Clone)]
pub struct DisplayCapabilities {
    /// Number of character rows
    pub rows: u8,

    /// Number of character columns
    pub cols: u8,

    /// Number of user-definable character slots
    pub glyph_slots: u8,

    /// Whether the backlight can be switched
    pub supports_backlight: bool,
}

/// Minimal hardware abstraction - all character display drivers implement this trait
///
/// Rows and columns are 1-based, matching the way the panel is described
/// in layouts. Calls are synchronous; a driver either completes the write or
/// reports an error which the caller logs.
pub trait DisplayDriver: Send {
    /// Returns the capabilities of this display
    fn capabilities(&self) -> &DisplayCapabilities;

    /// Returns the display dimensions as (rows, cols)
    fn dimensions(&self) -> (u8, u8) {
        let caps = self.capabilities();
        (caps.rows, caps.cols)
    }

    /// Initialize the display hardware
    fn init(&mut self) -> Result<(), DisplayError>;

    /// Clear the display to blanks
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Write text starting at the given cell
    fn write_text(&mut self, row: u8, col: u8, text: &str) -> Result<(), DisplayError>;

    /// Write a previously loaded custom character at the given cell
    fn write_glyph(&mut self, row: u8, col: u8, id: u8) -> Result<(), DisplayError>;

    /// Switch the backlight on or off
    fn set_backlight(&mut self, on: bool) -> Result<(), DisplayError>;

    /// Upload a custom character bitmap into slot `id`
    fn load_glyph(&mut self, id: u8, bitmap: &GlyphBitmap) -> Result<(), DisplayError>;

    /// Check that a write of `len` cells starting at (row, col) fits the panel
    fn check_bounds(&self, row: u8, col: u8, len: usize) -> Result<(), DisplayError> {
        let (rows, cols) = self.dimensions();
        if row == 0 || col == 0 || row > rows || col as usize + len.saturating_sub(1) > cols as usize {
            return Err(DisplayError::OutOfBounds { row, col });
        }
        Ok(())
    }
}
