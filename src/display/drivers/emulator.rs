/*
 *  display/drivers/emulator.rs
 *
 *  shellfm-lcd - shell-fm on the front panel
 *  (c) 2020-26 Stuart Hunter
 *
 *  Terminal emulator driver - draws the panel into an ANSI terminal
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

use std::io::{Stdout, Write};

use log::info;

use crate::display::error::DisplayError;
use crate::display::traits::{DisplayCapabilities, DisplayDriver};
use crate::glyphs::{Glyph, GlyphBitmap};

const CLEAR_SCREEN: &str = "\x1b[2J";
const CURSOR_HOME: &str = "\x1b[H";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// Emulator display driver
///
/// Keeps a character grid and repaints the whole panel, framed, after each
/// write. Custom characters show as a Unicode stand-in for their slot. With
/// the backlight off the panel is drawn dimmed.
pub struct EmulatorDriver<W: Write + Send = Stdout> {
    out: W,
    capabilities: DisplayCapabilities,
    cells: Vec<Vec<char>>,
    backlight: bool,
    loaded: Vec<u8>,
}

impl EmulatorDriver<Stdout> {
    pub fn new(rows: u8, cols: u8) -> Self {
        info!("Using terminal emulator display ({}x{})", cols, rows);
        Self::with_writer(std::io::stdout(), rows, cols)
    }
}

impl<W: Write + Send> EmulatorDriver<W> {
    pub fn with_writer(out: W, rows: u8, cols: u8) -> Self {
        Self {
            out,
            capabilities: DisplayCapabilities {
                rows,
                cols,
                glyph_slots: 8,
                supports_backlight: true,
            },
            cells: vec![vec![' '; cols as usize]; rows as usize],
            backlight: false,
            loaded: Vec::new(),
        }
    }

    /// Current panel contents, one string per row
    #[cfg(test)]
    pub fn snapshot(&self) -> Vec<String> {
        self.cells.iter().map(|r| r.iter().collect()).collect()
    }

    #[cfg(test)]
    pub fn backlight(&self) -> bool {
        self.backlight
    }

    fn glyph_symbol(&self, id: u8) -> char {
        if !self.loaded.contains(&id) {
            return '?';
        }
        match Glyph::ALL.into_iter().find(|g| g.slot() == id) {
            Some(Glyph::Guitar) => '♪',
            Some(Glyph::Cd) => '◎',
            Some(Glyph::Notes) => '♫',
            Some(Glyph::Play) => '▶',
            Some(Glyph::Pause) => '‖',
            Some(Glyph::Stop) => '■',
            None => '▒',
        }
    }

    fn repaint(&mut self) -> Result<(), DisplayError> {
        let cols = self.capabilities.cols as usize;
        let mut frame = String::with_capacity((cols + 8) * (self.cells.len() + 2));
        frame.push_str(CURSOR_HOME);
        if !self.backlight {
            frame.push_str(DIM);
        }
        frame.push('┌');
        frame.extend(std::iter::repeat_n('─', cols));
        frame.push_str("┐\n");
        for row in &self.cells {
            frame.push('│');
            frame.extend(row.iter());
            frame.push_str("│\n");
        }
        frame.push('└');
        frame.extend(std::iter::repeat_n('─', cols));
        frame.push('┘');
        frame.push_str(RESET);
        frame.push('\n');

        self.out.write_all(frame.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write + Send> DisplayDriver for EmulatorDriver<W> {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        self.out.write_all(CLEAR_SCREEN.as_bytes())?;
        self.clear()
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        for row in self.cells.iter_mut() {
            row.fill(' ');
        }
        self.repaint()
    }

    fn write_text(&mut self, row: u8, col: u8, text: &str) -> Result<(), DisplayError> {
        self.check_bounds(row, col, text.chars().count())?;
        let line = &mut self.cells[(row - 1) as usize];
        for (i, c) in text.chars().enumerate() {
            line[col as usize - 1 + i] = if c.is_control() { '?' } else { c };
        }
        self.repaint()
    }

    fn write_glyph(&mut self, row: u8, col: u8, id: u8) -> Result<(), DisplayError> {
        if id == 0 || id > self.capabilities.glyph_slots {
            return Err(DisplayError::InvalidGlyph(id));
        }
        self.check_bounds(row, col, 1)?;
        self.cells[(row - 1) as usize][(col - 1) as usize] = self.glyph_symbol(id);
        self.repaint()
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), DisplayError> {
        self.backlight = on;
        self.repaint()
    }

    fn load_glyph(&mut self, id: u8, _bitmap: &GlyphBitmap) -> Result<(), DisplayError> {
        if id == 0 || id > self.capabilities.glyph_slots {
            return Err(DisplayError::InvalidGlyph(id));
        }
        if !self.loaded.contains(&id) {
            self.loaded.push(id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyphs::GLYPH_STOP;

    #[test]
    fn test_text_and_glyphs_land_in_grid() {
        let mut d = EmulatorDriver::with_writer(Vec::new(), 4, 20);
        d.init().unwrap();
        d.write_text(2, 3, "hello").unwrap();
        d.write_glyph(2, 1, Glyph::Stop.slot()).unwrap();
        d.load_glyph(Glyph::Stop.slot(), &GLYPH_STOP).unwrap();
        d.write_glyph(2, 2, Glyph::Stop.slot()).unwrap();

        let rows = d.snapshot();
        assert_eq!(rows[1], "?■hello             ");
        assert_eq!(rows[0].chars().count(), 20);
    }

    #[test]
    fn test_repaint_is_framed_and_dimmed_when_dark() {
        let mut d = EmulatorDriver::with_writer(Vec::new(), 2, 4);
        d.write_text(1, 1, "ab").unwrap();
        let out = String::from_utf8(d.out.clone()).unwrap();
        assert!(out.contains("│ab  │"));
        assert!(out.contains(DIM));

        d.out.clear();
        d.set_backlight(true).unwrap();
        let out = String::from_utf8(d.out.clone()).unwrap();
        assert!(!out.contains(DIM));
        assert!(d.backlight());
    }

    #[test]
    fn test_bounds_checked() {
        let mut d = EmulatorDriver::with_writer(Vec::new(), 4, 20);
        assert!(d.write_text(1, 19, "abc").is_err());
        assert!(d.write_glyph(0, 1, 1).is_err());
    }
}
