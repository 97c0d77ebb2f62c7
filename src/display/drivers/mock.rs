/*
 *  display/drivers/mock.rs
 *
 *  shellfm-lcd - shell-fm on the front panel
 *  (c) 2020-26 Stuart Hunter
 *
 *  Mock display driver for testing without hardware
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

use std::sync::{Arc, Mutex};

use crate::display::error::DisplayError;
use crate::display::traits::{DisplayCapabilities, DisplayDriver};
use crate::glyphs::GlyphBitmap;

/// One recorded driver call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverOp {
    Init,
    Clear,
    Text { row: u8, col: u8, text: String },
    Glyph { row: u8, col: u8, id: u8 },
    Backlight(bool),
    LoadGlyph(u8),
}

/// Mock display driver for testing
///
/// Records every call and keeps a character grid. Clones share state, so a
/// test can keep one handle while the code under test owns the other.
#[derive(Debug, Clone)]
pub struct MockDriver {
    capabilities: DisplayCapabilities,
    state: Arc<Mutex<MockDriverState>>,
}

/// Internal state for the mock driver (shared for inspection in tests)
#[derive(Debug, Default)]
pub struct MockDriverState {
    pub ops: Vec<DriverOp>,
    pub cells: Vec<Vec<char>>,
    pub backlight: Option<bool>,
    /// Simulate failures (for error testing)
    pub simulate_write_failure: bool,
}

impl MockDriver {
    pub fn new(rows: u8, cols: u8) -> Self {
        let state = MockDriverState {
            cells: vec![vec![' '; cols as usize]; rows as usize],
            ..Default::default()
        };
        Self {
            capabilities: DisplayCapabilities {
                rows,
                cols,
                glyph_slots: 8,
                supports_backlight: true,
            },
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Get reference to state for inspection in tests
    pub fn state(&self) -> Arc<Mutex<MockDriverState>> {
        Arc::clone(&self.state)
    }

    pub fn ops(&self) -> Vec<DriverOp> {
        self.state.lock().unwrap().ops.clone()
    }

    pub fn take_ops(&self) -> Vec<DriverOp> {
        std::mem::take(&mut self.state.lock().unwrap().ops)
    }

    /// Panel contents, one string per row; glyphs appear as their slot character
    pub fn screen(&self) -> Vec<String> {
        self.state.lock().unwrap().cells.iter().map(|r| r.iter().collect()).collect()
    }

    pub fn backlight(&self) -> Option<bool> {
        self.state.lock().unwrap().backlight
    }

    fn record(&self, op: DriverOp) -> Result<(), DisplayError> {
        let mut state = self.state.lock().unwrap();
        state.ops.push(op);
        if state.simulate_write_failure {
            return Err(DisplayError::Other("Simulated write failure".to_string()));
        }
        Ok(())
    }
}

impl DisplayDriver for MockDriver {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        self.record(DriverOp::Init)
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.record(DriverOp::Clear)?;
        for row in self.state.lock().unwrap().cells.iter_mut() {
            row.fill(' ');
        }
        Ok(())
    }

    fn write_text(&mut self, row: u8, col: u8, text: &str) -> Result<(), DisplayError> {
        self.check_bounds(row, col, text.chars().count())?;
        self.record(DriverOp::Text { row, col, text: text.to_string() })?;
        let mut state = self.state.lock().unwrap();
        let line = &mut state.cells[(row - 1) as usize];
        for (i, c) in text.chars().enumerate() {
            line[col as usize - 1 + i] = c;
        }
        Ok(())
    }

    fn write_glyph(&mut self, row: u8, col: u8, id: u8) -> Result<(), DisplayError> {
        self.check_bounds(row, col, 1)?;
        self.record(DriverOp::Glyph { row, col, id })?;
        self.state.lock().unwrap().cells[(row - 1) as usize][(col - 1) as usize] = char::from(id);
        Ok(())
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), DisplayError> {
        self.record(DriverOp::Backlight(on))?;
        self.state.lock().unwrap().backlight = Some(on);
        Ok(())
    }

    fn load_glyph(&mut self, id: u8, _bitmap: &GlyphBitmap) -> Result<(), DisplayError> {
        self.record(DriverOp::LoadGlyph(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_driver_records_and_draws() {
        let mut driver = MockDriver::new(4, 20);
        let handle = driver.clone();

        driver.init().unwrap();
        driver.write_text(1, 3, "abc").unwrap();
        driver.write_glyph(1, 1, 4).unwrap();
        driver.set_backlight(true).unwrap();

        assert_eq!(handle.ops()[0], DriverOp::Init);
        assert_eq!(handle.screen()[0], format!("{} abc{}", char::from(4u8), " ".repeat(15)));
        assert_eq!(handle.backlight(), Some(true));

        driver.clear().unwrap();
        assert_eq!(handle.screen()[0], " ".repeat(20));
    }

    #[test]
    fn test_mock_driver_simulated_failure() {
        let mut driver = MockDriver::new(4, 20);
        driver.state().lock().unwrap().simulate_write_failure = true;
        assert!(driver.write_text(1, 1, "x").is_err());
        assert!(driver.write_text(9, 1, "x").is_err());
    }
}
