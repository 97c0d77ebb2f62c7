/*
 *  display/drivers/pertelian.rs
 *
 *  shellfm-lcd - shell-fm on the front panel
 *  (c) 2020-26 Stuart Hunter
 *
 *  Pertelian X2040 USB character LCD (HD44780 behind a serial bridge)
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

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use log::{debug, info};
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};

use crate::display::error::DisplayError;
use crate::display::traits::{DisplayCapabilities, DisplayDriver};
use crate::glyphs::GlyphBitmap;

/// Every controller instruction is preceded by this byte; anything else is character data
const CMD: u8 = 0xFE;

const FUNCTION_SET_8BIT_2LINE: u8 = 0x38;
const ENTRY_MODE_INCREMENT: u8 = 0x06;
const DISPLAY_ON_CURSOR_OFF: u8 = 0x0C;
const CLEAR_DISPLAY: u8 = 0x01;
const BACKLIGHT_ON: u8 = 0x03;
const BACKLIGHT_OFF: u8 = 0x02;
const SET_CGRAM_ADDR: u8 = 0x40;
const SET_DDRAM_ADDR: u8 = 0x80;

/// DDRAM address of column 1 on each row of a 20x4 panel
const ROW_OFFSETS: [u8; 4] = [0x00, 0x40, 0x14, 0x54];

const ROWS: u8 = 4;
const COLS: u8 = 20;
const GLYPH_SLOTS: u8 = 8;

/// Write timeout on the serial line
const WRITE_TIMEOUT: Duration = Duration::from_millis(500);

/// Pertelian X2040 driver
///
/// Generic over the byte sink so the wire output can be inspected without
/// a device attached; `open` gives the usual serial-port backed instance.
pub struct PertelianDriver<W: Write + Send = Box<dyn SerialPort>> {
    port: W,
    capabilities: DisplayCapabilities,
}

impl PertelianDriver<Box<dyn SerialPort>> {
    /// Open the panel's serial adapter (e.g. `/dev/ttyUSB0`) at `baud`, 8N1, no flow control
    pub fn open(device: &Path, baud: u32) -> Result<Self, DisplayError> {
        info!("Opening Pertelian display on {} at {} baud", device.display(), baud);
        let port = serialport::new(device.to_string_lossy(), baud)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(WRITE_TIMEOUT)
            .open()
            .map_err(|e| DisplayError::InitializationFailed(format!("{}: {}", device.display(), e)))?;
        Ok(Self::with_writer(port))
    }
}

impl<W: Write + Send> PertelianDriver<W> {
    pub fn with_writer(port: W) -> Self {
        Self {
            port,
            capabilities: DisplayCapabilities {
                rows: ROWS,
                cols: COLS,
                glyph_slots: GLYPH_SLOTS,
                supports_backlight: true,
            },
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.port
    }

    fn command(&mut self, instruction: u8) -> Result<(), DisplayError> {
        self.port.write_all(&[CMD, instruction])?;
        Ok(())
    }

    fn set_cursor(&mut self, row: u8, col: u8) -> Result<(), DisplayError> {
        let addr = ROW_OFFSETS[(row - 1) as usize] + (col - 1);
        self.command(SET_DDRAM_ADDR | addr)
    }
}

/// The controller ROM only has a sensible ASCII range; map the rest to '?'
fn to_rom_byte(c: char) -> u8 {
    match c {
        ' '..='}' => c as u8,
        _ => b'?',
    }
}

impl<W: Write + Send> DisplayDriver for PertelianDriver<W> {
    fn capabilities(&self) -> &DisplayCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        for instruction in [FUNCTION_SET_8BIT_2LINE, ENTRY_MODE_INCREMENT, DISPLAY_ON_CURSOR_OFF, CLEAR_DISPLAY] {
            self.command(instruction)?;
        }
        self.port.flush()?;
        debug!("Pertelian initialized");
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.command(CLEAR_DISPLAY)?;
        self.port.flush()?;
        Ok(())
    }

    fn write_text(&mut self, row: u8, col: u8, text: &str) -> Result<(), DisplayError> {
        let bytes: Vec<u8> = text.chars().map(to_rom_byte).collect();
        self.check_bounds(row, col, bytes.len())?;
        self.set_cursor(row, col)?;
        self.port.write_all(&bytes)?;
        self.port.flush()?;
        Ok(())
    }

    fn write_glyph(&mut self, row: u8, col: u8, id: u8) -> Result<(), DisplayError> {
        if id == 0 || id > GLYPH_SLOTS {
            return Err(DisplayError::InvalidGlyph(id));
        }
        self.check_bounds(row, col, 1)?;
        self.set_cursor(row, col)?;
        // CGRAM characters 0x00..=0x07 are mirrored at 0x08..=0x0F, so slot 8 still lands on 0
        self.port.write_all(&[id])?;
        self.port.flush()?;
        Ok(())
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), DisplayError> {
        self.command(if on { BACKLIGHT_ON } else { BACKLIGHT_OFF })?;
        self.port.flush()?;
        Ok(())
    }

    fn load_glyph(&mut self, id: u8, bitmap: &GlyphBitmap) -> Result<(), DisplayError> {
        if id == 0 || id > GLYPH_SLOTS {
            return Err(DisplayError::InvalidGlyph(id));
        }
        self.command(SET_CGRAM_ADDR | ((id & 0x07) << 3))?;
        let rows: Vec<u8> = bitmap.iter().map(|r| r & 0x1F).collect();
        self.port.write_all(&rows)?;
        self.port.flush()?;
        debug!("Loaded glyph into slot {}", id);
        Ok(())
    }
}
