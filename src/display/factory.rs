/*
 *  display/factory.rs
 *
 *  shellfm-lcd - shell-fm on the front panel
 *  (c) 2020-26 Stuart Hunter
 *
 *  Factory pattern for display driver selection
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

use std::path::Path;

use log::{info, warn};

use crate::config::DriverKind;
use crate::display::error::DisplayFactoryError;
use crate::display::traits::DisplayDriver;
use crate::glyphs::{Glyph, GlyphBitmap};

#[cfg(feature = "driver-pertelian")]
use crate::display::drivers::pertelian::PertelianDriver;

#[cfg(feature = "emulator")]
use crate::display::drivers::emulator::EmulatorDriver;
#[cfg(feature = "emulator")]
use crate::constants::{LCD_COLS, LCD_ROWS};

/// Type alias for boxed display driver trait objects
pub type BoxedDriver = Box<dyn DisplayDriver>;

/// Factory for creating display drivers from configuration
pub struct DisplayDriverFactory;

impl DisplayDriverFactory {
    /// Create the driver named by `kind`. `device` and `baud` are only used by hardware drivers.
    #[cfg_attr(not(feature = "driver-pertelian"), allow(unused_variables))]
    pub fn create(kind: DriverKind, device: &Path, baud: u32) -> Result<BoxedDriver, DisplayFactoryError> {
        match kind {
            #[cfg(feature = "driver-pertelian")]
            DriverKind::Pertelian => Ok(Box::new(PertelianDriver::open(device, baud)?)),

            #[cfg(not(feature = "driver-pertelian"))]
            DriverKind::Pertelian => Err(DisplayFactoryError::DriverDisabled("Pertelian")),

            #[cfg(feature = "emulator")]
            DriverKind::Emulator => Ok(Box::new(EmulatorDriver::new(LCD_ROWS, LCD_COLS))),

            #[cfg(not(feature = "emulator"))]
            DriverKind::Emulator => Err(DisplayFactoryError::DriverDisabled("Emulator")),
        }
    }

    /// Initialise the panel and upload the custom characters.
    ///
    /// A failed init is fatal; a glyph that will not load only costs that icon.
    pub fn prepare(
        driver: &mut dyn DisplayDriver,
        glyphs: &[(Glyph, GlyphBitmap)],
    ) -> Result<(), DisplayFactoryError> {
        driver.init()?;
        let (rows, cols) = driver.dimensions();
        info!("Display ready: {}x{} characters", cols, rows);

        let slots = driver.capabilities().glyph_slots;
        for (glyph, bitmap) in glyphs {
            if glyph.slot() > slots {
                warn!("Display has {} glyph slots, skipping {}", slots, glyph.name());
                continue;
            }
            if let Err(e) = driver.load_glyph(glyph.slot(), bitmap) {
                warn!("Could not load glyph {}: {}", glyph.name(), e);
            }
        }
        Ok(())
    }
}
