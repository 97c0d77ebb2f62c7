/*
 *  display/mod.rs
 *
 *  shellfm-lcd - shell-fm on the front panel
 *  (c) 2020-26 Stuart Hunter
 *
 *  Display subsystem - widgets, layouts and character LCD drivers
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

// Core trait definitions
pub mod traits;
pub mod error;
pub mod factory;

// Display drivers (conditionally compiled based on features)
#[cfg(any(feature = "driver-pertelian", feature = "emulator", test))]
pub mod drivers;

// Field and page model
pub mod widget;
pub mod page;

// Periodic state engine
pub mod scroller;
pub mod coordinator;

// Re-exports for convenience
pub use traits::{DisplayDriver, DisplayCapabilities};
pub use error::{DisplayError, DisplayFactoryError};
pub use factory::{DisplayDriverFactory, BoxedDriver};
pub use widget::{Alignment, Format, Widget};
pub use page::{LayoutKind, PageLayout};
pub use scroller::ScrollEngine;
pub use coordinator::DisplayCoordinator;
