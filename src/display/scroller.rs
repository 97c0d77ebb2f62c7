/*
 *  display/scroller.rs
 *
 *  shellfm-lcd - shell-fm on the front panel
 *  (c) 2020-26 Stuart Hunter
 *
 *  Scroll engine - steps every overflowing widget on a fixed cadence
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

use std::time::Duration;
use log::{debug, trace};
use tokio::time::{interval, MissedTickBehavior};

use super::coordinator::DisplayCoordinator;
use super::widget::Widget;

/// Advances widget scroll windows
#[derive(Debug, Clone, Copy)]
pub struct ScrollEngine {
    interval: Duration,
}

impl ScrollEngine {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// One scroll step over a widget set. Widgets whose value fits are left
    /// alone. Returns how many moved.
    pub fn step(widgets: &mut [Widget]) -> usize {
        widgets.iter_mut().map(Widget::advance_scroll).filter(|&moved| moved).count()
    }

    /// Scroll the coordinator's active page forever
    pub async fn run(self, coordinator: DisplayCoordinator) {
        debug!("Scroll engine running every {:?}", self.interval);
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let moved = coordinator.advance_scroll().await;
            if moved > 0 {
                trace!("Scrolled {} widget(s)", moved);
            }
        }
    }
}
