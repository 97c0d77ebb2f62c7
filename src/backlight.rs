/*
 *  backlight.rs
 *
 *  shellfm-lcd - shell-fm on the front panel
 *	(c) 2020-25 Stuart Hunter
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */
use std::time::Duration;
use log::debug;

/// Command the caller must forward to the display driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BacklightCommand {
    On,
    Off,
}

/// Inactivity timer for the panel backlight.
///
/// `is_on` always equals `time_remaining > 0`; a command is only produced on
/// an actual edge so the driver sees one write per switch.
#[derive(Debug)]
pub struct BacklightController {
    timeout: Duration,
    time_remaining: Duration,
    is_on: bool,
}

impl BacklightController {
    /// Starts switched off; the first activity turns it on
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            time_remaining: Duration::ZERO,
            is_on: false,
        }
    }

    pub fn is_on(&self) -> bool {
        self.is_on
    }

    /// Seconds left before the light goes out
    #[cfg(test)]
    pub fn time_remaining(&self) -> f64 {
        self.time_remaining.as_secs_f64()
    }

    /// Refill the timer. Emits `On` only when the light was off.
    pub fn activity(&mut self) -> Option<BacklightCommand> {
        self.time_remaining = self.timeout;
        if self.is_on || self.time_remaining.is_zero() {
            return None;
        }
        self.is_on = true;
        debug!("Backlight on for {:?}", self.timeout);
        Some(BacklightCommand::On)
    }

    /// Run the timer down by `elapsed`. Emits `Off` once, when it reaches zero.
    pub fn tick(&mut self, elapsed: Duration) -> Option<BacklightCommand> {
        if !self.is_on {
            return None;
        }
        self.time_remaining = self.time_remaining.saturating_sub(elapsed);
        if !self.time_remaining.is_zero() {
            return None;
        }
        self.is_on = false;
        debug!("Backlight off after inactivity");
        Some(BacklightCommand::Off)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: Duration = Duration::from_millis(50);

    #[test]
    fn test_activity_turns_on_once() {
        let mut bl = BacklightController::new(Duration::from_secs(2));
        assert!(!bl.is_on());
        assert_eq!(bl.activity(), Some(BacklightCommand::On));
        assert!(bl.is_on());
        bl.tick(TICK);
        assert_eq!(bl.activity(), None);
        assert_eq!(bl.activity(), None);
        assert_eq!(bl.time_remaining(), 2.0);
    }

    #[test]
    fn test_timeout_turns_off_once() {
        let mut bl = BacklightController::new(Duration::from_secs(1));
        bl.activity();

        let mut offs = 0;
        for _ in 0..100 {
            if let Some(cmd) = bl.tick(TICK) {
                assert_eq!(cmd, BacklightCommand::Off);
                offs += 1;
            }
            assert_eq!(bl.is_on(), bl.time_remaining() > 0.0);
        }
        assert_eq!(offs, 1);
        assert!(!bl.is_on());

        // waking up again emits a fresh On
        assert_eq!(bl.activity(), Some(BacklightCommand::On));
    }

    #[test]
    fn test_activity_refills_timer() {
        let mut bl = BacklightController::new(Duration::from_millis(200));
        bl.activity();
        for _ in 0..3 {
            assert_eq!(bl.tick(TICK), None);
        }
        bl.activity();
        for _ in 0..3 {
            assert_eq!(bl.tick(TICK), None);
        }
        assert_eq!(bl.tick(TICK), Some(BacklightCommand::Off));
    }

    #[test]
    fn test_zero_timeout_never_lights() {
        let mut bl = BacklightController::new(Duration::ZERO);
        assert_eq!(bl.activity(), None);
        assert!(!bl.is_on());
    }
}
