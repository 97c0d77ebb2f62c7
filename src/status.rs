/*
 *  status.rs
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
use std::fmt;
use log::{debug, info};

/// Now-playing details from one daemon poll
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sample {
    pub artist: String,
    pub title: String,
    pub album: String,
    pub remaining_seconds: i64,
}

/// Transport state inferred from the remaining-time counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    Playing,
    Paused,
    Stopped,
}

impl PlaybackStatus {
    pub fn is_stopped(self) -> bool {
        self == PlaybackStatus::Stopped
    }
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PlaybackStatus::Playing => "playing",
            PlaybackStatus::Paused => "paused",
            PlaybackStatus::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

/// Result of feeding one poll into the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: PlaybackStatus,
    pub status: PlaybackStatus,
    pub changed: bool,
}

impl Transition {
    /// True when the screen has to swap between the stopped and now-playing layouts
    pub fn crosses_stopped(&self) -> bool {
        self.changed && (self.from.is_stopped() != self.status.is_stopped())
    }
}

/// Classifies successive remaining-seconds samples as playing, paused or stopped.
///
/// The daemon does not report its transport state, so it is inferred: a
/// counter that counts down is playing, a counter that stalls is paused, and
/// no answer at all is stopped. A track that loops and resets its counter
/// upwards reads as paused for that one poll.
#[derive(Debug)]
pub struct StatusTracker {
    status: PlaybackStatus,
    previous_remaining: Option<i64>,
}

impl Default for StatusTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusTracker {
    pub fn new() -> Self {
        Self {
            status: PlaybackStatus::Stopped,
            previous_remaining: None,
        }
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    /// Feed one poll result; `None` means the daemon was unreachable or silent.
    pub fn observe(&mut self, sample: Option<&Sample>) -> Transition {
        let from = self.status;

        let next = match sample {
            None => PlaybackStatus::Stopped,
            Some(s) => {
                let remaining = s.remaining_seconds;
                match self.previous_remaining.replace(remaining) {
                    // first sample ever only seeds the comparison
                    None => {
                        debug!("Seeded remaining time at {}s", remaining);
                        from
                    }
                    Some(prev) if remaining > 0 && remaining < prev => PlaybackStatus::Playing,
                    Some(_) => PlaybackStatus::Paused,
                }
            }
        };

        self.status = next;
        let changed = next != from;
        if changed {
            info!("Playback status: {} -> {}", from, next);
        }
        Transition { from, status: next, changed }
    }
}
