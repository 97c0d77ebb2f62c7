/*
 *  display/coordinator.rs
 *
 *  shellfm-lcd - shell-fm on the front panel
 *  (c) 2020-26 Stuart Hunter
 *
 *  Display coordinator - the one owner of screen, status and backlight state
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

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::Mutex;

use super::error::DisplayError;
use super::page::{LayoutKind, PageLayout};
use super::scroller::ScrollEngine;
use super::traits::DisplayDriver;
use super::widget::{Format, Widget};
use crate::backlight::{BacklightCommand, BacklightController};
use crate::constants::*;
use crate::glyphs::Glyph;
use crate::status::{PlaybackStatus, Sample, StatusTracker, Transition};

/// Everything the periodic tasks share. Only ever touched with the lock held.
struct ScreenState {
    page: PageLayout,
    now_playing: PageLayout,
    stopped: PageLayout,
    tracker: StatusTracker,
    backlight: BacklightController,
    last_sample: Option<Sample>,
    /// raised by polls, consumed by the render pass for the backlight
    activity: bool,
    /// next render pass clears the panel and draws the whole page
    full_redraw: bool,
    driver_ok: bool,
}

impl ScreenState {
    fn switch_layout(&mut self, status: PlaybackStatus) {
        self.page = if status.is_stopped() {
            self.stopped.clone()
        } else {
            self.now_playing.clone()
        };
        self.full_redraw = true;
        info!("Switched to {:?} screen", self.page.kind);
    }

    /// Push the cached sample and status into the now-playing widgets.
    /// Returns true if any widget value changed.
    fn refresh_widgets(&mut self, status: PlaybackStatus) -> bool {
        let ScreenState { page, last_sample, .. } = self;
        if page.kind != LayoutKind::NowPlaying {
            return false;
        }
        let mut changed = false;
        if let Some(sample) = last_sample.as_ref() {
            changed |= set(page, W_ARTIST, &sample.artist);
            changed |= set(page, W_ALBUM, &sample.album);
            changed |= set(page, W_TITLE, &sample.title);
            changed |= set(page, W_REMAINING, &sample.remaining_seconds.to_string());
        }
        let icon = match status {
            PlaybackStatus::Paused => Glyph::Pause,
            _ => Glyph::Play,
        };
        changed |= set(page, W_STATUS_ICON, &icon.as_char().to_string());
        changed |= set(page, W_HELP, &status.to_string());
        changed
    }

    fn report(&mut self, failure: Option<DisplayError>) {
        match failure {
            Some(e) => {
                if self.driver_ok {
                    warn!("Display write failed: {}", e);
                } else {
                    debug!("Display still failing: {}", e);
                }
                self.driver_ok = false;
                // what was lost is unknown, put the whole page back once writes work
                self.full_redraw = true;
            }
            None if !self.driver_ok => {
                info!("Display writes recovered");
                self.driver_ok = true;
            }
            None => {}
        }
    }
}

fn set(page: &mut PageLayout, name: &str, value: &str) -> bool {
    page.widget_mut(name).is_some_and(|w| w.set_value(value))
}

/// Keep the first error of a pass, carry on with the rest
fn note(result: Result<(), DisplayError>, failure: &mut Option<DisplayError>) {
    if let Err(e) = result {
        failure.get_or_insert(e);
    }
}

fn draw_widget(driver: &mut dyn DisplayDriver, widget: &mut Widget, failure: &mut Option<DisplayError>) {
    let text = widget.render();
    let (row, col) = widget.position();
    match widget.kind() {
        Format::GlyphSequence => {
            for (i, c) in text.chars().enumerate() {
                let col = col + i as u8;
                match Glyph::from_char(c) {
                    Some(glyph) => note(driver.write_glyph(row, col, glyph.slot()), failure),
                    None => note(driver.write_text(row, col, c.encode_utf8(&mut [0; 4])), failure),
                }
            }
        }
        Format::Plain | Format::Time => note(driver.write_text(row, col, &text), failure),
    }
}

/// Shared handle on the screen. Clones refer to the same state.
///
/// Every entry point takes the one coordinator lock for its whole body, so a
/// poll that changes a value (and resets its scroll) is either entirely
/// before or entirely after any scroll step or render pass.
#[derive(Clone)]
pub struct DisplayCoordinator {
    state: Arc<Mutex<ScreenState>>,
}

impl DisplayCoordinator {
    /// Starts on the stopped screen with the backlight off
    pub fn new(backlight_timeout: Duration) -> Result<Self, DisplayError> {
        let stopped = PageLayout::stopped()?;
        let state = ScreenState {
            page: stopped.clone(),
            now_playing: PageLayout::now_playing()?,
            stopped,
            tracker: StatusTracker::new(),
            backlight: BacklightController::new(backlight_timeout),
            last_sample: None,
            activity: false,
            full_redraw: true,
            driver_ok: true,
        };
        Ok(Self {
            state: Arc::new(Mutex::new(state)),
        })
    }

    /// Check both layouts against the panel geometry
    pub async fn check_fits(&self, rows: u8, cols: u8) -> Result<(), DisplayError> {
        let state = self.state.lock().await;
        state.now_playing.check_fits(rows, cols)?;
        state.stopped.check_fits(rows, cols)
    }

    /// Feed one poll result. `None` is the daemon being unreachable or silent.
    pub async fn apply_sample(&self, sample: Option<Sample>) -> Transition {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        let transition = state.tracker.observe(sample.as_ref());
        if transition.crosses_stopped() {
            state.switch_layout(transition.status);
        }

        let mut activity = transition.changed;
        if let Some(sample) = sample {
            let track_changed = state.last_sample.as_ref().is_none_or(|prev| {
                prev.artist != sample.artist || prev.title != sample.title || prev.album != sample.album
            });
            if track_changed {
                debug!("Now playing: {} - {}", sample.artist, sample.title);
            }
            activity |= track_changed;
            state.last_sample = Some(sample);
        }
        // any value the poll changes keeps the panel lit
        activity |= state.refresh_widgets(transition.status);

        if activity {
            state.activity = true;
        }
        transition
    }

    /// One second off the remaining-time field while playing
    pub async fn countdown(&self) -> bool {
        let mut state = self.state.lock().await;
        if state.tracker.status() != PlaybackStatus::Playing {
            return false;
        }
        let Some(w) = state.page.widget_mut(W_REMAINING) else {
            return false;
        };
        let secs = w.value().trim().parse::<i64>().unwrap_or(0);
        if secs <= 0 {
            return false;
        }
        w.set_value(&(secs - 1).to_string())
    }

    /// One scroll step for every widget on the active page
    pub async fn advance_scroll(&self) -> usize {
        let mut state = self.state.lock().await;
        ScrollEngine::step(state.page.widgets_mut())
    }

    /// Draw what changed and run the backlight timer down by `elapsed`.
    ///
    /// After a layout switch (or a failed write) the panel is cleared and the
    /// decorations plus every widget are drawn regardless of their redraw
    /// flags. Returns the number of widgets written.
    pub async fn render_pass(&self, driver: &mut dyn DisplayDriver, elapsed: Duration) -> usize {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        let mut failure = None;
        let mut written = 0;

        if state.full_redraw {
            state.full_redraw = false;
            note(driver.clear(), &mut failure);
            for d in state.page.decorations() {
                note(driver.write_glyph(d.row, d.col, d.glyph.slot()), &mut failure);
            }
            for w in state.page.widgets_mut() {
                draw_widget(driver, w, &mut failure);
                written += 1;
            }
        } else {
            for w in state.page.widgets_mut().iter_mut().filter(|w| w.needs_redraw()) {
                draw_widget(driver, w, &mut failure);
                written += 1;
            }
        }

        let mut commands = Vec::with_capacity(2);
        if std::mem::take(&mut state.activity) {
            commands.extend(state.backlight.activity());
        }
        commands.extend(state.backlight.tick(elapsed));
        for cmd in commands {
            note(driver.set_backlight(cmd == BacklightCommand::On), &mut failure);
        }

        state.report(failure);
        written
    }

    pub async fn status(&self) -> PlaybackStatus {
        self.state.lock().await.tracker.status()
    }

    pub async fn layout(&self) -> LayoutKind {
        self.state.lock().await.page.kind
    }

    pub async fn backlight_on(&self) -> bool {
        self.state.lock().await.backlight.is_on()
    }

    /// Current value of a widget on the active page
    pub async fn widget_value(&self, name: &str) -> Option<String> {
        self.state.lock().await.page.widget(name).map(|w| w.value().to_string())
    }
}
