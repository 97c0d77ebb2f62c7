/*
 *  display/page.rs
 *
 *  shellfm-lcd - shell-fm on the front panel
 *  (c) 2020-26 Stuart Hunter
 *
 *  Page layouts - the widget sets shown for each player state
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

use super::error::DisplayError;
use super::widget::{Alignment, Format, Widget};
use crate::constants::*;
use crate::glyphs::Glyph;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind {
    NowPlaying,
    Stopped,
}

/// A custom character drawn once when the page is put up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoration {
    pub row: u8,
    pub col: u8,
    pub glyph: Glyph,
}

/// Page layout - collection of widgets and static glyphs defining a screen
#[derive(Debug, Clone)]
pub struct PageLayout {
    pub kind: LayoutKind,
    widgets: Vec<Widget>,
    decorations: Vec<Decoration>,
}

impl PageLayout {
    pub fn new(kind: LayoutKind) -> Self {
        Self {
            kind,
            widgets: Vec::new(),
            decorations: Vec::new(),
        }
    }

    /// Add a widget to the page
    pub fn add_widget(mut self, widget: Widget) -> Self {
        self.widgets.push(widget);
        self
    }

    pub fn add_decoration(mut self, row: u8, col: u8, glyph: Glyph) -> Self {
        self.decorations.push(Decoration { row, col, glyph });
        self
    }

    /// Artist, album and title rows with their icons, and a transport row
    /// holding the play/pause glyph, remaining time and status word.
    pub fn now_playing() -> Result<Self, DisplayError> {
        Ok(Self::new(LayoutKind::NowPlaying)
            .add_decoration(ARTIST_ROW, ICON_COL, Glyph::Guitar)
            .add_decoration(ALBUM_ROW, ICON_COL, Glyph::Cd)
            .add_decoration(TITLE_ROW, ICON_COL, Glyph::Notes)
            .add_widget(Widget::new(W_ARTIST, (ARTIST_ROW, TEXT_COL), TEXT_WIDTH)?)
            .add_widget(Widget::new(W_ALBUM, (ALBUM_ROW, TEXT_COL), TEXT_WIDTH)?)
            .add_widget(Widget::new(W_TITLE, (TITLE_ROW, TEXT_COL), TEXT_WIDTH)?)
            .add_widget(
                Widget::new(W_STATUS_ICON, (TRANSPORT_ROW, ICON_COL), 1)?
                    .format(Format::GlyphSequence)
                    .with_value(Glyph::Play.as_char().to_string()),
            )
            .add_widget(
                Widget::new(W_REMAINING, (TRANSPORT_ROW, TEXT_COL), REMAINING_WIDTH)?
                    .format(Format::Time)
                    .with_value("0"),
            )
            .add_widget(
                Widget::new(W_HELP, (TRANSPORT_ROW, HELP_COL), HELP_WIDTH)?.align(Alignment::Right),
            ))
    }

    /// A centred banner with the stop glyph beside it
    pub fn stopped() -> Result<Self, DisplayError> {
        Ok(Self::new(LayoutKind::Stopped)
            .add_decoration(BANNER_ROW, ICON_COL, Glyph::Stop)
            .add_widget(
                Widget::new(W_BANNER, (BANNER_ROW, TEXT_COL), TEXT_WIDTH)?
                    .align(Alignment::Center)
                    .with_value(BANNER_TEXT),
            ))
    }

    /// Reject a page that would write outside a `rows` x `cols` panel
    pub fn check_fits(&self, rows: u8, cols: u8) -> Result<(), DisplayError> {
        for w in &self.widgets {
            let (row, col) = w.position();
            if row > rows || col as usize + w.max_width() - 1 > cols as usize {
                return Err(DisplayError::InvalidConfiguration(format!(
                    "widget '{}' at ({}, {}) width {} does not fit a {}x{} panel",
                    w.name(), row, col, w.max_width(), cols, rows
                )));
            }
        }
        for d in &self.decorations {
            if d.row == 0 || d.col == 0 || d.row > rows || d.col > cols {
                return Err(DisplayError::OutOfBounds { row: d.row, col: d.col });
            }
        }
        Ok(())
    }

    pub fn widget(&self, name: &str) -> Option<&Widget> {
        self.widgets.iter().find(|w| w.name() == name)
    }

    pub fn widget_mut(&mut self, name: &str) -> Option<&mut Widget> {
        self.widgets.iter_mut().find(|w| w.name() == name)
    }

    pub fn widgets(&self) -> &[Widget] {
        &self.widgets
    }

    pub fn widgets_mut(&mut self) -> &mut [Widget] {
        &mut self.widgets
    }

    pub fn decorations(&self) -> &[Decoration] {
        &self.decorations
    }
}
