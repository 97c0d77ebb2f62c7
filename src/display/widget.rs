/*
 *  display/widget.rs
 *
 *  shellfm-lcd - shell-fm on the front panel
 *  (c) 2020-26 Stuart Hunter
 *
 *  Fixed-position text fields with horizontal scrolling
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

use std::str::FromStr;
use super::error::DisplayError;
use crate::deutils::seconds_to_mmss;

/// Blanks added either side of an overflowing value so the wrap point reads cleanly
const SCROLL_PAD: &str = "  ";

/// Widget alignment options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
}

impl FromStr for Alignment {
    type Err = DisplayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" | "ljust" => Ok(Alignment::Left),
            "center" | "centre" => Ok(Alignment::Center),
            "right" | "rjust" => Ok(Alignment::Right),
            other => Err(DisplayError::InvalidConfiguration(format!("unknown alignment '{}'", other))),
        }
    }
}

/// How the stored value is turned into display text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Value shown as-is
    Plain,
    /// Value holds signed seconds, shown as MM:SS
    Time,
    /// Value holds glyph placeholder characters (see `Glyph::as_char`)
    GlyphSequence,
}

impl FromStr for Format {
    type Err = DisplayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "plain" | "none" => Ok(Format::Plain),
            "time" => Ok(Format::Time),
            "glyphs" | "glyph_sequence" => Ok(Format::GlyphSequence),
            other => Err(DisplayError::InvalidConfiguration(format!("unknown format '{}'", other))),
        }
    }
}

/// A renderable text field bound to a screen position and width
///
/// The widget itself holds no lock. Callers sharing a widget between tasks
/// must serialise `set_value`, `advance_scroll` and `render`; the
/// `DisplayCoordinator` does this with a single mutex over every widget.
#[derive(Debug, Clone)]
pub struct Widget {
    name: String,
    value: String,
    row: u8,
    col: u8,
    max_width: usize,
    format: Format,
    alignment: Alignment,
    scroll_offset: usize,
    needs_redraw: bool,
}

impl Widget {
    /// Create an empty plain, left-aligned widget at 1-based (row, col)
    pub fn new(name: impl Into<String>, (row, col): (u8, u8), max_width: usize) -> Result<Self, DisplayError> {
        let name = name.into();
        if max_width == 0 {
            return Err(DisplayError::InvalidConfiguration(format!("widget '{}' has zero width", name)));
        }
        if row == 0 || col == 0 {
            return Err(DisplayError::InvalidConfiguration(format!(
                "widget '{}' position ({}, {}) is not 1-based", name, row, col
            )));
        }
        Ok(Self {
            name,
            value: String::new(),
            row,
            col,
            max_width,
            format: Format::Plain,
            alignment: Alignment::Left,
            scroll_offset: 1,
            // never drawn yet
            needs_redraw: true,
        })
    }

    /// Builder: set format
    pub fn format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Builder: set alignment
    pub fn align(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Builder: set initial value
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn position(&self) -> (u8, u8) {
        (self.row, self.col)
    }

    pub fn max_width(&self) -> usize {
        self.max_width
    }

    pub fn kind(&self) -> Format {
        self.format
    }

    #[cfg(test)]
    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    /// Replace the value. Returns true if it differed, in which case the
    /// scroll restarts and the widget is flagged for redraw.
    pub fn set_value(&mut self, value: &str) -> bool {
        if self.value == value {
            return false;
        }
        self.value.clear();
        self.value.push_str(value);
        self.scroll_offset = 1;
        self.needs_redraw = true;
        true
    }

    /// Move the scroll window one character. Returns false when the value fits.
    pub fn advance_scroll(&mut self) -> bool {
        if self.value.chars().count() <= self.max_width {
            return false;
        }
        let padded_len = self.value.chars().count() + 2 * SCROLL_PAD.len();
        self.scroll_offset += 1;
        // restart rather than wrap once the tail would leave the window short
        if padded_len - (self.scroll_offset - 1) < self.max_width {
            self.scroll_offset = 1;
        }
        self.needs_redraw = true;
        true
    }

    /// Number of `advance_scroll` calls that bring the window back to the start
    pub fn scroll_cycle_len(&self) -> Option<usize> {
        let len = self.value.chars().count();
        if len <= self.max_width {
            return None;
        }
        Some(len + 2 * SCROLL_PAD.len() - self.max_width + 1)
    }

    /// Display text without acknowledging the draw
    pub fn peek(&self) -> String {
        let text = match self.format {
            Format::Time => {
                let secs = self.value.trim().parse::<i64>().unwrap_or(0);
                seconds_to_mmss(secs)
            }
            Format::Plain | Format::GlyphSequence => self.value.clone(),
        };

        let len = text.chars().count();
        if len > self.max_width {
            let mut window: String = SCROLL_PAD
                .chars()
                .chain(text.chars())
                .chain(SCROLL_PAD.chars())
                .skip(self.scroll_offset - 1)
                .take(self.max_width)
                .collect();
            pad_right(&mut window, self.max_width);
            window
        } else {
            align(&text, len, self.max_width, self.alignment)
        }
    }

    /// Exactly `max_width` characters of display text; clears the redraw flag.
    /// Only the render pass may call this.
    pub fn render(&mut self) -> String {
        self.needs_redraw = false;
        self.peek()
    }
}

fn pad_right(s: &mut String, width: usize) {
    let len = s.chars().count();
    s.extend(std::iter::repeat_n(' ', width.saturating_sub(len)));
}

fn align(text: &str, len: usize, width: usize, alignment: Alignment) -> String {
    let gap = width - len;
    let (left, right) = match alignment {
        Alignment::Left => (0, gap),
        Alignment::Right => (gap, 0),
        // odd gaps put the extra blank on the right
        Alignment::Center => (gap / 2, gap - gap / 2),
    };
    let mut out = String::with_capacity(width);
    out.extend(std::iter::repeat_n(' ', left));
    out.push_str(text);
    out.extend(std::iter::repeat_n(' ', right));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget(width: usize) -> Widget {
        Widget::new("test", (1, 3), width).unwrap()
    }

    #[test]
    fn test_rejects_bad_geometry() {
        assert!(Widget::new("w", (1, 1), 0).is_err());
        assert!(Widget::new("w", (0, 1), 5).is_err());
        assert!(Widget::new("w", (1, 0), 5).is_err());
        assert!("diagonal".parse::<Alignment>().is_err());
        assert!("sparkly".parse::<Format>().is_err());
        assert_eq!("rjust".parse::<Alignment>().unwrap(), Alignment::Right);
        assert_eq!("time".parse::<Format>().unwrap(), Format::Time);
    }

    #[test]
    fn test_render_is_always_max_width() {
        for value in ["", "abc", "exactly18chars....", "far too long to fit in the field", "    "] {
            let mut w = widget(18);
            w.set_value(value);
            assert_eq!(w.render().chars().count(), 18, "value {:?}", value);
            for _ in 0..40 {
                w.advance_scroll();
                assert_eq!(w.render().chars().count(), 18, "value {:?}", value);
            }
        }
    }

    #[test]
    fn test_alignment() {
        let mut w = widget(7);
        w.set_value("abc");
        assert_eq!(w.render(), "abc    ");

        let mut w = widget(7).align(Alignment::Right);
        w.set_value("abc");
        assert_eq!(w.render(), "    abc");

        let mut w = widget(8).align(Alignment::Center);
        w.set_value("abc");
        assert_eq!(w.render(), "  abc   ");
    }

    #[test]
    fn test_set_value_same_value_keeps_scroll() {
        let mut w = widget(5);
        assert!(w.set_value("a long scrolling value"));
        w.advance_scroll();
        w.advance_scroll();
        assert_eq!(w.scroll_offset(), 3);
        w.render();
        assert!(!w.set_value("a long scrolling value"));
        assert_eq!(w.scroll_offset(), 3);
        assert!(!w.needs_redraw());
    }

    #[test]
    fn test_set_value_change_resets_scroll() {
        let mut w = widget(5);
        w.set_value("a long scrolling value");
        w.advance_scroll();
        w.render();
        assert!(w.set_value("another long value"));
        assert_eq!(w.scroll_offset(), 1);
        assert!(w.needs_redraw());
    }

    #[test]
    fn test_fitting_value_does_not_scroll() {
        let mut w = widget(10);
        w.set_value("short");
        w.render();
        assert!(!w.advance_scroll());
        assert_eq!(w.scroll_offset(), 1);
        assert!(!w.needs_redraw());
    }

    #[test]
    fn test_scroll_window_and_cycle() {
        // 10 chars, padded to 14, window of 6: offsets 1..=9 then back to 1
        let mut w = widget(6);
        w.set_value("ABCDEFGHIJ");
        assert_eq!(w.render(), "  ABCD");
        assert_eq!(w.scroll_cycle_len(), Some(9));

        w.advance_scroll();
        assert!(w.needs_redraw());
        assert_eq!(w.render(), " ABCDE");

        let mut steps = 1;
        while w.scroll_offset() != 1 {
            w.advance_scroll();
            steps += 1;
            assert!(steps <= 9, "scroll never restarted");
            if w.scroll_offset() == 9 {
                assert_eq!(w.peek(), "GHIJ  ");
            }
        }
        assert_eq!(steps, 9);
        assert_eq!(w.render(), "  ABCD");
    }

    #[test]
    fn test_time_format() {
        let mut w = widget(7).format(Format::Time);
        w.set_value("125");
        assert_eq!(w.render(), "02:05  ");
        w.set_value("-5");
        assert_eq!(w.render(), "00:00  ");
        w.set_value("0");
        assert_eq!(w.render(), "00:00  ");
        w.set_value("");
        assert_eq!(w.render(), "00:00  ");
    }

    #[test]
    fn test_render_counts_characters_not_bytes() {
        let mut w = widget(6);
        w.set_value("Björk");
        assert_eq!(w.render(), "Björk ");
        w.set_value("Sigur Rós Ágætis");
        assert_eq!(w.render(), "  Sigu");
        assert_eq!(w.render().chars().count(), 6);
    }

    #[test]
    fn test_render_clears_redraw_flag() {
        let mut w = widget(4);
        assert!(w.needs_redraw());
        w.render();
        assert!(!w.needs_redraw());
        w.set_value("ab");
        assert!(w.needs_redraw());
        let _ = w.peek();
        assert!(w.needs_redraw());
    }
}
