/*
 *  glyphs.rs
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
use std::fs;
use std::path::Path;
use log::{debug, warn};

use crate::display::DisplayError;

/// One 5x8 custom character, a byte per pixel row, low 5 bits used
pub type GlyphBitmap = [u8; 8];

pub const GLYPH_GUITAR: GlyphBitmap = [0x01, 0x02, 0x04, 0x0c, 0x1e, 0x1c, 0x18, 0x00,];
pub const GLYPH_CD: GlyphBitmap = [0x0e, 0x11, 0x11, 0x15, 0x11, 0x11, 0x0e, 0x00,];
pub const GLYPH_NOTES: GlyphBitmap = [0x01, 0x03, 0x05, 0x09, 0x0b, 0x1b, 0x18, 0x00,];
pub const GLYPH_PLAY: GlyphBitmap = [0x08, 0x0c, 0x0e, 0x0f, 0x0e, 0x0c, 0x08, 0x00,];
pub const GLYPH_PAUSE: GlyphBitmap = [0x1b, 0x1b, 0x1b, 0x1b, 0x1b, 0x1b, 0x1b, 0x00,];
pub const GLYPH_STOP: GlyphBitmap = [0x00, 0x1f, 0x1f, 0x1f, 0x1f, 0x1f, 0x00, 0x00,];

/// Custom characters used by the layouts, each bound to a CGRAM slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    Guitar = 1,
    Cd = 2,
    Notes = 3,
    Play = 4,
    Pause = 5,
    Stop = 6,
}

impl Glyph {
    pub const ALL: [Glyph; 6] = [
        Glyph::Guitar,
        Glyph::Cd,
        Glyph::Notes,
        Glyph::Play,
        Glyph::Pause,
        Glyph::Stop,
    ];

    pub fn slot(self) -> u8 {
        self as u8
    }

    /// File stem looked up in the glyph directory
    pub fn name(self) -> &'static str {
        match self {
            Glyph::Guitar => "guitar",
            Glyph::Cd => "cd",
            Glyph::Notes => "notes",
            Glyph::Play => "play",
            Glyph::Pause => "pause",
            Glyph::Stop => "stop",
        }
    }

    pub fn builtin(self) -> GlyphBitmap {
        match self {
            Glyph::Guitar => GLYPH_GUITAR,
            Glyph::Cd => GLYPH_CD,
            Glyph::Notes => GLYPH_NOTES,
            Glyph::Play => GLYPH_PLAY,
            Glyph::Pause => GLYPH_PAUSE,
            Glyph::Stop => GLYPH_STOP,
        }
    }

    /// Placeholder character carrying this slot inside a glyph-sequence widget value
    pub fn as_char(self) -> char {
        char::from(self.slot())
    }

    pub fn from_char(c: char) -> Option<Glyph> {
        Glyph::ALL.into_iter().find(|g| g.as_char() == c)
    }
}

/// Parse a `.chr` bitmap: eight rows of five pixels, `1`/`#` lit and `0`/`.` dark.
/// Blank lines and lines starting with `;` are skipped.
pub fn parse_chr(source: &str) -> Result<GlyphBitmap, DisplayError> {
    let mut bitmap = [0u8; 8];
    let mut rows = 0usize;

    for line in source.lines().map(str::trim) {
        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        if rows == 8 {
            return Err(DisplayError::GlyphFormat("more than 8 pixel rows".to_string()));
        }
        if line.chars().count() != 5 {
            return Err(DisplayError::GlyphFormat(format!("row {} is not 5 pixels wide: {:?}", rows + 1, line)));
        }
        let mut bits = 0u8;
        for c in line.chars() {
            bits <<= 1;
            match c {
                '1' | '#' => bits |= 1,
                '0' | '.' => {}
                other => {
                    return Err(DisplayError::GlyphFormat(format!("unexpected pixel {:?} in row {}", other, rows + 1)));
                }
            }
        }
        bitmap[rows] = bits;
        rows += 1;
    }

    if rows != 8 {
        return Err(DisplayError::GlyphFormat(format!("expected 8 pixel rows, found {}", rows)));
    }
    Ok(bitmap)
}

pub fn load_chr_file(path: &Path) -> Result<GlyphBitmap, DisplayError> {
    let source = fs::read_to_string(path)?;
    parse_chr(&source)
}

/// Resolve the bitmap for every glyph, preferring `<dir>/<name>.chr` over the built-in set
pub fn glyph_bank(dir: Option<&Path>) -> Vec<(Glyph, GlyphBitmap)> {
    Glyph::ALL
        .into_iter()
        .map(|glyph| {
            let bitmap = dir
                .map(|d| d.join(format!("{}.chr", glyph.name())))
                .filter(|p| p.exists())
                .and_then(|p| match load_chr_file(&p) {
                    Ok(bitmap) => {
                        debug!("Loaded glyph {} from {}", glyph.name(), p.display());
                        Some(bitmap)
                    }
                    Err(e) => {
                        warn!("Ignoring glyph file {}: {}", p.display(), e);
                        None
                    }
                })
                .unwrap_or_else(|| glyph.builtin());
            (glyph, bitmap)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PLAY_CHR: &str = "; play arrow\n01000\n01100\n01110\n01111\n01110\n01100\n01000\n00000\n";

    #[test]
    fn test_parse_chr_matches_builtin() {
        assert_eq!(parse_chr(PLAY_CHR).unwrap(), GLYPH_PLAY);
    }

    #[test]
    fn test_parse_chr_accepts_hash_dot() {
        let src = "#...#\n.....\n.....\n.....\n.....\n.....\n.....\n#####\n";
        let bitmap = parse_chr(src).unwrap();
        assert_eq!(bitmap[0], 0x11);
        assert_eq!(bitmap[7], 0x1f);
    }

    #[test]
    fn test_parse_chr_rejects_bad_rows() {
        assert!(parse_chr("0000\n").is_err());
        assert!(parse_chr("00000\n00000\n").is_err());
        assert!(parse_chr("0000x\n00000\n00000\n00000\n00000\n00000\n00000\n00000\n").is_err());
        let nine = "00000\n".repeat(9);
        assert!(parse_chr(&nine).is_err());
    }

    #[test]
    fn test_glyph_char_round_trip() {
        for glyph in Glyph::ALL {
            assert_eq!(Glyph::from_char(glyph.as_char()), Some(glyph));
        }
        assert_eq!(Glyph::from_char('a'), None);
    }

    #[test]
    fn test_glyph_bank_prefers_directory_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = std::fs::File::create(dir.path().join("stop.chr")).unwrap();
        f.write_all("11111\n".repeat(8).as_bytes()).unwrap();
        std::fs::write(dir.path().join("cd.chr"), "garbage").unwrap();

        let bank = glyph_bank(Some(dir.path()));
        assert_eq!(bank.len(), Glyph::ALL.len());
        let stop = bank.iter().find(|(g, _)| *g == Glyph::Stop).unwrap().1;
        assert_eq!(stop, [0x1f; 8]);
        // unreadable file falls back to the built-in bitmap
        let cd = bank.iter().find(|(g, _)| *g == Glyph::Cd).unwrap().1;
        assert_eq!(cd, GLYPH_CD);
    }
}
