//! This module contains global constants used across the display and other modules.

/// Panel geometry of the Pertelian X2040 and the terminal emulator.
pub const LCD_ROWS: u8 = 4;
pub const LCD_COLS: u8 = 20;

// now playing layout: a glyph in column 1, text from column 3
pub const ICON_COL: u8 = 1;
pub const TEXT_COL: u8 = 3;
pub const TEXT_WIDTH: usize = 18;

pub const ARTIST_ROW: u8 = 1;
pub const ALBUM_ROW: u8 = 2;
pub const TITLE_ROW: u8 = 3;
pub const TRANSPORT_ROW: u8 = 4;

/// Remaining time, MM:SS with room for three digit minutes
pub const REMAINING_WIDTH: usize = 7;
/// Status word at the right end of the bottom row
pub const HELP_COL: u8 = 11;
pub const HELP_WIDTH: usize = 10;

// stopped layout
pub const BANNER_ROW: u8 = 2;
pub const BANNER_TEXT: &str = "shell.fm stopped";

// splash and goodbye
pub const SPLASH_TITLE: &str = "shell.fm LCD display";
pub const SPLASH_CREDIT: &str = "(c) Stuart Hunter";
pub const SPLASH_SECS: u64 = 1;
pub const GOODBYE_TEXT: &str = "Bye!";
pub const GOODBYE_ROW: u8 = 2;

/// Widget names used to address fields of the layouts
pub const W_ARTIST: &str = "artist";
pub const W_ALBUM: &str = "album";
pub const W_TITLE: &str = "title";
pub const W_REMAINING: &str = "remaining";
pub const W_STATUS_ICON: &str = "status_icon";
pub const W_HELP: &str = "help";
pub const W_BANNER: &str = "banner";

// defaults for the configuration layer
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 54311;
pub const DEFAULT_TIMEOUT_MS: u64 = 800;
pub const DEFAULT_POLL_MS: u64 = 4000;
pub const DEFAULT_SCROLL_MS: u64 = 500;
pub const DEFAULT_DISPLAY_POLL_MS: u64 = 50;
pub const DEFAULT_BACKLIGHT_SECS: u64 = 30;
pub const DEFAULT_ALARM_CHECK_MS: u64 = 5000;
pub const DEFAULT_DEVICE: &str = "/dev/ttyUSB0";
pub const DEFAULT_BAUD: u32 = 9600;

/// Remaining-time countdown step
pub const COUNTDOWN_MS: u64 = 1000;
