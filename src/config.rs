use serde::{Deserialize, Serialize};
use clap::{ArgAction, Parser, ValueEnum, ValueHint};
use dirs_next::home_dir;
use std::{fs, path::{Path, PathBuf}, time::Duration};
use thiserror::Error;

use crate::constants::*;

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level app configuration, as read from YAML. Every field is optional so
/// files only need to carry what they change.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub log_level: Option<String>,     // e.g., "info" | "debug"
    pub splash: Option<bool>,
    pub daemon: Option<DaemonConfig>,
    pub timing: Option<TimingConfig>,
    pub display: Option<DisplayConfig>,
    /// YAML alarm rules, re-read every minute
    pub alarms: Option<PathBuf>,
}

/// Where shell-fm's network interface listens
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DaemonConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TimingConfig {
    pub poll_interval_ms: Option<u64>,
    pub scroll_interval_ms: Option<u64>,
    pub display_poll_ms: Option<u64>,
    pub backlight_timeout_secs: Option<u64>,
    pub alarm_check_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DisplayConfig {
    pub driver: Option<DriverKind>, // <- strongly-typed driver selection
    pub device: Option<PathBuf>,    // serial device node of the panel
    pub baud: Option<u32>,          // serial line speed, 8N1
    pub glyph_dir: Option<PathBuf>, // directory of <name>.chr overrides
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    Pertelian,
    Emulator, // terminal stand-in, no hardware needed
}

impl Config {
    /// Built-in defaults with every value filled, the base layer of the merge
    pub fn defaults() -> Self {
        Self {
            log_level: Some("info".to_string()),
            splash: Some(true),
            daemon: Some(DaemonConfig {
                host: Some(DEFAULT_HOST.to_string()),
                port: Some(DEFAULT_PORT),
                timeout_ms: Some(DEFAULT_TIMEOUT_MS),
            }),
            timing: Some(TimingConfig {
                poll_interval_ms: Some(DEFAULT_POLL_MS),
                scroll_interval_ms: Some(DEFAULT_SCROLL_MS),
                display_poll_ms: Some(DEFAULT_DISPLAY_POLL_MS),
                backlight_timeout_secs: Some(DEFAULT_BACKLIGHT_SECS),
                alarm_check_ms: Some(DEFAULT_ALARM_CHECK_MS),
            }),
            display: Some(DisplayConfig {
                driver: Some(DriverKind::Pertelian),
                device: Some(PathBuf::from(DEFAULT_DEVICE)),
                baud: Some(DEFAULT_BAUD),
                glyph_dir: None,
            }),
            alarms: None,
        }
    }
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone)]
#[command(name = "shellfm-lcd", version, about = "shell-fm now playing on a character LCD", disable_help_flag = false)]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
    /// shorthand for --log-level debug
    #[arg(short = 'v', long, action = ArgAction::SetTrue)]
    pub debug: bool,
    /// shell-fm host
    #[arg(long)]
    pub host: Option<String>,
    /// shell-fm port
    #[arg(long)]
    pub port: Option<u16>,
    #[arg(long, value_enum)]
    pub driver: Option<DriverKind>,
    /// serial device of the panel
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub device: Option<PathBuf>,
    /// serial baud rate of the panel
    #[arg(long)]
    pub baud: Option<u32>,
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub glyph_dir: Option<PathBuf>,
    /// YAML alarm rules
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub alarms: Option<PathBuf>,
    /// skip the start-up splash screen
    #[arg(long, action = ArgAction::SetTrue)]
    pub no_splash: bool,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Plain values handed to the runtime, every default resolved
#[derive(Debug, Clone, PartialEq)]
pub struct CoreSettings {
    pub log_level: String,
    pub splash: bool,
    pub host: String,
    pub port: u16,
    pub timeout: Duration,
    pub poll_interval: Duration,
    pub scroll_interval: Duration,
    pub display_poll: Duration,
    pub backlight_timeout: Duration,
    pub alarm_check: Duration,
    pub driver: DriverKind,
    pub device: PathBuf,
    pub baud: u32,
    pub glyph_dir: Option<PathBuf>,
    pub alarms: Option<PathBuf>,
}

impl From<&Config> for CoreSettings {
    fn from(cfg: &Config) -> Self {
        let daemon = cfg.daemon.clone().unwrap_or_default();
        let timing = cfg.timing.clone().unwrap_or_default();
        let display = cfg.display.clone().unwrap_or_default();
        let ms = |v: Option<u64>, d: u64| Duration::from_millis(v.unwrap_or(d));

        Self {
            log_level: cfg.log_level.clone().unwrap_or_else(|| "info".to_string()),
            splash: cfg.splash.unwrap_or(true),
            host: daemon.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: daemon.port.unwrap_or(DEFAULT_PORT),
            timeout: ms(daemon.timeout_ms, DEFAULT_TIMEOUT_MS),
            poll_interval: ms(timing.poll_interval_ms, DEFAULT_POLL_MS),
            scroll_interval: ms(timing.scroll_interval_ms, DEFAULT_SCROLL_MS),
            display_poll: ms(timing.display_poll_ms, DEFAULT_DISPLAY_POLL_MS),
            backlight_timeout: Duration::from_secs(timing.backlight_timeout_secs.unwrap_or(DEFAULT_BACKLIGHT_SECS)),
            alarm_check: ms(timing.alarm_check_ms, DEFAULT_ALARM_CHECK_MS),
            driver: display.driver.unwrap_or(DriverKind::Pertelian),
            device: display.device.unwrap_or_else(|| PathBuf::from(DEFAULT_DEVICE)),
            baud: display.baud.unwrap_or(DEFAULT_BAUD),
            glyph_dir: display.glyph_dir,
            alarms: cfg.alarms.clone(),
        }
    }
}

/// Public entry point: read YAML, merge, apply CLI, validate.
/// `--dump-config` prints the effective config and exits.
pub fn load(cli: &Cli) -> Result<CoreSettings, ConfigError> {
    let cfg = load_config(cli)?;

    if cli.dump_config {
        // Pretty YAML of effective config (nice for debugging)
        let s = serde_yaml::to_string(&cfg)?;
        println!("{s}");
        std::process::exit(0);
    }

    Ok(CoreSettings::from(&cfg))
}

/// Everything `load` does short of printing and exiting
pub fn load_config(cli: &Cli) -> Result<Config, ConfigError> {
    // 1) defaults
    let mut cfg = Config::defaults();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 4) Validate
    validate(&cfg)?;
    Ok(cfg)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/shellfm-lcd/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/shellfm-lcd/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/shellfm-lcd.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["shellfm-lcd.yaml", "config.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    if s.trim().is_empty() {
        return Ok(Config::default());
    }
    let cfg: Config = serde_yaml::from_str(&s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    // top-level
    if src.log_level.is_some()      { dst.log_level = src.log_level; }
    if src.splash.is_some()         { dst.splash = src.splash; }
    if src.alarms.is_some()         { dst.alarms = src.alarms; }
    match (&mut dst.daemon, src.daemon) {
        (None, Some(c)) => dst.daemon = Some(c),
        (Some(d), Some(s)) => merge_daemon(d, s),
        _ => {}
    }
    match (&mut dst.timing, src.timing) {
        (None, Some(c)) => dst.timing = Some(c),
        (Some(d), Some(s)) => merge_timing(d, s),
        _ => {}
    }
    match (&mut dst.display, src.display) {
        (None, Some(c)) => dst.display = Some(c),
        (Some(d), Some(s)) => merge_display(d, s),
        _ => {}
    }
}

fn merge_daemon(dst: &mut DaemonConfig, src: DaemonConfig) {
    if src.host.is_some()        { dst.host = src.host; }
    if src.port.is_some()        { dst.port = src.port; }
    if src.timeout_ms.is_some()  { dst.timeout_ms = src.timeout_ms; }
}

fn merge_timing(dst: &mut TimingConfig, src: TimingConfig) {
    if src.poll_interval_ms.is_some()        { dst.poll_interval_ms = src.poll_interval_ms; }
    if src.scroll_interval_ms.is_some()      { dst.scroll_interval_ms = src.scroll_interval_ms; }
    if src.display_poll_ms.is_some()         { dst.display_poll_ms = src.display_poll_ms; }
    if src.backlight_timeout_secs.is_some()  { dst.backlight_timeout_secs = src.backlight_timeout_secs; }
    if src.alarm_check_ms.is_some()          { dst.alarm_check_ms = src.alarm_check_ms; }
}

fn merge_display(dst: &mut DisplayConfig, src: DisplayConfig) {
    if src.driver.is_some()      { dst.driver = src.driver; }
    if src.device.is_some()      { dst.device = src.device; }
    if src.baud.is_some()        { dst.baud = src.baud; }
    if src.glyph_dir.is_some()   { dst.glyph_dir = src.glyph_dir; }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.log_level.is_some()       { cfg.log_level = cli.log_level.clone(); }
    if cli.debug                     { cfg.log_level = Some("debug".to_string()); }
    if cli.no_splash                 { cfg.splash = Some(false); }
    if cli.alarms.is_some()          { cfg.alarms = cli.alarms.clone(); }

    if cli.host.is_some() || cli.port.is_some() {
        let daemon = cfg.daemon.get_or_insert_with(DaemonConfig::default);
        if cli.host.is_some()        { daemon.host = cli.host.clone(); }
        if cli.port.is_some()        { daemon.port = cli.port; }
    }

    let any_display = cli.driver.is_some() || cli.device.is_some() || cli.baud.is_some() || cli.glyph_dir.is_some();
    if any_display {
        let display = cfg.display.get_or_insert_with(DisplayConfig::default);
        if cli.driver.is_some()      { display.driver = cli.driver; }
        if cli.device.is_some()      { display.device = cli.device.clone(); }
        if cli.baud.is_some()        { display.baud = cli.baud; }
        if cli.glyph_dir.is_some()   { display.glyph_dir = cli.glyph_dir.clone(); }
    }
}

/// Put any invariants here (required fields, ranges, etc.)
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if let Some(level) = cfg.log_level.as_deref() {
        match level.to_ascii_lowercase().as_str() {
            "off" | "error" | "warn" | "info" | "debug" | "trace" => {},
            other => return Err(ConfigError::Validation(format!("unknown log_level '{}'", other))),
        }
    }
    if let Some(daemon) = cfg.daemon.as_ref() {
        if daemon.port == Some(0) {
            return Err(ConfigError::Validation("daemon port must be > 0".into()));
        }
        if daemon.timeout_ms == Some(0) {
            return Err(ConfigError::Validation("daemon timeout_ms must be > 0".into()));
        }
        if daemon.host.as_deref().is_some_and(|h| h.trim().is_empty()) {
            return Err(ConfigError::Validation("daemon host must not be empty".into()));
        }
    }
    if cfg.display.as_ref().is_some_and(|d| d.baud == Some(0)) {
        return Err(ConfigError::Validation("display baud must be > 0".into()));
    }
    if let Some(timing) = cfg.timing.as_ref() {
        let intervals = [
            ("poll_interval_ms", timing.poll_interval_ms),
            ("scroll_interval_ms", timing.scroll_interval_ms),
            ("display_poll_ms", timing.display_poll_ms),
            ("alarm_check_ms", timing.alarm_check_ms),
        ];
        for (name, value) in intervals {
            if value == Some(0) {
                return Err(ConfigError::Validation(format!("timing {} must be > 0", name)));
            }
        }
    }
    Ok(())
}
