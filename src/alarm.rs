/*
 *  alarm.rs
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
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use log::{debug, info, warn};
use serde::Deserialize;
use thiserror::Error;
use tokio::time::{interval, MissedTickBehavior};

use crate::deutils::{expand_days, parse_hh_mm};
use crate::display::DisplayCoordinator;
use crate::shellfm::DaemonClient;
use crate::status::PlaybackStatus;

#[derive(Debug, Error)]
pub enum AlarmError {
    #[error("cannot read alarms: {0}")]
    Io(#[from] std::io::Error),
    #[error("alarm YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid alarm time '{0}', expected HH:MM")]
    InvalidTime(String),
    #[error("invalid alarm day '{0}'")]
    InvalidDay(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlarmAction {
    Play,
    Pause,
    Stop,
}

/// One scheduled command: fires when the weekday is in `days` and the clock reads `time`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmRule {
    pub days: Vec<Weekday>,
    pub time: NaiveTime,
    pub action: AlarmAction,
    pub station: Option<String>,
}

impl AlarmRule {
    /// Build a rule from its textual parts. `days` tokens are weekday names or
    /// the groups "daily", "weekdays" and "weekends".
    pub fn parse<S: AsRef<str>>(
        days: &[S],
        time: &str,
        action: AlarmAction,
        station: Option<String>,
    ) -> Result<Self, AlarmError> {
        let time = parse_hh_mm(time).ok_or_else(|| AlarmError::InvalidTime(time.to_string()))?;

        let mut set: Vec<Weekday> = Vec::with_capacity(7);
        for token in days {
            let token = token.as_ref();
            let expanded = expand_days(token).ok_or_else(|| AlarmError::InvalidDay(token.to_string()))?;
            for day in expanded {
                if !set.contains(&day) {
                    set.push(day);
                }
            }
        }
        if set.is_empty() {
            return Err(AlarmError::InvalidDay(String::new()));
        }

        Ok(Self {
            days: set,
            time,
            action,
            station: station.filter(|s| !s.trim().is_empty()),
        })
    }

    pub fn matches(&self, now: &NaiveDateTime) -> bool {
        self.days.contains(&now.weekday())
            && self.time.hour() == now.hour()
            && self.time.minute() == now.minute()
    }
}

/// On-disk form of a rule, validated into `AlarmRule`
#[derive(Debug, Deserialize)]
struct RawRule {
    days: DaySpec,
    time: String,
    action: AlarmAction,
    #[serde(default)]
    station: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DaySpec {
    One(String),
    Many(Vec<String>),
}

impl DaySpec {
    fn tokens(self) -> Vec<String> {
        match self {
            DaySpec::One(s) => s.split(',').map(|t| t.trim().to_string()).collect(),
            DaySpec::Many(v) => v,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AlarmFile {
    Wrapped { alarms: Vec<RawRule> },
    Bare(Vec<RawRule>),
}

/// Parse a rules document; an empty document yields no rules
pub fn parse_rules(text: &str) -> Result<Vec<AlarmRule>, AlarmError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let raw = match serde_yaml::from_str::<AlarmFile>(text)? {
        AlarmFile::Wrapped { alarms } => alarms,
        AlarmFile::Bare(v) => v,
    };
    raw.into_iter()
        .map(|r| AlarmRule::parse(&r.days.tokens(), &r.time, r.action, r.station))
        .collect()
}

/// Where alarm rules come from
pub trait AlarmSource: Send + Sync {
    fn load_rules(&self) -> Result<Vec<AlarmRule>, AlarmError>;
}

/// Rules kept in a YAML file, re-read on every load so edits apply without a restart
#[derive(Debug, Clone)]
pub struct YamlAlarmSource {
    path: PathBuf,
}

impl YamlAlarmSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AlarmSource for YamlAlarmSource {
    fn load_rules(&self) -> Result<Vec<AlarmRule>, AlarmError> {
        let text = fs::read_to_string(&self.path)?;
        parse_rules(&text)
    }
}

/// Minute-resolution evaluator
pub struct AlarmScheduler<S: AlarmSource> {
    source: S,
    last_minute: Option<(NaiveDate, u32, u32)>,
}

impl<S: AlarmSource> AlarmScheduler<S> {
    pub fn new(source: S) -> Self {
        Self { source, last_minute: None }
    }

    /// Rules due at `now`. Returns nothing unless the minute (or date) moved
    /// since the previous call, so a minute fires at most once however often
    /// this is polled. Rules come back in load order.
    pub fn due(&mut self, now: NaiveDateTime) -> Vec<AlarmRule> {
        let minute = (now.date(), now.hour(), now.minute());
        if self.last_minute == Some(minute) {
            return Vec::new();
        }
        self.last_minute = Some(minute);

        match self.source.load_rules() {
            Ok(rules) => rules.into_iter().filter(|r| r.matches(&now)).collect(),
            Err(e) => {
                warn!("Alarm rules unavailable, none fire at {:02}:{:02}: {}", minute.1, minute.2, e);
                Vec::new()
            }
        }
    }

    /// Check the local clock every `check_every` and run whatever is due
    pub async fn run<C: DaemonClient>(mut self, client: Arc<C>, coordinator: DisplayCoordinator, check_every: Duration) {
        let mut ticker = interval(check_every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let due = self.due(Local::now().naive_local());
            for rule in due {
                let status = coordinator.status().await;
                execute(client.as_ref(), &rule, status).await;
            }
        }
    }
}

/// Send one command, logging failures; nothing is retried
async fn send<C: DaemonClient>(client: &C, command: &str) {
    if let Err(e) = client.send_command(command).await {
        warn!("Alarm command '{}' failed: {}", command, e);
    }
}

/// Fire one rule against the daemon given the current transport state
pub async fn execute<C: DaemonClient>(client: &C, rule: &AlarmRule, status: PlaybackStatus) {
    info!(
        "Alarm {:?} at {} (player {})",
        rule.action,
        rule.time.format("%H:%M"),
        status
    );
    match rule.action {
        AlarmAction::Pause => {
            if status == PlaybackStatus::Playing {
                send(client, "pause").await;
            } else {
                debug!("Pause alarm ignored, player is {}", status);
            }
        }
        AlarmAction::Play => {
            let volume = mute(client).await;
            if status == PlaybackStatus::Paused {
                send(client, "pause").await;
            }
            if let Some(station) = &rule.station {
                send(client, &format!("play {}", station)).await;
            }
            if !status.is_stopped() {
                send(client, "skip").await;
            }
            restore(client, volume).await;
        }
        AlarmAction::Stop => {
            let volume = mute(client).await;
            if status == PlaybackStatus::Paused {
                send(client, "pause").await;
            }
            send(client, "stop").await;
            restore(client, volume).await;
        }
    }
}

async fn mute<C: DaemonClient>(client: &C) -> Option<u8> {
    let volume = client.volume().await;
    send(client, "volume 0").await;
    volume
}

async fn restore<C: DaemonClient>(client: &C, volume: Option<u8>) {
    match volume {
        Some(v) => send(client, &format!("volume {}", v)).await,
        None => debug!("No saved volume to restore"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shellfm::mock::MockDaemon;
    use std::io::Write;
    use std::sync::Mutex;

    struct Fixed(Vec<AlarmRule>);

    impl AlarmSource for Fixed {
        fn load_rules(&self) -> Result<Vec<AlarmRule>, AlarmError> {
            Ok(self.0.clone())
        }
    }

    struct Counting(Mutex<usize>);

    impl AlarmSource for Counting {
        fn load_rules(&self) -> Result<Vec<AlarmRule>, AlarmError> {
            *self.0.lock().unwrap() += 1;
            Ok(Vec::new())
        }
    }

    struct Broken;

    impl AlarmSource for Broken {
        fn load_rules(&self) -> Result<Vec<AlarmRule>, AlarmError> {
            Err(AlarmError::InvalidTime("25:99".to_string()))
        }
    }

    fn at(y: i32, m: u32, d: u32, hh: u32, mm: u32, ss: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(hh, mm, ss).unwrap()
    }

    fn monday_eight() -> AlarmRule {
        AlarmRule::parse(&["Mon"], "08:00", AlarmAction::Play, Some("lastfm://globaltags/ambient".into())).unwrap()
    }

    #[test]
    fn test_fires_once_per_matching_minute() {
        // 2024-01-01 is a Monday
        let mut scheduler = AlarmScheduler::new(Fixed(vec![monday_eight()]));
        let mut now = at(2024, 1, 1, 7, 58, 3);
        let end = at(2024, 1, 1, 8, 3, 0);
        let mut fired = 0;
        while now < end {
            fired += scheduler.due(now).len();
            now += chrono::Duration::seconds(5);
        }
        assert_eq!(fired, 1);
    }

    #[test]
    fn test_wrong_day_does_not_fire() {
        let mut scheduler = AlarmScheduler::new(Fixed(vec![monday_eight()]));
        assert!(scheduler.due(at(2024, 1, 2, 8, 0, 0)).is_empty());
    }

    #[test]
    fn test_same_minute_next_week_fires_again() {
        let mut scheduler = AlarmScheduler::new(Fixed(vec![monday_eight()]));
        assert_eq!(scheduler.due(at(2024, 1, 1, 8, 0, 0)).len(), 1);
        assert_eq!(scheduler.due(at(2024, 1, 8, 8, 0, 0)).len(), 1);
    }

    #[test]
    fn test_rules_loaded_once_per_minute() {
        let mut scheduler = AlarmScheduler::new(Counting(Mutex::new(0)));
        for s in (0..60).step_by(5) {
            scheduler.due(at(2024, 1, 1, 9, 0, s));
        }
        scheduler.due(at(2024, 1, 1, 9, 1, 0));
        assert_eq!(*scheduler.source.0.lock().unwrap(), 2);
    }

    #[test]
    fn test_broken_source_fires_nothing() {
        let mut scheduler = AlarmScheduler::new(Broken);
        assert!(scheduler.due(at(2024, 1, 1, 8, 0, 0)).is_empty());
    }

    #[test]
    fn test_all_matching_rules_fire_in_order() {
        let stop = AlarmRule::parse(&["daily"], "08:00", AlarmAction::Stop, None).unwrap();
        let other = AlarmRule::parse(&["Tue"], "08:00", AlarmAction::Pause, None).unwrap();
        let mut scheduler = AlarmScheduler::new(Fixed(vec![monday_eight(), other, stop.clone()]));
        let due = scheduler.due(at(2024, 1, 1, 8, 0, 30));
        assert_eq!(due, vec![monday_eight(), stop]);
    }

    #[test]
    fn test_parse_rules_yaml() {
        let text = r#"
alarms:
  - days: weekdays
    time: "07:30"
    action: play
    station: lastfm://user/rj/personal
  - days: [sat, sun]
    time: "23:15"
    action: stop
"#;
        let rules = parse_rules(text).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].days.len(), 5);
        assert_eq!(rules[0].time, NaiveTime::from_hms_opt(7, 30, 0).unwrap());
        assert_eq!(rules[0].station.as_deref(), Some("lastfm://user/rj/personal"));
        assert_eq!(rules[1].days, vec![Weekday::Sat, Weekday::Sun]);
        assert_eq!(rules[1].action, AlarmAction::Stop);
        assert!(rules[1].station.is_none());

        let bare = "- days: Mon,Wed\n  time: \"06:00\"\n  action: pause\n";
        assert_eq!(parse_rules(bare).unwrap()[0].days, vec![Weekday::Mon, Weekday::Wed]);
        assert!(parse_rules("  \n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rules_errors() {
        let bad_time = "- days: mon\n  time: \"8am\"\n  action: play\n";
        assert!(matches!(parse_rules(bad_time), Err(AlarmError::InvalidTime(_))));
        let bad_day = "- days: moonday\n  time: \"08:00\"\n  action: play\n";
        assert!(matches!(parse_rules(bad_day), Err(AlarmError::InvalidDay(_))));
        let bad_action = "- days: mon\n  time: \"08:00\"\n  action: dance\n";
        assert!(matches!(parse_rules(bad_action), Err(AlarmError::Yaml(_))));
    }

    #[test]
    fn test_yaml_source_reads_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "- days: daily\n  time: \"12:00\"\n  action: pause").unwrap();
        let source = YamlAlarmSource::new(f.path());
        assert_eq!(source.load_rules().unwrap().len(), 1);

        let missing = YamlAlarmSource::new(f.path().with_extension("nope"));
        assert!(matches!(missing.load_rules(), Err(AlarmError::Io(_))));
    }

    #[tokio::test]
    async fn test_play_while_paused() {
        let daemon = MockDaemon::new();
        *daemon.volume.lock().unwrap() = Some(70);
        execute(&daemon, &monday_eight(), PlaybackStatus::Paused).await;
        assert_eq!(
            daemon.commands(),
            vec!["volume 0", "pause", "play lastfm://globaltags/ambient", "skip", "volume 70"]
        );
    }

    #[tokio::test]
    async fn test_play_while_stopped_without_station() {
        let daemon = MockDaemon::new();
        *daemon.volume.lock().unwrap() = Some(40);
        let rule = AlarmRule::parse(&["daily"], "08:00", AlarmAction::Play, None).unwrap();
        execute(&daemon, &rule, PlaybackStatus::Stopped).await;
        assert_eq!(daemon.commands(), vec!["volume 0", "volume 40"]);
    }

    #[tokio::test]
    async fn test_pause_only_when_playing() {
        let rule = AlarmRule::parse(&["daily"], "22:00", AlarmAction::Pause, None).unwrap();

        let daemon = MockDaemon::new();
        execute(&daemon, &rule, PlaybackStatus::Paused).await;
        execute(&daemon, &rule, PlaybackStatus::Stopped).await;
        assert!(daemon.commands().is_empty());

        execute(&daemon, &rule, PlaybackStatus::Playing).await;
        assert_eq!(daemon.commands(), vec!["pause"]);
    }

    #[tokio::test]
    async fn test_stop_sequence_survives_failures() {
        let daemon = MockDaemon::new();
        *daemon.fail_commands.lock().unwrap() = true;
        *daemon.volume.lock().unwrap() = Some(55);
        let rule = AlarmRule::parse(&["daily"], "23:00", AlarmAction::Stop, None).unwrap();
        execute(&daemon, &rule, PlaybackStatus::Playing).await;
        // every step still attempted once, nothing retried
        assert_eq!(daemon.commands(), vec!["volume 0", "stop", "volume 55"]);
    }
}
