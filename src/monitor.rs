/*
 *  monitor.rs
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
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio::time::{interval, sleep, Instant, MissedTickBehavior};

#[cfg(unix)] // Only compile this block on Unix-like systems
use tokio::signal::unix::{signal, SignalKind}; // Import specific Unix signals

use crate::alarm::{AlarmScheduler, YamlAlarmSource};
use crate::config::CoreSettings;
use crate::constants::*;
use crate::display::{Alignment, BoxedDriver, DisplayCoordinator, DisplayError, ScrollEngine, Widget};
use crate::shellfm::DaemonClient;

type SharedDriver = Arc<Mutex<BoxedDriver>>;

/// Asynchronously waits for a SIGINT, SIGTERM, or SIGHUP signal.
#[cfg(unix)]
async fn signal_handler() -> Result<(), std::io::Error> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT received. Initiating graceful shutdown.");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received. Initiating graceful shutdown.");
        }
        _ = sighup.recv() => {
            info!("SIGHUP received. Initiating graceful shutdown.");
        }
    }
    Ok(())
}

#[cfg(not(unix))]
async fn signal_handler() -> Result<(), std::io::Error> {
    tokio::signal::ctrl_c().await?;
    info!("Ctrl-C received. Initiating graceful shutdown.");
    Ok(())
}

async fn shutdown_requested() {
    if let Err(e) = signal_handler().await {
        warn!("Signal handlers unavailable ({}), waiting on Ctrl-C only", e);
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Run until SIGINT, SIGTERM or SIGHUP, then say goodbye on the panel
pub async fn run<C: DaemonClient>(settings: CoreSettings, client: C, driver: BoxedDriver) -> Result<(), DisplayError> {
    run_until(settings, client, driver, shutdown_requested()).await
}

/// Start every task, wait for `shutdown`, stop them and put up the goodbye screen
pub async fn run_until<C, F>(settings: CoreSettings, client: C, driver: BoxedDriver, shutdown: F) -> Result<(), DisplayError>
where
    C: DaemonClient,
    F: Future<Output = ()>,
{
    let coordinator = DisplayCoordinator::new(settings.backlight_timeout)?;
    let (rows, cols) = driver.dimensions();
    coordinator.check_fits(rows, cols).await?;

    let driver: SharedDriver = Arc::new(Mutex::new(driver));
    let client = Arc::new(client);

    // polled from here on so the signal handlers are live during the splash
    tokio::pin!(shutdown);
    if settings.splash {
        tokio::select! {
            _ = &mut shutdown => {
                goodbye(&driver).await;
                info!("Bye!");
                return Ok(());
            }
            _ = splash(&driver) => {}
        }
    }

    let mut tasks = JoinSet::new();
    tasks.spawn(poll_loop(client.clone(), coordinator.clone(), settings.poll_interval));
    tasks.spawn(countdown_loop(coordinator.clone()));
    tasks.spawn(ScrollEngine::new(settings.scroll_interval).run(coordinator.clone()));
    tasks.spawn(render_loop(driver.clone(), coordinator.clone(), settings.display_poll));
    if let Some(path) = settings.alarms.as_ref() {
        let source = YamlAlarmSource::new(path);
        info!("Alarm rules from {}", source.path().display());
        tasks.spawn(AlarmScheduler::new(source).run(client.clone(), coordinator.clone(), settings.alarm_check));
    }
    info!(
        "Watching shell-fm at {}:{} every {:?}",
        settings.host, settings.port, settings.poll_interval
    );

    tokio::select! {
        _ = &mut shutdown => {}
        Some(ended) = tasks.join_next() => {
            // none of the loops return on their own
            error!("Display task stopped unexpectedly: {:?}", ended.err());
        }
    }

    tasks.abort_all();
    while tasks.join_next().await.is_some() {}

    goodbye(&driver).await;
    info!("Bye!");
    Ok(())
}

async fn poll_loop<C: DaemonClient>(client: Arc<C>, coordinator: DisplayCoordinator, every: Duration) {
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let sample = client.query().await;
        coordinator.apply_sample(sample).await;
    }
}

async fn countdown_loop(coordinator: DisplayCoordinator) {
    let mut ticker = interval(Duration::from_millis(COUNTDOWN_MS));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        coordinator.countdown().await;
    }
}

/// Time since `last`, moving `last` up to now
fn lap(last: &mut Instant) -> Duration {
    let now = Instant::now();
    let elapsed = now.duration_since(*last);
    *last = now;
    elapsed
}

async fn render_loop(driver: SharedDriver, coordinator: DisplayCoordinator, every: Duration) {
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last = Instant::now();
    loop {
        ticker.tick().await;
        // skipped ticks still count against the backlight
        let elapsed = lap(&mut last);
        let mut driver = driver.lock().await;
        coordinator.render_pass(&mut **driver, elapsed).await;
    }
}

fn centered(text: &str, row: u8, cols: u8) -> Option<String> {
    Widget::new("line", (row, 1), cols as usize)
        .ok()
        .map(|w| w.align(Alignment::Center).with_value(text).peek())
}

fn logged(result: Result<(), DisplayError>, what: &str) {
    if let Err(e) = result {
        debug!("{} failed: {}", what, e);
    }
}

async fn splash(driver: &SharedDriver) {
    {
        let mut d = driver.lock().await;
        let cols = d.dimensions().1;
        logged(d.clear(), "splash clear");
        logged(d.set_backlight(true), "splash backlight");
        for (row, text) in [(2, SPLASH_TITLE), (3, SPLASH_CREDIT)] {
            if let Some(line) = centered(text, row, cols) {
                logged(d.write_text(row, 1, &line), "splash text");
            }
        }
    }
    sleep(Duration::from_secs(SPLASH_SECS)).await;
    let mut d = driver.lock().await;
    logged(d.clear(), "splash clear");
    // the backlight controller starts dark, match it
    logged(d.set_backlight(false), "splash backlight");
}

/// Best effort: clear, centred goodbye, backlight off
async fn goodbye(driver: &SharedDriver) {
    let mut d = driver.lock().await;
    let cols = d.dimensions().1;
    logged(d.clear(), "goodbye clear");
    if let Some(line) = centered(GOODBYE_TEXT, GOODBYE_ROW, cols) {
        logged(d.write_text(GOODBYE_ROW, 1, &line), "goodbye text");
    }
    logged(d.set_backlight(false), "goodbye backlight");
}
