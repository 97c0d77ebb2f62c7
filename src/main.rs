/*
 *  main.rs
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

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;

mod alarm;
mod backlight;
mod config;
mod constants;
mod deutils;
mod display;
mod glyphs;
mod monitor;
mod shellfm;
mod status;

use crate::config::Cli;
use crate::display::DisplayDriverFactory;
use crate::shellfm::ShellFmClient;

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

#[tokio::main] // Requires the `tokio` runtime with `macros` and `rt-multi-thread` features
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = config::load(&cli).context("loading configuration")?;

    env_logger::Builder::from_env(Env::default().default_filter_or(settings.log_level.as_str()))
        .format_timestamp_secs()
        .init();

    info!("{} - shell-fm on the front panel", env!("CARGO_PKG_NAME"));
    info!("v.{} built {}", env!("CARGO_PKG_VERSION"), BUILD_DATE);

    let glyphs = glyphs::glyph_bank(settings.glyph_dir.as_deref());
    let mut driver = DisplayDriverFactory::create(settings.driver, &settings.device, settings.baud)
        .with_context(|| format!("opening {:?} display at {}", settings.driver, settings.device.display()))?;
    DisplayDriverFactory::prepare(driver.as_mut(), &glyphs).context("preparing display")?;

    let client = ShellFmClient::new(settings.host.clone(), settings.port, settings.timeout);
    monitor::run(settings, client, driver).await?;
    Ok(())
}
