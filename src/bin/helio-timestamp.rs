// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use chrono::NaiveDateTime;
use structopt::StructOpt;

use helio_movie::channel::Channel;
use helio_movie::config::Config;
use helio_movie::run::RunOrganizer;
use helio_movie::stamp::Timestamper;
use helio_movie::time::parse_timestamp;

/// Draw each frame's timestamp onto it. Every frame downloaded for the run is
/// stamped, and the stamped frames are written to
/// <base-dir>/<start date>/<channel>-timestamped/.
#[derive(StructOpt, Debug)]
#[structopt(name = "helio-timestamp")]
struct Opts {
    /// The start of the run the frames were downloaded for.
    #[structopt(short, long, parse(try_from_str = parse_timestamp))]
    start: NaiveDateTime,

    /// The end of the run.
    #[structopt(short, long, parse(try_from_str = parse_timestamp))]
    end: NaiveDateTime,

    /// The directory the frames were downloaded to.
    #[structopt(short, long, parse(from_os_str))]
    base_dir: Option<PathBuf>,

    /// The channel to timestamp. Defaults to the config's stamped channel.
    #[structopt(short, long)]
    channel: Option<Channel>,

    /// The TrueType font to draw with.
    #[structopt(short, long, parse(from_os_str))]
    font: Option<PathBuf>,

    /// Font size [pixels].
    #[structopt(long)]
    font_size: Option<f32>,

    /// A RON file overriding the default settings.
    #[structopt(long, parse(from_os_str))]
    config: Option<PathBuf>,
}

fn main() -> Result<(), anyhow::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let opts = Opts::from_args();

    let config = Config::load(opts.config.as_deref())?;
    anyhow::ensure!(
        opts.end >= opts.start,
        "The end time ({}) is before the start time ({})",
        opts.end,
        opts.start
    );
    let base_dir = opts.base_dir.unwrap_or(config.base_dir);
    let channel = opts.channel.unwrap_or(config.stamped_channel);
    let font = opts.font.unwrap_or(config.font_path);
    let font_size = opts.font_size.unwrap_or(config.font_size);

    let stamper = Timestamper::new(&font, font_size)?;
    let organizer = RunOrganizer::new(&base_dir, opts.start);
    let written = stamper.stamp_channel(&organizer, channel)?;
    println!(
        "Timestamped {} frames into {}",
        written.len(),
        organizer.timestamped_dir(channel).display()
    );
    Ok(())
}
