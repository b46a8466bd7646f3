// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use chrono::NaiveDateTime;
use log::info;
use structopt::{clap::AppSettings, StructOpt};

use helio_movie::channel::Channel;
use helio_movie::config::Config;
use helio_movie::fetch::helioviewer::Helioviewer;
use helio_movie::fetch::{fetch_frames, FetchParams};
use helio_movie::run::{ResumeToken, RunOrganizer};
use helio_movie::time::{expand_range, parse_timestamp, Cadence};

/// Download cropped PNG frames of a region of interest from Helioviewer, for
/// every requested channel over a time range.
///
/// Frames are written to <base-dir>/<start date>/<channel>/. If a download
/// dies part way through, run again with the same --start and the
/// --skip-days/--skip-hours printed with the error; the new frames go into
/// the same directory.
#[derive(StructOpt, Debug)]
#[structopt(name = "helio-get-png", global_settings = &[AppSettings::ColoredHelp, AppSettings::ArgRequiredElseHelp])]
struct Opts {
    /// The start of the run, e.g. "2015/01/17 07:00:00" or 2015-01-17 (UTC).
    #[structopt(short, long, parse(try_from_str = parse_timestamp))]
    start: NaiveDateTime,

    /// The end of the run, in the same format as --start.
    #[structopt(short, long, parse(try_from_str = parse_timestamp))]
    end: NaiveDateTime,

    /// The channels to download (e.g. -c 171 304 hmi). Defaults to the
    /// config's channel list.
    #[structopt(short, long)]
    channels: Option<Vec<Channel>>,

    /// The directory the run directory is made in.
    #[structopt(short, long, parse(from_os_str))]
    base_dir: Option<PathBuf>,

    /// Centre x of the region, in pixels of the preview made by
    /// helio-preview.
    #[structopt(short = "x", long)]
    x_center: Option<f64>,

    /// Centre y of the region, in pixels of the preview made by
    /// helio-preview.
    #[structopt(short = "y", long)]
    y_center: Option<f64>,

    /// Width of each frame [pixels].
    #[structopt(long)]
    width: Option<u32>,

    /// Height of each frame [pixels].
    #[structopt(long)]
    height: Option<u32>,

    /// Number of days to skip from the start time when resuming.
    #[structopt(long, default_value = "0")]
    skip_days: i64,

    /// Number of hours to skip from the start time when resuming.
    #[structopt(long, default_value = "0")]
    skip_hours: i64,

    /// How often to take a frame: "daily", or a number of seconds (AIA
    /// images are available every 12 seconds).
    #[structopt(long, default_value = "daily")]
    cadence: Cadence,

    /// How many times to retry a failed frame before giving up.
    #[structopt(long)]
    retries: Option<u32>,

    /// A RON file overriding the default settings.
    #[structopt(long, parse(from_os_str))]
    config: Option<PathBuf>,

    /// Don't draw a progress bar.
    #[structopt(long)]
    no_progress: bool,
}

fn main() -> Result<(), anyhow::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let opts = Opts::from_args();

    let mut config = Config::load(opts.config.as_deref())?;
    if let Some(c) = opts.channels {
        config.channels = c;
    }
    if let Some(b) = opts.base_dir {
        config.base_dir = b;
    }
    if let Some(x) = opts.x_center {
        config.x_center_px = x;
    }
    if let Some(y) = opts.y_center {
        config.y_center_px = y;
    }
    if let Some(w) = opts.width {
        config.width = w;
    }
    if let Some(h) = opts.height {
        config.height = h;
    }
    if let Some(r) = opts.retries {
        config.retries = r;
    }

    // Sanity checks. Everything is validated before anything is fetched.
    anyhow::ensure!(!config.channels.is_empty(), "No channels were specified.");
    anyhow::ensure!(
        config.width > 0 && config.height > 0,
        "The frame width and height must be bigger than 0."
    );
    let token = ResumeToken::new(opts.skip_days, opts.skip_hours)?;
    let effective_start = token.effective_start(opts.start)?;
    let instants = expand_range(effective_start, opts.end, opts.cadence)?;
    if !token.is_fresh() {
        info!("Resuming from {} ({})", effective_start, token);
    }

    let organizer = RunOrganizer::resumed(&config.base_dir, effective_start, token)?;
    let source = Helioviewer::new(&config.api_url, config.timeout())?;
    let params = FetchParams {
        original_start: opts.start,
        crop: config.crop_window(),
        image_scale: config.image_scale,
        retries: config.retries,
        retry_delay: config.retry_delay(),
        show_progress: !opts.no_progress,
    };

    let summary = fetch_frames(&source, &organizer, &instants, &config.channels, &params)?;
    println!(
        "Wrote {} frames to {}",
        summary.written.len(),
        organizer.run_dir().display()
    );
    Ok(())
}
