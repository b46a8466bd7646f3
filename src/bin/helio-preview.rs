// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDateTime;
use image::imageops::FilterType;
use structopt::StructOpt;

use helio_movie::channel::Channel;
use helio_movie::config::Config;
use helio_movie::coords::{CropWindow, PREVIEW_SIZE_PX};
use helio_movie::fetch::helioviewer::Helioviewer;
use helio_movie::fetch::{FrameRequest, ImageSource};
use helio_movie::run::frame_file_name;
use helio_movie::time::parse_timestamp;

/// Download a full-disk preview image, for picking the centre of a region of
/// interest.
///
/// Open the preview in any image viewer and note the pixel coordinates of
/// your target; pass them to helio-get-png as --x-center and --y-center with
/// the same start time. The target drifts with solar rotation, so pick again
/// if the start time changes.
#[derive(StructOpt, Debug)]
#[structopt(name = "helio-preview")]
struct Opts {
    /// The time of the preview, ideally the start of the run.
    #[structopt(short, long, parse(try_from_str = parse_timestamp))]
    time: NaiveDateTime,

    /// A channel in which the target is visible.
    #[structopt(short, long, default_value = "171")]
    channel: Channel,

    /// Where to save the preview.
    #[structopt(short, long, parse(from_os_str), default_value = ".")]
    out_dir: PathBuf,

    /// A RON file overriding the default settings.
    #[structopt(long, parse(from_os_str))]
    config: Option<PathBuf>,
}

fn main() -> Result<(), anyhow::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let opts = Opts::from_args();
    let config = Config::load(opts.config.as_deref())?;

    std::fs::create_dir_all(&opts.out_dir)?;
    let source = Helioviewer::new(&config.api_url, config.timeout())?;
    let req = FrameRequest {
        instant: opts.time,
        channel: opts.channel,
        crop: CropWindow::full_disk(),
        image_scale: config.image_scale,
    };
    let bytes = source.fetch(&req)?;

    // Resize so the pixel coordinates line up with the crop conversion.
    let size = PREVIEW_SIZE_PX as u32;
    let preview = image::load_from_memory(&bytes)
        .context("Could not decode the preview")?
        .resize_exact(size, size, FilterType::Triangle);
    let path = opts.out_dir.join(frame_file_name(opts.channel, &opts.time));
    preview
        .save(&path)
        .with_context(|| format!("Could not save {}", path.display()))?;

    println!("{}", path.display());
    let (x_min, y_min, x_max, y_max) = config.crop_window().preview_bounds(config.image_scale);
    println!(
        "The configured crop window covers x {:.0}..{:.0}, y {:.0}..{:.0} on this preview",
        x_min, x_max, y_min, y_max
    );
    Ok(())
}
