// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use chrono::NaiveDateTime;
use structopt::StructOpt;

use helio_movie::channel::Channel;
use helio_movie::config::Config;
use helio_movie::movie::*;
use helio_movie::time::parse_timestamp;

/// Make a movie for each channel with ffmpeg, then tile them into a grid.
///
/// Use the same --start and --base-dir as given to helio-get-png. Movies are
/// written to <out-dir>/<start>-<end>/.
#[derive(StructOpt, Debug)]
#[structopt(name = "helio-mk-movie")]
struct Opts {
    /// The start of the run the frames were downloaded for.
    #[structopt(short, long, parse(try_from_str = parse_timestamp))]
    start: NaiveDateTime,

    /// The end of the movie.
    #[structopt(short, long, parse(try_from_str = parse_timestamp))]
    end: NaiveDateTime,

    /// The channels to use, in tiling order (column by column). 3x3 needs
    /// exactly 9 and 2x2 exactly 4.
    #[structopt(short, long)]
    channels: Option<Vec<Channel>>,

    /// The directory the frames were downloaded to.
    #[structopt(short, long, parse(from_os_str))]
    base_dir: Option<PathBuf>,

    /// The directory movies are written to.
    #[structopt(short, long, parse(from_os_str))]
    out_dir: Option<PathBuf>,

    /// "3x3", "2x2", or anything else for the individual movies only.
    #[structopt(short, long, default_value = "3x3")]
    mode: GridMode,

    /// Use the original frames for every channel rather than the timestamped
    /// ones made by helio-timestamp.
    #[structopt(long)]
    no_timestamp: bool,

    /// The channel that was timestamped.
    #[structopt(long)]
    stamped_channel: Option<Channel>,

    /// Print the ffmpeg commands instead of running them.
    #[structopt(short = "n", long)]
    dry_run: bool,

    /// A RON file overriding the default settings.
    #[structopt(long, parse(from_os_str))]
    config: Option<PathBuf>,
}

fn main() -> Result<(), anyhow::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let opts = Opts::from_args();

    let config = Config::load(opts.config.as_deref())?;
    let req = MovieRequest {
        start: opts.start,
        end: opts.end,
        channels: opts.channels.unwrap_or(config.channels),
        base_dir: opts.base_dir.unwrap_or(config.base_dir),
        out_dir: opts.out_dir.unwrap_or(config.out_dir),
        mode: opts.mode,
        timestamp: !opts.no_timestamp,
        stamped_channel: opts.stamped_channel.unwrap_or(config.stamped_channel),
    };

    if opts.dry_run {
        let plan = plan_movies(&req)?;
        for job in plan.jobs() {
            println!("{}", command_line(config.ffmpeg.as_os_str(), &job.args));
        }
        return Ok(());
    }

    let plan = make_movies(&req, &Ffmpeg::new(&config.ffmpeg))?;
    match &plan.panel {
        Some(p) => println!("Wrote {}", p.output.display()),
        None => println!(
            "Wrote {} movies to {}",
            plan.individual.len(),
            plan.movie_dir.join("individual").display()
        ),
    }
    Ok(())
}
