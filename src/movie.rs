// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
 * Turning downloaded frames into movies with ffmpeg.
 *
 * A movie is made for each channel, then (for the grid modes) the channel
 * movies are tiled into one panel movie. Tiles fill the grid column by
 * column: with 3x3 the first three channels are the left column, top to
 * bottom.
 */

use std::convert::Infallible;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;

use chrono::NaiveDateTime;
use itertools::Itertools;
use log::{debug, info};
use thiserror::Error;

use crate::channel::Channel;
use crate::run::RunOrganizer;
use crate::stamp::list_frames;
use crate::time::{movie_span_name, TimeError};

#[derive(Error, Debug)]
pub enum MovieError {
    #[error("The {mode} mode needs exactly {expected} channels, but {got} were given")]
    WrongChannelCount {
        mode: GridMode,
        expected: usize,
        got: usize,
    },

    #[error("No channels were given")]
    NoChannels,

    #[error("No frames to encode in {0}")]
    NoFrames(PathBuf),

    #[error("Could not run {program}: {source}")]
    EncoderSpawn {
        program: String,
        source: std::io::Error,
    },

    #[error("Encoder exited with {status}: {command}")]
    EncoderFailed { command: String, status: String },

    #[error("{0}")]
    Time(#[from] TimeError),

    /// An IO error.
    #[error("{0}")]
    IO(#[from] std::io::Error),
}

/// How channel movies are combined.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridMode {
    /// Nine channels tiled three by three.
    ThreeByThree,
    /// Four channels tiled two by two.
    TwoByTwo,
    /// Only the individual channel movies.
    Single,
}

impl GridMode {
    /// The number of tiles along each side of the grid, or `None` if no grid
    /// is made.
    pub fn side(self) -> Option<usize> {
        match self {
            GridMode::ThreeByThree => Some(3),
            GridMode::TwoByTwo => Some(2),
            GridMode::Single => None,
        }
    }

    pub fn check_channel_count(self, got: usize) -> Result<(), MovieError> {
        if got == 0 {
            return Err(MovieError::NoChannels);
        }
        match self.side() {
            Some(n) if n * n != got => Err(MovieError::WrongChannelCount {
                mode: self,
                expected: n * n,
                got,
            }),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for GridMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridMode::ThreeByThree => write!(f, "3x3"),
            GridMode::TwoByTwo => write!(f, "2x2"),
            GridMode::Single => write!(f, "1x1"),
        }
    }
}

/// Anything that isn't "3x3" or "2x2" means only the individual movies are
/// made.
impl FromStr for GridMode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "3x3" => GridMode::ThreeByThree,
            "2x2" => GridMode::TwoByTwo,
            _ => GridMode::Single,
        })
    }
}

/// The ffmpeg filter graph that tiles `n * n` inputs into an `n` by `n`
/// grid, labelling the output `[v]`.
pub fn grid_filter(n: usize) -> String {
    let columns = (0..n).map(|col| {
        format!(
            "{}vstack=inputs={}[col{}]",
            (0..n).map(|row| format!("[{}:v]", col * n + row)).join(""),
            n,
            col
        )
    });
    let stack = format!(
        "{}hstack=inputs={}[v]",
        (0..n).map(|col| format!("[col{}]", col)).join(""),
        n
    );
    columns.chain(std::iter::once(stack)).join(";")
}

/// What to make a movie of.
#[derive(Clone, Debug)]
pub struct MovieRequest {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub channels: Vec<Channel>,
    /// The directory the frames were downloaded to (the parent of the run
    /// directories).
    pub base_dir: PathBuf,
    /// Where the movie directory is made.
    pub out_dir: PathBuf,
    pub mode: GridMode,
    /// Use the timestamped frames for `stamped_channel`.
    pub timestamp: bool,
    pub stamped_channel: Channel,
}

/// A single encoder invocation.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodeJob {
    /// The frame directory encoded, if this job reads frames.
    pub frames: Option<PathBuf>,
    pub args: Vec<OsString>,
    pub output: PathBuf,
}

/// Everything that will be run to make a request's movies.
#[derive(Clone, Debug)]
pub struct MoviePlan {
    pub movie_dir: PathBuf,
    pub individual: Vec<EncodeJob>,
    pub panel: Option<EncodeJob>,
}

impl MoviePlan {
    pub fn jobs(&self) -> impl Iterator<Item = &EncodeJob> {
        self.individual.iter().chain(self.panel.iter())
    }
}

/// Work out the encoder commands for a request without touching the
/// filesystem.
pub fn plan_movies(req: &MovieRequest) -> Result<MoviePlan, MovieError> {
    if req.end < req.start {
        return Err(TimeError::InvalidRange {
            start: req.start,
            end: req.end,
        }
        .into());
    }
    req.mode.check_channel_count(req.channels.len())?;

    let run = RunOrganizer::new(&req.base_dir, req.start);
    let movie_dir = req.out_dir.join(movie_span_name(&req.start, &req.end));
    let individual_dir = movie_dir.join("individual");

    let individual: Vec<EncodeJob> = req
        .channels
        .iter()
        .map(|&c| {
            let stamped = req.timestamp && c == req.stamped_channel;
            let (frames, output) = if stamped {
                (
                    run.timestamped_dir(c),
                    individual_dir.join(format!("aia{}movie_timestamp.mp4", c)),
                )
            } else {
                (
                    run.channel_dir(c),
                    individual_dir.join(format!("aia{}movie.mp4", c)),
                )
            };
            let pattern = frames.join("*.png");
            let args = vec![
                OsString::from("-y"),
                "-pattern_type".into(),
                "glob".into(),
                "-i".into(),
                pattern.into_os_string(),
                "-pix_fmt".into(),
                "yuv420p".into(),
                output.clone().into_os_string(),
            ];
            EncodeJob {
                frames: Some(frames),
                args,
                output,
            }
        })
        .collect();

    let panel = req.mode.side().map(|n| {
        let output = movie_dir.join(format!("aiapanel_{}_movie.mp4", req.mode));
        let mut args = vec![OsString::from("-y")];
        for job in &individual {
            args.push("-i".into());
            args.push(job.output.clone().into_os_string());
        }
        args.push("-filter_complex".into());
        args.push(grid_filter(n).into());
        args.push("-map".into());
        args.push("[v]".into());
        args.push(output.clone().into_os_string());
        EncodeJob {
            frames: None,
            args,
            output,
        }
    });

    Ok(MoviePlan {
        movie_dir,
        individual,
        panel,
    })
}

/// Something that can run encoder jobs.
pub trait Encoder {
    fn encode(&self, job: &EncodeJob) -> Result<(), MovieError>;
}

/// Runs ffmpeg directly (not through a shell).
pub struct Ffmpeg {
    pub program: PathBuf,
}

impl Ffmpeg {
    pub fn new<T: AsRef<Path>>(program: T) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
        }
    }
}

impl Encoder for Ffmpeg {
    fn encode(&self, job: &EncodeJob) -> Result<(), MovieError> {
        let command = command_line(self.program.as_os_str(), &job.args);
        debug!("Running {}", command);
        let status = Command::new(&self.program)
            .args(&job.args)
            .status()
            .map_err(|source| MovieError::EncoderSpawn {
                program: self.program.display().to_string(),
                source,
            })?;
        if !status.success() {
            return Err(MovieError::EncoderFailed {
                command,
                status: status.to_string(),
            });
        }
        Ok(())
    }
}

/// Make the directories a plan writes into and run every job in order.
pub fn make_movies<E: Encoder + ?Sized>(
    req: &MovieRequest,
    encoder: &E,
) -> Result<MoviePlan, MovieError> {
    let plan = plan_movies(req)?;

    // Fail before encoding anything if a channel has no frames.
    for job in &plan.individual {
        if let Some(frames) = &job.frames {
            match list_frames(frames) {
                Ok(f) if !f.is_empty() => (),
                _ => return Err(MovieError::NoFrames(frames.clone())),
            }
        }
    }
    std::fs::create_dir_all(plan.movie_dir.join("individual"))?;

    for job in plan.jobs() {
        info!("Encoding {}", job.output.display());
        encoder.encode(job)?;
    }
    Ok(plan)
}

/// A copy-pasteable rendering of a command, quoting arguments the shell
/// would otherwise interpret.
pub fn command_line<S: AsRef<OsStr>>(program: &OsStr, args: &[S]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(|a| a.as_ref()))
        .map(|a| {
            let a = a.to_string_lossy();
            if a.contains(|c: char| c.is_whitespace() || "*?[];&|$\"'".contains(c)) {
                format!("'{}'", a.replace('\'', r"'\''"))
            } else {
                a.into_owned()
            }
        })
        .join(" ")
}
