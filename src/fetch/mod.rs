// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
 * Downloading frames into a run directory.
 */

pub mod error;
pub mod helioviewer;

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDateTime;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};

use crate::channel::Channel;
use crate::coords::CropWindow;
use crate::run::{ResumeToken, RunOrganizer};
use crate::IMAGE_SCALE;
use error::*;

/// Everything needed to ask for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameRequest {
    pub instant: NaiveDateTime,
    pub channel: Channel,
    pub crop: CropWindow,
    /// [arcsec per pixel]
    pub image_scale: f64,
}

/// Somewhere frames come from.
pub trait ImageSource {
    /// Get the encoded PNG for a single frame.
    fn fetch(&self, req: &FrameRequest) -> Result<Vec<u8>, SourceError>;
}

/// Settings that are constant over a run.
#[derive(Clone, Debug)]
pub struct FetchParams {
    /// The start of the run as first requested, without any skip. Only used
    /// to tell the user how to resume.
    pub original_start: NaiveDateTime,
    pub crop: CropWindow,
    pub image_scale: f64,
    /// How many extra attempts each frame gets.
    pub retries: u32,
    pub retry_delay: Duration,
    pub show_progress: bool,
}

impl FetchParams {
    pub fn new(original_start: NaiveDateTime, crop: CropWindow) -> Self {
        Self {
            original_start,
            crop,
            image_scale: IMAGE_SCALE,
            retries: 0,
            retry_delay: Duration::from_secs(0),
            show_progress: false,
        }
    }
}

#[derive(Debug, Default)]
pub struct FetchSummary {
    /// Every frame written by this invocation, in the order it was fetched.
    pub written: Vec<PathBuf>,
    /// Channels whose last frame already existed, and so were not fetched
    /// at all.
    pub skipped_channels: Vec<Channel>,
}

/// Fetch a frame for every instant in every channel and save them in the
/// run directory.
///
/// Instants are the outer loop, so an interrupted run has every channel
/// complete up to the same instant. The first failure aborts the rest of the
/// run; frames already saved are left where they are, and the error carries
/// the [ResumeToken] that restarts from the failed instant.
pub fn fetch_frames<S: ImageSource + ?Sized>(
    source: &S,
    organizer: &RunOrganizer,
    instants: &[NaiveDateTime],
    channels: &[Channel],
    params: &FetchParams,
) -> Result<FetchSummary, FetchError> {
    organizer.prepare(channels)?;

    let mut summary = FetchSummary::default();
    let mut todo = Vec::with_capacity(channels.len());
    for &c in channels {
        let done = instants
            .last()
            .map(|t| organizer.frame_path(c, t).is_file())
            .unwrap_or(false);
        if done {
            info!(
                "Skipping {}; its last frame already exists in {}",
                c,
                organizer.channel_dir(c).display()
            );
            summary.skipped_channels.push(c);
        } else {
            todo.push(c);
        }
    }

    let num_frames = (instants.len() * todo.len()) as u64;
    info!(
        "Fetching {} frames into {}",
        num_frames,
        organizer.run_dir().display()
    );
    let pb = if params.show_progress {
        ProgressBar::new(num_frames)
    } else {
        ProgressBar::hidden()
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg}{percent}% [{bar:34.cyan/blue}] {pos}/{len} frames [{elapsed_precise}<{eta_precise}]")
            .progress_chars("#>-"),
    );

    for instant in instants {
        for &channel in &todo {
            let req = FrameRequest {
                instant: *instant,
                channel,
                crop: params.crop,
                image_scale: params.image_scale,
            };
            let bytes = fetch_with_retries(source, &req, params).map_err(|source| {
                pb.abandon();
                FetchError::Source {
                    channel,
                    instant: *instant,
                    resume: ResumeToken::resuming_at(params.original_start, *instant),
                    source,
                }
            })?;

            let path = organizer.frame_path(channel, instant);
            write_frame(&path, &bytes).map_err(|e| {
                pb.abandon();
                e
            })?;
            debug!("Wrote {} ({} bytes)", path.display(), bytes.len());
            summary.written.push(path);
            pb.inc(1);
        }
    }
    pb.finish();

    Ok(summary)
}

fn fetch_with_retries<S: ImageSource + ?Sized>(
    source: &S,
    req: &FrameRequest,
    params: &FetchParams,
) -> Result<Vec<u8>, SourceError> {
    let mut attempt = 0;
    loop {
        match source.fetch(req) {
            Ok(bytes) => return Ok(bytes),
            Err(e) if attempt < params.retries => {
                attempt += 1;
                warn!(
                    "{} at {} failed ({}); retry {}/{} in {} sec",
                    req.channel,
                    req.instant,
                    e,
                    attempt,
                    params.retries,
                    params.retry_delay.as_secs()
                );
                std::thread::sleep(params.retry_delay);
            }
            Err(e) => return Err(e),
        }
    }
}

/// Write via a temporary file in the same directory, so a frame only ever
/// appears under its final name once it is complete.
fn write_frame(path: &std::path::Path, bytes: &[u8]) -> Result<(), FetchError> {
    let write_err = |source| FetchError::Write {
        path: path.to_path_buf(),
        source,
    };
    let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
