// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
 * Run directories, and where frames live inside them.
 *
 * A run is one logical movie-making session. When a long download dies part
 * way through, it is continued by re-invoking with a [ResumeToken]; the run
 * directory is always named after the original start date so that all of a
 * run's frames end up together.
 */

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDateTime};
use log::debug;
use thiserror::Error;

use crate::channel::Channel;
use crate::time::{frame_stamp, run_date_string};

#[derive(Error, Debug)]
pub enum RunError {
    #[error("Could not create run directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("The skip amount must not be negative (got {days} days, {hours} hours)")]
    NegativeSkip { days: i64, hours: i64 },

    #[error("Skipping {days} days and {hours} hours goes past the last date that can be represented")]
    SkipTooLarge { days: i64, hours: i64 },
}

/// How far into a run a resumed invocation starts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResumeToken {
    pub skip_days: i64,
    pub skip_hours: i64,
}

impl ResumeToken {
    pub fn new(skip_days: i64, skip_hours: i64) -> Result<Self, RunError> {
        if skip_days < 0 || skip_hours < 0 {
            return Err(RunError::NegativeSkip {
                days: skip_days,
                hours: skip_hours,
            });
        }
        Ok(Self {
            skip_days,
            skip_hours,
        })
    }

    /// The token that would resume a run starting at `original_start` from
    /// `instant`, rounded down to whole hours.
    pub fn resuming_at(original_start: NaiveDateTime, instant: NaiveDateTime) -> Self {
        let total_hours = (instant - original_start).num_hours().max(0);
        Self {
            skip_days: total_hours / 24,
            skip_hours: total_hours % 24,
        }
    }

    pub fn is_fresh(&self) -> bool {
        self.skip_days == 0 && self.skip_hours == 0
    }

    pub fn offset(&self) -> Result<Duration, RunError> {
        Duration::try_days(self.skip_days)
            .zip(Duration::try_hours(self.skip_hours))
            .and_then(|(d, h)| d.checked_add(&h))
            .ok_or_else(|| self.too_large())
    }

    /// Where a resumed invocation starts sampling.
    pub fn effective_start(
        &self,
        original_start: NaiveDateTime,
    ) -> Result<NaiveDateTime, RunError> {
        original_start
            .checked_add_signed(self.offset()?)
            .ok_or_else(|| self.too_large())
    }

    /// Undo [ResumeToken::effective_start].
    pub fn original_start(
        &self,
        effective_start: NaiveDateTime,
    ) -> Result<NaiveDateTime, RunError> {
        effective_start
            .checked_sub_signed(self.offset()?)
            .ok_or_else(|| self.too_large())
    }

    fn too_large(&self) -> RunError {
        RunError::SkipTooLarge {
            days: self.skip_days,
            hours: self.skip_hours,
        }
    }
}

impl fmt::Display for ResumeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "--skip-days {} --skip-hours {}",
            self.skip_days, self.skip_hours
        )
    }
}

/// The run directory name for an invocation that starts sampling at
/// `effective_start` having skipped `token` worth of time; e.g.
/// "2017-07-09".
pub fn run_dir_name(
    effective_start: NaiveDateTime,
    token: ResumeToken,
) -> Result<String, RunError> {
    Ok(run_date_string(&token.original_start(effective_start)?))
}

/// Owns the layout of a single run's output on disk.
///
/// ```text
/// <base_dir>/<YYYY-MM-DD>/<channel>/<YYYY_MM_DD_HH_MM_SS>_<label>.png
/// <base_dir>/<YYYY-MM-DD>/<channel>-timestamped/...
/// ```
#[derive(Clone, Debug)]
pub struct RunOrganizer {
    run_dir: PathBuf,
}

impl RunOrganizer {
    /// `original_start` is the start of the run as first requested, not the
    /// start of a resumed invocation.
    pub fn new<T: AsRef<Path>>(base_dir: T, original_start: NaiveDateTime) -> Self {
        Self {
            run_dir: base_dir.as_ref().join(run_date_string(&original_start)),
        }
    }

    /// Set up from a resumed invocation's start time.
    pub fn resumed<T: AsRef<Path>>(
        base_dir: T,
        effective_start: NaiveDateTime,
        token: ResumeToken,
    ) -> Result<Self, RunError> {
        Ok(Self {
            run_dir: base_dir
                .as_ref()
                .join(run_dir_name(effective_start, token)?),
        })
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    pub fn channel_dir(&self, channel: Channel) -> PathBuf {
        self.run_dir.join(channel.dir_name())
    }

    pub fn timestamped_dir(&self, channel: Channel) -> PathBuf {
        self.run_dir.join(format!("{}-timestamped", channel.dir_name()))
    }

    /// The file a frame is saved to. Distinct (channel, instant) pairs
    /// always map to distinct paths.
    pub fn frame_path(&self, channel: Channel, instant: &NaiveDateTime) -> PathBuf {
        self.channel_dir(channel).join(frame_file_name(channel, instant))
    }

    /// Create the run directory and a directory for each channel. Existing
    /// directories are left alone.
    pub fn prepare(&self, channels: &[Channel]) -> Result<&Path, RunError> {
        create_dir(&self.run_dir)?;
        for &c in channels {
            create_dir(&self.channel_dir(c))?;
        }
        Ok(&self.run_dir)
    }
}

/// e.g. "2015_01_17_07_00_00_AIA_171.png".
pub fn frame_file_name(channel: Channel, instant: &NaiveDateTime) -> String {
    format!("{}_{}.png", frame_stamp(instant), channel.file_label())
}

fn create_dir(path: &Path) -> Result<(), RunError> {
    if !path.is_dir() {
        debug!("Creating {}", path.display());
    }
    std::fs::create_dir_all(path).map_err(|source| RunError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}
