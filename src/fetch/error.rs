// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
 * Error handling for frame downloads.
 */

use std::path::PathBuf;

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::channel::Channel;
use crate::run::{ResumeToken, RunError};

/// A failure of the image source. These aren't classified any further; all
/// of them abort a run.
#[derive(Error, Debug)]
pub enum SourceError {
    /// An error associated with the reqwest crate (network errors and
    /// timeouts).
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("Image service responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Image service returned {0}")]
    NotAnImage(String),
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to fetch {channel} at {instant}: {source}\nFrames already written were kept; resume with {resume}")]
    Source {
        channel: Channel,
        instant: NaiveDateTime,
        resume: ResumeToken,
        source: SourceError,
    },

    #[error("Could not write frame {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{0}")]
    Run(#[from] RunError),
}
