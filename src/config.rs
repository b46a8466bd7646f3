// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
 * Defaults shared by the command-line tools.
 *
 * Every tool starts from [Config::default], optionally replaced by a RON file
 * given with `--config`, and then overrides individual fields with whatever
 * was given on the command line. A config file only needs the fields that
 * differ from the defaults, e.g.
 *
 * ```text
 * (
 *     base_dir: "/data/solar",
 *     channels: [171, 304, "hmi"],
 *     font_path: "/Library/Fonts/arial.ttf",
 * )
 * ```
 */

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::channel::Channel;
use crate::coords::CropWindow;
use crate::IMAGE_SCALE;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Could not parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Where run directories are created.
    pub base_dir: PathBuf,

    /// Where movie directories are created.
    pub out_dir: PathBuf,

    /// The channels downloaded and assembled when none are given. The order
    /// is the order of the tiles in a grid movie (column by column).
    pub channels: Vec<Channel>,

    /// Centre x of the crop window, in pixels of the 1200 px preview.
    pub x_center_px: f64,

    /// Centre y of the crop window, in pixels of the 1200 px preview.
    pub y_center_px: f64,

    /// Width of every downloaded frame [pixels].
    pub width: u32,

    /// Height of every downloaded frame [pixels].
    pub height: u32,

    /// Requested image scale [arcsec per pixel].
    pub image_scale: f64,

    /// Base URL of the Helioviewer API.
    pub api_url: String,

    /// How long to wait for a single frame before giving up [seconds].
    pub timeout_secs: u64,

    /// How many times a failed frame request is retried before the run is
    /// aborted.
    pub retries: u32,

    /// Pause between retries [seconds].
    pub retry_delay_secs: u64,

    /// TrueType font used for timestamps.
    pub font_path: PathBuf,

    /// Timestamp font size [pixels].
    pub font_size: f32,

    /// The channel whose frames are timestamped. In a 3x3 grid of the
    /// default channels this is the bottom-left tile.
    pub stamped_channel: Channel,

    /// The ffmpeg executable.
    pub ffmpeg: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("solar"),
            out_dir: PathBuf::from("movies"),
            channels: vec![
                Channel::Aia94,
                Channel::Aia131,
                Channel::Aia171,
                Channel::Aia193,
                Channel::Aia211,
                Channel::Aia304,
                Channel::Aia335,
                Channel::Aia1600,
                Channel::HmiMagnetogram,
            ],
            x_center_px: 941.39,
            y_center_px: 746.31,
            width: 650,
            height: 400,
            image_scale: IMAGE_SCALE,
            api_url: "https://api.helioviewer.org/v2".to_string(),
            timeout_secs: 120,
            retries: 0,
            retry_delay_secs: 10,
            font_path: PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"),
            font_size: 30.0,
            stamped_channel: Channel::Aia171,
            ffmpeg: PathBuf::from("ffmpeg"),
        }
    }
}

impl Config {
    /// Read a RON config file. Missing fields take their default values.
    pub fn from_file<T: AsRef<Path>>(path: T) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Use the config file if there is one, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    pub fn crop_window(&self) -> CropWindow {
        CropWindow::from_preview_px(self.x_center_px, self.y_center_px, self.width, self.height)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}
