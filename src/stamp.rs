// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
 * Drawing each frame's timestamp onto it.
 *
 * The timestamp comes from the frame's file name, so only files named like
 * "2015_01_17_07_00_00_AIA_171.png" are touched. Stamped copies are written
 * to a "<channel>-timestamped" directory next to the channel directory; the
 * original frames are never modified. Every frame in the channel directory is
 * stamped.
 */

use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use chrono::NaiveDateTime;
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use log::{debug, info, warn};
use thiserror::Error;

use crate::channel::Channel;
use crate::run::RunOrganizer;
use crate::time::{display_stamp, parse_frame_stamp};

/// Distance of the text from the left edge [pixels].
const TEXT_X: i32 = 20;
/// Distance of the top of the text from the bottom edge [pixels].
const TEXT_FROM_BOTTOM: i32 = 50;

#[derive(Error, Debug)]
pub enum StampError {
    #[error("Could not read font file {path}: {source}")]
    FontRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path} is not a usable TrueType/OpenType font")]
    BadFont { path: PathBuf },

    #[error("The font size must be positive (got {0})")]
    BadFontSize(f32),

    #[error("Frame directory {0} does not exist; have the frames been downloaded?")]
    NoFrames(PathBuf),

    #[error("Could not process {path}: {source}")]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("{0}")]
    Glob(#[from] globset::Error),

    /// An IO error.
    #[error("{0}")]
    IO(#[from] std::io::Error),
}

pub struct Timestamper {
    font: FontVec,
    scale: PxScale,
}

impl Timestamper {
    pub fn new<T: AsRef<Path>>(font_path: T, font_size: f32) -> Result<Self, StampError> {
        let path = font_path.as_ref();
        if !(font_size > 0.0) {
            return Err(StampError::BadFontSize(font_size));
        }
        let data = std::fs::read(path).map_err(|source| StampError::FontRead {
            path: path.to_path_buf(),
            source,
        })?;
        let font = FontVec::try_from_vec(data).map_err(|_| StampError::BadFont {
            path: path.to_path_buf(),
        })?;
        Ok(Self {
            font,
            scale: PxScale::from(font_size),
        })
    }

    /// Draw the timestamp in white near the bottom-left corner.
    pub fn stamp(&self, img: &mut RgbaImage, instant: &NaiveDateTime) {
        let y = img.height() as i32 - TEXT_FROM_BOTTOM;
        draw_text_mut(
            img,
            Rgba([255, 255, 255, 255]),
            TEXT_X,
            y,
            self.scale,
            &self.font,
            &display_stamp(instant),
        );
    }

    /// Stamp a single frame file, writing the result to `output`.
    pub fn stamp_file(
        &self,
        input: &Path,
        output: &Path,
        instant: &NaiveDateTime,
    ) -> Result<(), StampError> {
        let mut img = image::open(input)
            .map_err(|source| StampError::Image {
                path: input.to_path_buf(),
                source,
            })?
            .to_rgba8();
        self.stamp(&mut img, instant);
        img.save(output).map_err(|source| StampError::Image {
            path: output.to_path_buf(),
            source,
        })
    }

    /// Stamp every frame of `channel` in the run. This is the same set of
    /// frames the movie is encoded from, so a stamped channel never has
    /// fewer frames than the others. Returns the paths written, sorted by
    /// name (and therefore by time).
    pub fn stamp_channel(
        &self,
        organizer: &RunOrganizer,
        channel: Channel,
    ) -> Result<Vec<PathBuf>, StampError> {
        let in_dir = organizer.channel_dir(channel);
        if !in_dir.is_dir() {
            return Err(StampError::NoFrames(in_dir));
        }
        let out_dir = organizer.timestamped_dir(channel);
        std::fs::create_dir_all(&out_dir)?;

        let frames = list_frames(&in_dir)?;
        let mut written = vec![];
        for (path, instant) in frames {
            // `list_frames` only returns paths with a file name.
            let out = match path.file_name() {
                Some(name) => out_dir.join(name),
                None => continue,
            };
            self.stamp_file(&path, &out, &instant)?;
            debug!("Stamped {}", out.display());
            written.push(out);
        }

        info!(
            "Timestamped {} frames into {}",
            written.len(),
            out_dir.display()
        );
        Ok(written)
    }
}

/// All PNG frames in a directory with their instants, sorted by file name.
/// PNGs whose names don't carry a timestamp are skipped with a warning.
pub fn list_frames(dir: &Path) -> Result<Vec<(PathBuf, NaiveDateTime)>, StampError> {
    let glob = globset::Glob::new("*.png")?.compile_matcher();
    let mut frames = vec![];
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(n) => n.to_string(),
            None => continue,
        };
        if !path.is_file() || !glob.is_match(&name) {
            continue;
        }
        match parse_frame_stamp(&name) {
            Some(instant) => frames.push((path, instant)),
            None => warn!("Ignoring {}; its name has no timestamp", path.display()),
        }
    }
    frames.sort();
    Ok(frames)
}
