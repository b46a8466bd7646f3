// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
 * The SDO channels that can be requested from Helioviewer.
 */

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ChannelError {
    #[error("Unrecognised channel '{0}'; expected one of 94, 131, 171, 193, 211, 304, 335, 1600, 1700, 4500 or hmi")]
    Unknown(String),
}

/// An AIA wavelength band (in Angstroms) or the HMI line-of-sight
/// magnetogram.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
    Aia94,
    Aia131,
    Aia171,
    Aia193,
    Aia211,
    Aia304,
    Aia335,
    Aia1600,
    Aia1700,
    Aia4500,
    HmiMagnetogram,
}

impl Channel {
    pub const ALL: [Channel; 11] = [
        Channel::Aia94,
        Channel::Aia131,
        Channel::Aia171,
        Channel::Aia193,
        Channel::Aia211,
        Channel::Aia304,
        Channel::Aia335,
        Channel::Aia1600,
        Channel::Aia1700,
        Channel::Aia4500,
        Channel::HmiMagnetogram,
    ];

    /// The AIA wavelength in Angstroms, or `None` for the magnetogram.
    pub fn wavelength(self) -> Option<u32> {
        match self {
            Channel::Aia94 => Some(94),
            Channel::Aia131 => Some(131),
            Channel::Aia171 => Some(171),
            Channel::Aia193 => Some(193),
            Channel::Aia211 => Some(211),
            Channel::Aia304 => Some(304),
            Channel::Aia335 => Some(335),
            Channel::Aia1600 => Some(1600),
            Channel::Aia1700 => Some(1700),
            Channel::Aia4500 => Some(4500),
            Channel::HmiMagnetogram => None,
        }
    }

    /// The name used for this channel's directories and movie files, e.g.
    /// "171" or "hmi".
    pub fn dir_name(self) -> String {
        match self.wavelength() {
            Some(wl) => wl.to_string(),
            None => "hmi".to_string(),
        }
    }

    /// The Helioviewer layer string selecting this channel at full opacity.
    ///
    /// e.g. "[SDO,AIA,AIA,171,1,100]".
    pub fn layer(self) -> String {
        match self.wavelength() {
            Some(wl) => format!("[SDO,AIA,AIA,{},1,100]", wl),
            None => "[SDO,HMI,HMI,magnetogram,1,100]".to_string(),
        }
    }

    /// The suffix Helioviewer gives screenshot files of this channel, e.g.
    /// "AIA_171" or "HMI_Mag".
    pub fn file_label(self) -> String {
        match self.wavelength() {
            Some(wl) => format!("AIA_{}", wl),
            None => "HMI_Mag".to_string(),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dir_name())
    }
}

impl FromStr for Channel {
    type Err = ChannelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("hmi") {
            return Ok(Channel::HmiMagnetogram);
        }
        Channel::ALL
            .iter()
            .copied()
            .find(|c| c.wavelength().map(|wl| wl.to_string()).as_deref() == Some(s))
            .ok_or_else(|| ChannelError::Unknown(s.to_string()))
    }
}

// Config files may list channels as either numbers or strings, i.e.
// [171, 304, "hmi"].
impl<'de> Deserialize<'de> for Channel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u32),
            Text(String),
        }

        let s = match Raw::deserialize(deserializer)? {
            Raw::Number(n) => n.to_string(),
            Raw::Text(t) => t,
        };
        s.parse().map_err(de::Error::custom)
    }
}
