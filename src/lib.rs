// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

pub mod channel;
pub mod config;
pub mod coords;
pub mod fetch;
pub mod movie;
pub mod run;
pub mod stamp;
pub mod time;

/// Arcseconds per pixel requested from Helioviewer for every frame.
pub const IMAGE_SCALE: f64 = 0.6;
