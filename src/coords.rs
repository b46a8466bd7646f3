// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
 * Crop windows, and converting coordinates picked on a preview image into
 * the arcsecond offsets Helioviewer expects.
 */

use serde::Deserialize;

/// Width (and height) in pixels of the full-disk preview that coordinates
/// are picked from.
pub const PREVIEW_SIZE_PX: f64 = 1200.0;

/// Arcseconds per pixel of a full-resolution (4096 px) AIA image.
pub const AIA_ARCSEC_PER_PX: f64 = 0.600714;

/// Width in pixels of a full-resolution AIA image.
pub const AIA_SIZE_PX: f64 = 4096.0;

/// Convert a coordinate on the preview image into an offset from disk centre
/// in arcseconds.
pub fn preview_px_to_arcsec(px: f64) -> f64 {
    (px - PREVIEW_SIZE_PX / 2.0) * AIA_ARCSEC_PER_PX * AIA_SIZE_PX / PREVIEW_SIZE_PX
}

/// The inverse of [preview_px_to_arcsec].
pub fn arcsec_to_preview_px(arcsec: f64) -> f64 {
    arcsec * PREVIEW_SIZE_PX / (AIA_ARCSEC_PER_PX * AIA_SIZE_PX) + PREVIEW_SIZE_PX / 2.0
}

/// The region requested for every frame of a run.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct CropWindow {
    /// Centre x offset from disk centre [arcsec]
    pub x0: f64,
    /// Centre y offset from disk centre [arcsec]
    pub y0: f64,
    /// [pixels]
    pub width: u32,
    /// [pixels]
    pub height: u32,
}

impl CropWindow {
    /// A crop window centred on a point picked from the preview image.
    pub fn from_preview_px(x_px: f64, y_px: f64, width: u32, height: u32) -> Self {
        Self {
            x0: preview_px_to_arcsec(x_px),
            y0: preview_px_to_arcsec(y_px),
            width,
            height,
        }
    }

    /// Where the window lies on the preview image, as
    /// `(x_min, y_min, x_max, y_max)` in preview pixels, when frames are
    /// requested at `image_scale` [arcsec per pixel].
    pub fn preview_bounds(&self, image_scale: f64) -> (f64, f64, f64, f64) {
        let half_width = f64::from(self.width) * image_scale / 2.0;
        let half_height = f64::from(self.height) * image_scale / 2.0;
        (
            arcsec_to_preview_px(self.x0 - half_width),
            arcsec_to_preview_px(self.y0 - half_height),
            arcsec_to_preview_px(self.x0 + half_width),
            arcsec_to_preview_px(self.y0 + half_height),
        )
    }

    /// The whole disk, as used for previews.
    pub fn full_disk() -> Self {
        Self {
            x0: 0.0,
            y0: 0.0,
            width: AIA_SIZE_PX as u32,
            height: AIA_SIZE_PX as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::*;

    #[test]
    fn test_preview_conversion() {
        assert_abs_diff_eq!(preview_px_to_arcsec(600.0), 0.0);
        // The default region of interest.
        assert_abs_diff_eq!(preview_px_to_arcsec(941.39), 699.9987, epsilon = 1e-3);
        assert_abs_diff_eq!(preview_px_to_arcsec(746.31), 299.9995, epsilon = 1e-3);
        assert_abs_diff_eq!(
            arcsec_to_preview_px(preview_px_to_arcsec(123.4)),
            123.4,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_crop_windows() {
        let w = CropWindow::from_preview_px(600.0, 0.0, 650, 400);
        assert_abs_diff_eq!(w.x0, 0.0);
        assert_abs_diff_eq!(w.y0, -600.0 * AIA_ARCSEC_PER_PX * AIA_SIZE_PX / PREVIEW_SIZE_PX);
        assert_eq!((w.width, w.height), (650, 400));

        // The default window is centred where it was picked, and is 650 px
        // at 0.6 arcsec per pixel wide.
        let w = CropWindow::from_preview_px(941.39, 746.31, 650, 400);
        let (x_min, y_min, x_max, y_max) = w.preview_bounds(0.6);
        assert_abs_diff_eq!((x_min + x_max) / 2.0, 941.39, epsilon = 1e-9);
        assert_abs_diff_eq!((y_min + y_max) / 2.0, 746.31, epsilon = 1e-9);
        assert_abs_diff_eq!(x_max - x_min, 190.2033, epsilon = 1e-3);
        assert_abs_diff_eq!(y_max - y_min, 117.0482, epsilon = 1e-3);

        let f = CropWindow::full_disk();
        assert_eq!((f.width, f.height), (4096, 4096));
    }
}
