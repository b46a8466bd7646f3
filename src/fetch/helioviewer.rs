// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
 * Frames from the Helioviewer "takeScreenshot" API.
 */

use std::time::Duration;

use log::trace;
use reqwest::blocking::Client;
use reqwest::StatusCode;

use super::error::SourceError;
use super::{FrameRequest, ImageSource};

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

pub struct Helioviewer {
    client: Client,
    api_url: String,
}

impl Helioviewer {
    pub fn new(api_url: &str, timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn screenshot_url(&self) -> String {
        format!("{}/takeScreenshot/", self.api_url)
    }
}

/// The query parameters of a screenshot request. `display=true` makes the
/// service respond with the image itself rather than a JSON description.
pub fn query_params(req: &FrameRequest) -> Vec<(&'static str, String)> {
    vec![
        ("date", req.instant.format("%Y-%m-%dT%H:%M:%S.000Z").to_string()),
        ("imageScale", req.image_scale.to_string()),
        ("layers", req.channel.layer()),
        ("x0", req.crop.x0.to_string()),
        ("y0", req.crop.y0.to_string()),
        ("width", req.crop.width.to_string()),
        ("height", req.crop.height.to_string()),
        ("display", "true".to_string()),
        ("watermark", "false".to_string()),
    ]
}

/// Make sure a response body is a PNG. Helioviewer reports some failures as
/// JSON with a 200 status.
pub fn check_png(bytes: &[u8]) -> Result<(), SourceError> {
    if bytes.starts_with(PNG_MAGIC) {
        return Ok(());
    }
    let what = if bytes.is_empty() {
        "an empty response".to_string()
    } else {
        let text = String::from_utf8_lossy(&bytes[..bytes.len().min(200)]);
        format!("a non-PNG response: {}", text.trim())
    };
    Err(SourceError::NotAnImage(what))
}

impl ImageSource for Helioviewer {
    fn fetch(&self, req: &FrameRequest) -> Result<Vec<u8>, SourceError> {
        let params = query_params(req);
        trace!("GET {} {:?}", self.screenshot_url(), params);
        let response = self
            .client
            .get(&self.screenshot_url())
            .query(&params)
            .send()?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().unwrap_or_default();
            return Err(SourceError::Status {
                status: status.as_u16(),
                body: body.trim().chars().take(200).collect(),
            });
        }

        let bytes = response.bytes()?.to_vec();
        check_png(&bytes)?;
        Ok(bytes)
    }
}
