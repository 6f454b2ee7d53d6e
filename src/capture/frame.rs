use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use image::{codecs::jpeg::JpegEncoder, ExtendedColorType, ImageEncoder};
use serde::{Deserialize, Serialize};

use super::device::RawFrame;
use super::error::CaptureError;

pub const JPEG_MIME: &str = "image/jpeg";
const DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

/// A frozen camera frame, encoded so the UI can drop it straight into an
/// `<img src>` or hand it to a classifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CapturedFrame {
    pub width: u32,
    pub height: u32,
    pub data_uri: String,
    pub captured_at: DateTime<Utc>,
}

impl CapturedFrame {
    /// Encodes `raw` as JPEG at its own resolution.
    pub fn encode(raw: &RawFrame, quality: u8) -> Result<Self, CaptureError> {
        if !raw.is_well_formed() {
            return Err(CaptureError::InvalidFrame {
                width: raw.width,
                height: raw.height,
                len: raw.rgba.len(),
            });
        }

        // JPEG has no alpha channel.
        let mut rgb = Vec::with_capacity(raw.pixel_count() * 3);
        for px in raw.rgba.chunks_exact(4) {
            rgb.extend_from_slice(&px[..3]);
        }

        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, quality.clamp(1, 100)).write_image(
            &rgb,
            raw.width,
            raw.height,
            ExtendedColorType::Rgb8,
        )?;

        let mut data_uri = String::with_capacity(DATA_URI_PREFIX.len() + jpeg.len() * 4 / 3 + 4);
        data_uri.push_str(DATA_URI_PREFIX);
        BASE64_STANDARD.encode_string(&jpeg, &mut data_uri);

        Ok(Self {
            width: raw.width,
            height: raw.height,
            data_uri,
            captured_at: Utc::now(),
        })
    }

    pub fn mime_type(&self) -> &'static str {
        JPEG_MIME
    }

    /// Decodes the data URI back to raw JPEG bytes.
    pub fn jpeg_bytes(&self) -> anyhow::Result<Vec<u8>> {
        let payload = self
            .data_uri
            .strip_prefix(DATA_URI_PREFIX)
            .ok_or_else(|| anyhow::anyhow!("frame is not a base64 JPEG data URI"))?;
        Ok(BASE64_STANDARD.decode(payload)?)
    }
}
