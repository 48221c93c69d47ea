//! Place photos
//!
//! Stored photos are raw encoded bytes. They are checked for decodability on
//! save, shrunk to square thumbnails for map callouts, and replaced by a
//! generated placeholder when a place has none.

use crate::error::{Error, Result};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

const PLACEHOLDER_SIZE: u32 = 64;
const PLACEHOLDER_COLOR: Rgba<u8> = Rgba([0xC8, 0xC8, 0xCC, 0xFF]);

/// Decode the bytes, failing with `ImageDecode` if they are not a raster image
pub fn validate(bytes: &[u8]) -> Result<ImageFormat> {
    let format = image::guess_format(bytes)
        .map_err(|e| Error::ImageDecode(format!("unrecognized image data: {}", e)))?;
    image::load_from_memory_with_format(bytes, format)
        .map_err(|e| Error::ImageDecode(e.to_string()))?;
    Ok(format)
}

/// MIME type of encoded image bytes
pub fn mime_type(bytes: &[u8]) -> &'static str {
    image::guess_format(bytes)
        .map(|f| f.to_mime_type())
        .unwrap_or("application/octet-stream")
}

/// Neutral placeholder shown for places without a photo
pub fn placeholder_png() -> Result<Vec<u8>> {
    let img = RgbaImage::from_pixel(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE, PLACEHOLDER_COLOR);
    encode_png(&DynamicImage::ImageRgba8(img))
}

/// Square PNG thumbnail, cropped to fill `size`×`size`
pub fn thumbnail(bytes: &[u8], size: u32) -> Result<Vec<u8>> {
    let img = image::load_from_memory(bytes).map_err(|e| Error::ImageDecode(e.to_string()))?;
    encode_png(&img.resize_to_fill(size, size, FilterType::Triangle))
}

fn encode_png(img: &DynamicImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| Error::ImageDecode(format!("failed to encode png: {}", e)))?;
    Ok(buf)
}

/// Serde adapter storing optional bytes as a base64 string
pub mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(b) => serializer.serialize_some(&STANDARD.encode(b)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error> {
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        encoded
            .map(|s| STANDARD.decode(s).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
pub(crate) fn sample_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([10, 120, 200, 255]));
    encode_png(&DynamicImage::ImageRgba8(img)).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_png() {
        let png = sample_png(4, 4);
        assert_eq!(validate(&png).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn test_validate_rejects_truncated_png() {
        let png = sample_png(16, 16);
        let truncated = &png[..png.len() / 2];
        assert!(matches!(validate(truncated), Err(Error::ImageDecode(_))));
    }

    #[test]
    fn test_validate_rejects_text() {
        assert!(validate(b"definitely not an image").is_err());
    }

    #[test]
    fn test_placeholder_decodes() {
        let png = placeholder_png().unwrap();
        let img = image::load_from_memory(&png).unwrap();
        assert_eq!(img.width(), PLACEHOLDER_SIZE);
        assert_eq!(mime_type(&png), "image/png");
    }

    #[test]
    fn test_thumbnail_is_square() {
        let png = sample_png(120, 40);
        let thumb = thumbnail(&png, 50).unwrap();
        let img = image::load_from_memory(&thumb).unwrap();
        assert_eq!((img.width(), img.height()), (50, 50));
    }

    #[test]
    fn test_base64_field_roundtrip() {
        #[derive(serde::Serialize, serde::Deserialize)]
        struct Holder {
            #[serde(default, with = "base64_bytes")]
            data: Option<Vec<u8>>,
        }

        let json = serde_json::to_string(&Holder { data: Some(vec![0, 255, 7]) }).unwrap();
        assert_eq!(json, r#"{"data":"AP8H"}"#);
        let back: Holder = serde_json::from_str(&json).unwrap();
        assert_eq!(back.data, Some(vec![0, 255, 7]));

        let empty: Holder = serde_json::from_str("{}").unwrap();
        assert!(empty.data.is_none());
    }
}
