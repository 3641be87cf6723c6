//! # Image Loading
//!
//! The image collaborator: resolves an element's `src` (data URI, file path,
//! or raw base64) or an in-memory byte slice into decoded pixel data, or a
//! failure the renderers degrade on. JPEG bytes pass through undecoded (the
//! downstream encoders embed them natively); PNG decodes to RGB plus a
//! separate alpha channel.

use std::io::Cursor;

/// A decoded/validated image ready for a byte encoder.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub pixel_data: ImagePixelData,
    pub width_px: u32,
    pub height_px: u32,
}

#[derive(Debug, Clone)]
pub enum ImagePixelData {
    /// Raw JPEG bytes, embeddable as-is.
    Jpeg { data: Vec<u8> },
    /// Decoded RGB pixels + optional alpha channel.
    Decoded {
        /// width * height * 3 bytes (RGB)
        rgb: Vec<u8>,
        /// width * height bytes. None if fully opaque.
        alpha: Option<Vec<u8>>,
    },
}

/// Load an image from a source string.
///
/// Supported `src` formats:
/// - `data:image/...;base64,...` — data URI
/// - File path (absolute, `./` or `../` prefixed) — reads from disk
/// - Raw base64-encoded image data
pub fn load_image(src: &str) -> Result<LoadedImage, String> {
    let bytes = resolve_source(src)?;
    decode_bytes(&bytes)
}

/// Decode an in-memory image (e.g. a captured signature).
pub fn load_image_bytes(bytes: &[u8]) -> Result<LoadedImage, String> {
    decode_bytes(bytes)
}

/// Cheap validity check: confirms the bytes are a decodable JPEG/PNG and
/// returns the pixel dimensions without decoding pixel data.
pub fn probe_image_bytes(bytes: &[u8]) -> Result<(u32, u32), String> {
    if bytes.len() < 4 {
        return Err("image data too short".to_string());
    }
    if !is_jpeg(bytes) && !is_png(bytes) {
        return Err("unsupported image format (expected JPEG or PNG)".to_string());
    }
    image::io::Reader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| format!("format detection error: {}", e))?
        .into_dimensions()
        .map_err(|e| format!("failed to read image dimensions: {}", e))
}

/// Resolve a `src` string to validated encoded bytes (for encoders that
/// embed JPEG/PNG directly).
pub fn source_bytes(src: &str) -> Result<Vec<u8>, String> {
    let bytes = resolve_source(src)?;
    probe_image_bytes(&bytes)?;
    Ok(bytes)
}

fn resolve_source(src: &str) -> Result<Vec<u8>, String> {
    // Data URI: data:image/png;base64,iVBOR...
    if src.starts_with("data:image/") {
        let comma = src
            .find(',')
            .ok_or_else(|| "invalid data URI: missing comma".to_string())?;
        return base64_decode(&src[comma + 1..]);
    }

    // Only explicit path prefixes count as paths, so base64 payloads
    // containing '/' are not misread as filenames.
    if src.starts_with('/') || src.starts_with("./") || src.starts_with("../") {
        return std::fs::read(src).map_err(|e| format!("failed to read image file '{}': {}", src, e));
    }

    base64_decode(src)
}

fn base64_decode(input: &str) -> Result<Vec<u8>, String> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(input)
        .map_err(|e| format!("base64 decode error: {}", e))
}

fn decode_bytes(data: &[u8]) -> Result<LoadedImage, String> {
    if data.len() < 4 {
        return Err("image data too short".to_string());
    }

    if is_jpeg(data) {
        let (width_px, height_px) = probe_image_bytes(data)?;
        Ok(LoadedImage {
            pixel_data: ImagePixelData::Jpeg {
                data: data.to_vec(),
            },
            width_px,
            height_px,
        })
    } else if is_png(data) {
        decode_png(data)
    } else {
        Err("unsupported image format (expected JPEG or PNG)".to_string())
    }
}

fn is_jpeg(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0xFF && data[1] == 0xD8
}

fn is_png(data: &[u8]) -> bool {
    data.len() >= 4 && data[0] == 0x89 && data[1] == 0x50 && data[2] == 0x4E && data[3] == 0x47
}

/// PNG: decode to RGBA, split into RGB + alpha.
fn decode_png(data: &[u8]) -> Result<LoadedImage, String> {
    let img = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| format!("format detection error: {}", e))?
        .decode()
        .map_err(|e| format!("failed to decode PNG: {}", e))?;

    let rgba = img.to_rgba8();
    let (width, height) = (rgba.width(), rgba.height());

    let pixel_count = (width * height) as usize;
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);
    let mut has_transparency = false;

    for pixel in rgba.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel[3]);
        if pixel[3] != 255 {
            has_transparency = true;
        }
    }

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Decoded {
            rgb,
            alpha: if has_transparency { Some(alpha) } else { None },
        },
        width_px: width,
        height_px: height,
    })
}
