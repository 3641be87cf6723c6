//! QR code generation for QrCode canvas elements.
//!
//! The renderers only need the module matrix; turning modules into filled
//! rects (or pixels) is the encoder's business.

use qrcode::QrCode;

use crate::error::MietwerkError;

/// Encode `content` into a square boolean module matrix (`true` = dark).
pub fn qr_matrix(content: &str) -> Result<Vec<Vec<bool>>, MietwerkError> {
    let code = QrCode::new(content.as_bytes()).map_err(|e| {
        MietwerkError::resource(format!("QR encoding failed for {:?}: {}", content, e))
    })?;
    let width = code.width();
    let colors = code.to_colors();
    let matrix = colors
        .chunks(width)
        .map(|row| row.iter().map(|c| *c == qrcode::Color::Dark).collect())
        .collect();
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_is_square() {
        let m = qr_matrix("https://example.org/vertrag/123").unwrap();
        assert!(!m.is_empty());
        let width = m.len();
        assert!(m.iter().all(|row| row.len() == width));
    }

    #[test]
    fn test_matrix_has_finder_pattern_corner() {
        // Every QR code starts with a dark module at (0,0) of the finder.
        let m = qr_matrix("test").unwrap();
        assert!(m[0][0]);
    }

    #[test]
    fn test_same_content_same_matrix() {
        assert_eq!(qr_matrix("abc").unwrap(), qr_matrix("abc").unwrap());
    }
}
