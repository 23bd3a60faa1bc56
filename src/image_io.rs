use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbaImage};
use std::path::Path;

use crate::error::{GradeError, Result};

/// Quality used for every JPEG export.
pub const JPEG_QUALITY: u8 = 90;

/// Load and decode an image from disk.
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    image::open(path).map_err(|e| GradeError::Decode {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Downscale so the longest side fits within `max_dim`, preserving aspect
/// ratio. Images already inside the cap are returned unchanged.
pub fn fit_within(img: &RgbaImage, max_dim: u32) -> RgbaImage {
    let (w, h) = img.dimensions();
    if w.max(h) <= max_dim {
        return img.clone();
    }
    let scale = max_dim as f64 / w.max(h) as f64;
    let new_w = ((w as f64 * scale).round() as u32).max(1);
    let new_h = ((h as f64 * scale).round() as u32).max(1);
    image::imageops::resize(img, new_w, new_h, image::imageops::FilterType::Lanczos3)
}

/// Encode to JPEG bytes at the export quality. Alpha is dropped.
pub fn encode_jpeg(img: &RgbaImage) -> Result<Vec<u8>> {
    let (w, h) = img.dimensions();
    let mut rgb = image::RgbImage::new(w, h);
    for (dst, src) in rgb.chunks_exact_mut(3).zip(img.as_raw().chunks_exact(4)) {
        dst.copy_from_slice(&src[..3]);
    }

    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY);
    rgb.write_with_encoder(encoder).map_err(GradeError::Encode)?;
    Ok(bytes)
}

/// Write `img` to `path` as a JPEG at the export quality.
pub fn save_jpeg(img: &RgbaImage, path: &Path) -> Result<()> {
    let bytes = encode_jpeg(img)?;
    std::fs::write(path, &bytes).map_err(|e| GradeError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}
