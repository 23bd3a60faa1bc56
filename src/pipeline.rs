use image::RgbaImage;
use rayon::prelude::*;

use crate::color::transfer::{self, TransferMode};
use crate::color::{clahe, stats};
use crate::error::{GradeError, Result};

/// Fraction of the untouched source mixed back into the Lab-mode result, so
/// the final image keeps some of the source's character.
const SOURCE_CHARACTER: f32 = 0.2;

/// Options controlling the transfer step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradeOptions {
    pub mode: TransferMode,
    /// Chroma blend strength for the Lab mode, 0..=100 percent.
    pub lab_strength: i32,
}

impl Default for GradeOptions {
    fn default() -> Self {
        Self {
            mode: TransferMode::Rgb,
            lab_strength: 80,
        }
    }
}

/// Reject degenerate images and buffers whose length disagrees with their
/// dimensions (possible via `from_raw` with an oversized container).
fn check_buffer(img: &RgbaImage) -> Result<()> {
    let expected = img.width() as usize * img.height() as usize * 4;
    if expected == 0 {
        return Err(GradeError::EmptyImage);
    }
    let actual = img.as_raw().len();
    if actual != expected {
        return Err(GradeError::BufferSize { expected, actual });
    }
    Ok(())
}

/// Grade `source` against `reference`: impose the reference's color
/// statistics on a copy of the source and return it at full source
/// resolution. The inputs are left untouched.
///
/// The Lab mode follows the chroma match with a lightness equalization pass
/// and then blends a fifth of the untouched source back in.
pub fn process(
    source: &RgbaImage,
    reference: &RgbaImage,
    options: &GradeOptions,
) -> Result<RgbaImage> {
    check_buffer(source)?;
    check_buffer(reference)?;

    let mut graded = source.clone();
    match options.mode {
        TransferMode::Rgb => {
            let target = stats::channel_stats(reference.as_raw());
            transfer::transfer_rgb(&mut graded, &target);
        }
        TransferMode::LabChroma => {
            let strength = options.lab_strength.clamp(0, 100) as f32 / 100.0;
            transfer::transfer_lab_chroma(&mut graded, reference.as_raw(), strength);
            let (w, h) = graded.dimensions();
            clahe::enhance_lightness(&mut graded, w as usize, h as usize);
            blend_source_character(&mut graded, source.as_raw());
        }
    }
    Ok(graded)
}

/// Weighted mix of the graded result with the original source pixels,
/// `SOURCE_CHARACTER` parts source. Alpha is untouched.
fn blend_source_character(graded: &mut RgbaImage, source: &[u8]) {
    graded
        .par_chunks_exact_mut(4)
        .zip(source.par_chunks_exact(4))
        .for_each(|(g, s)| {
            for c in 0..3 {
                let v = g[c] as f32 * (1.0 - SOURCE_CHARACTER) + s[c] as f32 * SOURCE_CHARACTER;
                g[c] = v.round() as u8;
            }
        });
}
