//! Reference-to-source color transfer by moment matching.

use rayon::prelude::*;

use crate::color::lab::{self, Lab};
use crate::color::stats::{self, ChannelStats};

/// Stabilizer added to the source deviation. Keeps the scale finite for
/// flat-color sources and is part of the output contract, not a tunable.
const SRC_STD_EPS: f64 = 1.0;

/// Variance floor for the LAB chroma planes, which are small reals rather
/// than 8-bit counts.
const LAB_STD_FLOOR: f64 = 1e-6;

/// How the reference statistics are imposed on the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    /// Match mean and deviation of each RGB channel independently.
    Rgb,
    /// Match a*/b* chroma statistics in CIELAB, keeping per-pixel lightness.
    LabChroma,
}

impl TransferMode {
    pub const ALL: &[TransferMode] = &[TransferMode::Rgb, TransferMode::LabChroma];

    pub fn name(&self) -> &'static str {
        match self {
            TransferMode::Rgb => "RGB channels",
            TransferMode::LabChroma => "Lab chroma (keep lightness)",
        }
    }
}

/// Rewrite `rgba` in place so each RGB channel's mean and deviation match
/// `target`.
///
/// Per channel: scale = target_std / (source_std + 1), then
/// out = (v - source_mean) * scale + target_mean, truncated toward zero and
/// clamped to 0..=255. Truncation (not rounding) is deliberate and load-bearing
/// for bit-stable output. Source statistics are recomputed from the buffer on
/// every call; alpha bytes are untouched.
pub fn transfer_rgb(rgba: &mut [u8], target: &ChannelStats) {
    let source = stats::channel_stats(rgba);

    let mut scale = [0.0f64; 3];
    for c in 0..3 {
        scale[c] = target.std_dev[c] / (source.std_dev[c] + SRC_STD_EPS);
    }

    rgba.par_chunks_exact_mut(4).for_each(|px| {
        for c in 0..3 {
            let v = (px[c] as f64 - source.mean[c]) * scale[c] + target.mean[c];
            px[c] = (v as i64).clamp(0, 255) as u8;
        }
    });
}

/// Mean and deviation of the a*/b* planes of a buffer.
fn chroma_stats(rgba: &[u8]) -> ([f64; 2], [f64; 2]) {
    let mut sum = [0.0f64; 2];
    let mut sum_sq = [0.0f64; 2];

    for px in rgba.chunks_exact(4) {
        let p = lab::rgb_to_lab(px[0], px[1], px[2]);
        for (i, v) in [p.a as f64, p.b as f64].into_iter().enumerate() {
            sum[i] += v;
            sum_sq[i] += v * v;
        }
    }

    let count = (rgba.len() / 4) as f64;
    let mut mean = [0.0f64; 2];
    let mut std_dev = [0.0f64; 2];
    for i in 0..2 {
        let m = sum[i] / count;
        mean[i] = m;
        std_dev[i] = (sum_sq[i] / count - m * m).max(0.0).sqrt();
    }
    (mean, std_dev)
}

/// Rewrite `rgba` in place so its a*/b* chroma statistics match `reference`,
/// leaving each pixel's L* untouched.
///
/// `strength` in 0..=1 blends from the source chroma (0) to the fully matched
/// chroma (1); 0 is an exact identity. Out-of-gamut results clamp on the way
/// back to sRGB.
pub fn transfer_lab_chroma(rgba: &mut [u8], reference: &[u8], strength: f32) {
    if strength <= 0.0 {
        return;
    }

    let (src_mean, src_std) = chroma_stats(rgba);
    let (ref_mean, ref_std) = chroma_stats(reference);

    let mut scale = [0.0f64; 2];
    for i in 0..2 {
        scale[i] = ref_std[i] / src_std[i].max(LAB_STD_FLOOR);
    }
    let alpha = strength.min(1.0);

    rgba.par_chunks_exact_mut(4).for_each(|px| {
        let p = lab::rgb_to_lab(px[0], px[1], px[2]);
        let matched_a = ((p.a as f64 - src_mean[0]) * scale[0] + ref_mean[0]) as f32;
        let matched_b = ((p.b as f64 - src_mean[1]) * scale[1] + ref_mean[1]) as f32;

        let (r, g, b) = lab::lab_to_rgb(Lab {
            l: p.l,
            a: p.a + (matched_a - p.a) * alpha,
            b: p.b + (matched_b - p.b) * alpha,
        });
        px[0] = r;
        px[1] = g;
        px[2] = b;
    });
}
