//! Post-transfer tonal adjustments.
//!
//! ## Stage order
//! 1. Brightness
//! 2. Contrast
//! 3. Saturation
//! 4. Temperature (sepia blend + hue rotation)
//!
//! Every stage is skipped when its parameter is exactly 0, and the whole
//! pipeline always runs from the untouched original buffer, so slider changes
//! never accumulate.

use image::RgbaImage;
use rayon::prelude::*;

/// The four slider values, each in -100..=100. 0 is a no-op for that stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdjustParams {
    pub brightness: i32,
    pub contrast: i32,
    pub saturation: i32,
    pub temperature: i32,
}

impl AdjustParams {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Apply all adjustment stages to `original`, returning a new buffer.
///
/// `original` is never mutated. All-zero parameters return an identical copy.
pub fn apply_adjustments(original: &RgbaImage, params: &AdjustParams) -> RgbaImage {
    let mut out = original.clone();
    apply_adjustments_in_place(&mut out, params);
    out
}

/// In-place variant over raw RGBA bytes (alpha untouched).
pub fn apply_adjustments_in_place(rgba: &mut [u8], params: &AdjustParams) {
    if params.is_default() {
        return;
    }

    let brightness = params.brightness as f32;
    let contrast = params.contrast as f32;
    let saturation = params.saturation as f32;
    let temperature = params.temperature as f32;

    rgba.par_chunks_exact_mut(4).for_each(|px| {
        let mut r = px[0] as f32 / 255.0;
        let mut g = px[1] as f32 / 255.0;
        let mut b = px[2] as f32 / 255.0;

        (r, g, b) = apply_brightness(r, g, b, brightness);
        (r, g, b) = apply_contrast(r, g, b, contrast);
        (r, g, b) = apply_saturation(r, g, b, saturation);
        (r, g, b) = apply_temperature(r, g, b, temperature);

        px[0] = (r.clamp(0.0, 1.0) * 255.0).round() as u8;
        px[1] = (g.clamp(0.0, 1.0) * 255.0).round() as u8;
        px[2] = (b.clamp(0.0, 1.0) * 255.0).round() as u8;
    });
}

/// Apply brightness adjustment.
///
/// Formula: `output = input * (100 + brightness) / 100`. Scaling every
/// channel scales luminance by the same factor.
#[inline]
fn apply_brightness(r: f32, g: f32, b: f32, brightness: f32) -> (f32, f32, f32) {
    if brightness == 0.0 {
        return (r, g, b);
    }
    let factor = (100.0 + brightness) / 100.0;
    (r * factor, g * factor, b * factor)
}

/// Apply contrast adjustment around the midpoint.
///
/// Formula: `output = (input - 0.5) * (1 + contrast/100) + 0.5`
#[inline]
fn apply_contrast(r: f32, g: f32, b: f32, contrast: f32) -> (f32, f32, f32) {
    if contrast == 0.0 {
        return (r, g, b);
    }
    let factor = 1.0 + contrast / 100.0;
    let midpoint = 0.5;
    (
        (r - midpoint) * factor + midpoint,
        (g - midpoint) * factor + midpoint,
        (b - midpoint) * factor + midpoint,
    )
}

/// Calculate luminance using ITU-R BT.709 coefficients.
#[inline]
fn calculate_luminance(r: f32, g: f32, b: f32) -> f32 {
    0.2126 * r + 0.7152 * g + 0.0722 * b
}

/// Apply saturation adjustment.
///
/// Scales chroma relative to per-pixel luminance by `1 + saturation/100`;
/// -100 collapses to grayscale.
#[inline]
fn apply_saturation(r: f32, g: f32, b: f32, saturation: f32) -> (f32, f32, f32) {
    if saturation == 0.0 {
        return (r, g, b);
    }
    let gray = calculate_luminance(r, g, b);
    let factor = 1.0 + saturation / 100.0;
    (
        gray + (r - gray) * factor,
        gray + (g - gray) * factor,
        gray + (b - gray) * factor,
    )
}

/// Apply temperature adjustment.
///
/// Blends toward sepia with strength |temperature|/2 percent, then rotates
/// hue by temperature/5 degrees. Positive and negative values share the
/// sepia warmth but rotate in opposite directions.
#[inline]
fn apply_temperature(r: f32, g: f32, b: f32, temperature: f32) -> (f32, f32, f32) {
    if temperature == 0.0 {
        return (r, g, b);
    }
    let (r, g, b) = apply_sepia(r, g, b, temperature.abs() / 200.0);
    apply_hue_rotate(r, g, b, temperature / 5.0)
}

/// Interpolate between identity and the full sepia matrix by `amount` (0..=1).
#[inline]
fn apply_sepia(r: f32, g: f32, b: f32, amount: f32) -> (f32, f32, f32) {
    let keep = 1.0 - amount;
    (
        r * (0.393 * amount + keep) + g * (0.769 * amount) + b * (0.189 * amount),
        r * (0.349 * amount) + g * (0.686 * amount + keep) + b * (0.168 * amount),
        r * (0.272 * amount) + g * (0.534 * amount) + b * (0.131 * amount + keep),
    )
}

/// Rotate hue by `degrees` with the luminance-preserving rotation matrix.
#[inline]
fn apply_hue_rotate(r: f32, g: f32, b: f32, degrees: f32) -> (f32, f32, f32) {
    let (sin, cos) = degrees.to_radians().sin_cos();
    (
        r * (0.213 + cos * 0.787 - sin * 0.213)
            + g * (0.715 - cos * 0.715 - sin * 0.715)
            + b * (0.072 - cos * 0.072 + sin * 0.928),
        r * (0.213 - cos * 0.213 + sin * 0.143)
            + g * (0.715 + cos * 0.285 + sin * 0.140)
            + b * (0.072 - cos * 0.072 - sin * 0.283),
        r * (0.213 - cos * 0.213 - sin * 0.787)
            + g * (0.715 - cos * 0.715 + sin * 0.715)
            + b * (0.072 + cos * 0.928 + sin * 0.072),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_of(pixels: &[[u8; 4]]) -> RgbaImage {
        let mut buf = Vec::with_capacity(pixels.len() * 4);
        for px in pixels {
            buf.extend_from_slice(px);
        }
        RgbaImage::from_raw(pixels.len() as u32, 1, buf).unwrap()
    }

    fn params(brightness: i32, contrast: i32, saturation: i32, temperature: i32) -> AdjustParams {
        AdjustParams {
            brightness,
            contrast,
            saturation,
            temperature,
        }
    }

    // ===== Identity =====

    #[test]
    fn test_all_zero_params_return_identical_buffer() {
        let img = image_of(&[[128, 64, 192, 255], [0, 0, 0, 255], [255, 255, 255, 10]]);
        let out = apply_adjustments(&img, &AdjustParams::default());
        assert_eq!(out.as_raw(), img.as_raw());
    }

    #[test]
    fn test_original_is_never_mutated() {
        let img = image_of(&[[100, 150, 200, 255]]);
        let before = img.as_raw().clone();
        let _ = apply_adjustments(&img, &params(80, -40, 60, -90));
        assert_eq!(img.as_raw(), &before);
    }

    // ===== Brightness =====

    #[test]
    fn test_brightness_positive_scales_up() {
        let img = image_of(&[[128, 128, 128, 255]]);
        let out = apply_adjustments(&img, &params(50, 0, 0, 0));
        // 128/255 * 1.5 = 0.7529 -> 192
        assert_eq!(out.get_pixel(0, 0).0, [192, 192, 192, 255]);
    }

    #[test]
    fn test_brightness_negative_scales_down() {
        let img = image_of(&[[200, 200, 200, 255]]);
        let out = apply_adjustments(&img, &params(-50, 0, 0, 0));
        assert_eq!(out.get_pixel(0, 0).0, [100, 100, 100, 255]);
    }

    #[test]
    fn test_brightness_minus_hundred_is_black() {
        let img = image_of(&[[255, 200, 13, 255]]);
        let out = apply_adjustments(&img, &params(-100, 0, 0, 0));
        assert_eq!(out.get_pixel(0, 0).0, [0, 0, 0, 255]);
    }

    // ===== Contrast =====

    #[test]
    fn test_contrast_positive_spreads_from_midpoint() {
        let img = image_of(&[[64, 128, 192, 255]]);
        let out = apply_adjustments(&img, &params(0, 100, 0, 0));
        let px = out.get_pixel(0, 0).0;
        assert!(px[0] < 64, "dark channel should get darker, got {}", px[0]);
        assert!((px[1] as i32 - 128).abs() <= 2, "midpoint should hold");
        assert_eq!(px[2], 255, "bright channel should clip");
    }

    #[test]
    fn test_contrast_negative_pulls_toward_midpoint() {
        let img = image_of(&[[0, 128, 255, 255]]);
        let out = apply_adjustments(&img, &params(0, -50, 0, 0));
        let px = out.get_pixel(0, 0).0;
        assert!(px[0] > 0);
        assert!(px[2] < 255);
    }

    // ===== Saturation =====

    #[test]
    fn test_saturation_minus_hundred_is_grayscale() {
        let img = image_of(&[[200, 128, 100, 255], [30, 180, 220, 255]]);
        let out = apply_adjustments(&img, &params(0, 0, -100, 0));
        for px in out.pixels() {
            assert_eq!(px.0[0], px.0[1]);
            assert_eq!(px.0[1], px.0[2]);
        }
    }

    #[test]
    fn test_saturation_positive_widens_channel_spread() {
        let img = image_of(&[[200, 128, 100, 255]]);
        let out = apply_adjustments(&img, &params(0, 0, 50, 0));
        let px = out.get_pixel(0, 0).0;
        assert!((px[0] as i32 - px[2] as i32) > 100);
    }

    #[test]
    fn test_saturation_leaves_gray_alone() {
        let img = image_of(&[[128, 128, 128, 255]]);
        let out = apply_adjustments(&img, &params(0, 0, 100, 0));
        let px = out.get_pixel(0, 0).0;
        for c in 0..3 {
            assert!((px[c] as i32 - 128).abs() <= 1);
        }
    }

    // ===== Temperature =====

    #[test]
    fn test_temperature_warm_orders_channels() {
        let img = image_of(&[[128, 128, 128, 255]]);
        let out = apply_adjustments(&img, &params(0, 0, 0, 100));
        let px = out.get_pixel(0, 0).0;
        assert!(px[0] > px[2], "warm gray should gain red over blue");
    }

    #[test]
    fn test_temperature_directions_differ() {
        let img = image_of(&[[128, 128, 128, 255]]);
        let warm = apply_adjustments(&img, &params(0, 0, 0, 100));
        let cool = apply_adjustments(&img, &params(0, 0, 0, -100));
        let w = warm.get_pixel(0, 0).0;
        let c = cool.get_pixel(0, 0).0;
        // Same sepia strength, opposite rotation: the cool side keeps more
        // blue, the warm side keeps more green.
        assert!(c[2] > w[2]);
        assert!(w[1] > c[1]);
        assert_ne!(w, c);
    }

    #[test]
    fn test_temperature_small_value_changes_little() {
        let img = image_of(&[[90, 140, 190, 255]]);
        let out = apply_adjustments(&img, &params(0, 0, 0, 5));
        let px = out.get_pixel(0, 0).0;
        for c in 0..3 {
            let before = img.get_pixel(0, 0).0[c] as i32;
            assert!((px[c] as i32 - before).abs() < 16);
        }
    }

    // ===== Composition =====

    #[test]
    fn test_extremes_stay_in_range() {
        let img = image_of(&[[0, 0, 0, 255], [255, 255, 255, 255], [0, 255, 0, 255]]);
        for t in [-100, 100] {
            for c in [-100, 100] {
                let out = apply_adjustments(&img, &params(t, c, t, c));
                assert_eq!(out.as_raw().len(), img.as_raw().len());
                // u8 storage already bounds the channels; check alpha survived.
                for px in out.pixels() {
                    assert_eq!(px.0[3], 255);
                }
            }
        }
    }

    #[test]
    fn test_adjustments_never_accumulate() {
        let img = image_of(&[[37, 170, 90, 255], [250, 60, 10, 255]]);
        let p1 = params(80, 30, -20, 60);
        let p2 = params(-10, 0, 45, -35);

        let direct = apply_adjustments(&img, &p2);
        let _intermediate = apply_adjustments(&img, &p1);
        let after_other_params = apply_adjustments(&img, &p2);

        assert_eq!(direct.as_raw(), after_other_params.as_raw());
    }

    #[test]
    fn test_alpha_passthrough() {
        let img = image_of(&[[10, 20, 30, 7], [40, 50, 60, 99]]);
        let out = apply_adjustments(&img, &params(25, 25, 25, 25));
        assert_eq!(out.get_pixel(0, 0).0[3], 7);
        assert_eq!(out.get_pixel(1, 0).0[3], 99);
    }

    #[test]
    fn test_stage_order_brightness_before_contrast() {
        // 100 brightness then 100 contrast from 77-gray:
        // 77/255 * 2.0 = 0.604, then (0.604 - 0.5) * 2 + 0.5 = 0.708 -> 180.
        // Reversed it would be (0.302 - 0.5) * 2 + 0.5 = 0.104, * 2 -> 53.
        let v = 77u8;
        let img = image_of(&[[v, v, v, 255]]);
        let out = apply_adjustments(&img, &params(100, 100, 0, 0));
        let px = out.get_pixel(0, 0).0;
        assert!(px[0] > 170, "expected brightness to run first, got {}", px[0]);
    }
}
