//! Contrast-limited adaptive histogram equalization over the L* plane.
//!
//! Used by the Lab transfer mode as a lightness polish after the chroma
//! match: the 8-bit lightness plane is equalized per tile with the histogram
//! clipped at twice the uniform level, and neighboring tile mappings are
//! blended bilinearly to hide tile seams. Chroma is untouched.

use rayon::prelude::*;

use crate::color::lab::{self, Lab};

/// Histogram clip height, relative to a perfectly uniform histogram.
const CLIP_LIMIT: f32 = 2.0;

/// Tile grid along each axis.
const TILE_GRID: usize = 8;

/// Equalize the lightness of an RGBA buffer in place, leaving chroma and
/// alpha alone.
pub fn enhance_lightness(rgba: &mut [u8], width: usize, height: usize) {
    if width == 0 || height == 0 {
        return;
    }
    debug_assert_eq!(rgba.len(), width * height * 4);

    let mut plane = vec![0u8; width * height];
    for (l8, px) in plane.iter_mut().zip(rgba.chunks_exact(4)) {
        let l = lab::rgb_to_lab(px[0], px[1], px[2]).l;
        *l8 = (l * 255.0 / 100.0).round().clamp(0.0, 255.0) as u8;
    }

    let enhanced = equalize_plane(&plane, width, height);

    rgba.par_chunks_exact_mut(4)
        .zip(enhanced.par_iter())
        .for_each(|(px, &l8)| {
            let p = lab::rgb_to_lab(px[0], px[1], px[2]);
            let (r, g, b) = lab::lab_to_rgb(Lab {
                l: l8 as f32 * 100.0 / 255.0,
                a: p.a,
                b: p.b,
            });
            px[0] = r;
            px[1] = g;
            px[2] = b;
        });
}

/// Equalization mapping for one tile.
///
/// The clipped excess is handed back evenly across all bins in f32, so a
/// flat tile of any size keeps a near-identity mapping instead of snapping
/// to an extreme.
fn tile_lut(plane: &[u8], width: usize, x0: usize, x1: usize, y0: usize, y1: usize) -> [u8; 256] {
    let area = ((x1 - x0) * (y1 - y0)) as f32;
    let mut hist = [0.0f32; 256];
    for y in y0..y1 {
        for x in x0..x1 {
            hist[plane[y * width + x] as usize] += 1.0;
        }
    }

    let clip = CLIP_LIMIT * area / 256.0;
    let mut excess = 0.0;
    for h in hist.iter_mut() {
        if *h > clip {
            excess += *h - clip;
            *h = clip;
        }
    }
    let bonus = excess / 256.0;

    let mut lut = [0u8; 256];
    let mut cdf = 0.0;
    for (v, h) in hist.iter().enumerate() {
        cdf += h + bonus;
        lut[v] = (cdf * 255.0 / area).round().clamp(0.0, 255.0) as u8;
    }
    lut
}

fn equalize_plane(plane: &[u8], width: usize, height: usize) -> Vec<u8> {
    let tile_w = width.div_ceil(TILE_GRID.min(width));
    let tile_h = height.div_ceil(TILE_GRID.min(height));
    let tiles_x = width.div_ceil(tile_w);
    let tiles_y = height.div_ceil(tile_h);

    let mut luts = Vec::with_capacity(tiles_x * tiles_y);
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let x0 = tx * tile_w;
            let y0 = ty * tile_h;
            luts.push(tile_lut(
                plane,
                width,
                x0,
                (x0 + tile_w).min(width),
                y0,
                (y0 + tile_h).min(height),
            ));
        }
    }

    let mut out = vec![0u8; plane.len()];
    out.par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            let (ty0, ty1, wy) = axis_blend(y, tile_h, tiles_y);
            for (x, dst) in row.iter_mut().enumerate() {
                let (tx0, tx1, wx) = axis_blend(x, tile_w, tiles_x);
                let v = plane[y * width + x] as usize;
                let top = luts[ty0 * tiles_x + tx0][v] as f32 * (1.0 - wx)
                    + luts[ty0 * tiles_x + tx1][v] as f32 * wx;
                let bottom = luts[ty1 * tiles_x + tx0][v] as f32 * (1.0 - wx)
                    + luts[ty1 * tiles_x + tx1][v] as f32 * wx;
                *dst = (top * (1.0 - wy) + bottom * wy).round() as u8;
            }
        });
    out
}

/// Neighboring tile indices along one axis and the blend weight toward the
/// second one, measured from the tile centers. Positions outside the first
/// or last center fall back to the edge tile alone.
fn axis_blend(pos: usize, tile_size: usize, tiles: usize) -> (usize, usize, f32) {
    let f = (pos as f32 + 0.5) / tile_size as f32 - 0.5;
    if f <= 0.0 {
        return (0, 0, 0.0);
    }
    let t = f.floor() as usize;
    if t + 1 >= tiles {
        (tiles - 1, tiles - 1, 0.0)
    } else {
        (t, t + 1, f - t as f32)
    }
}
