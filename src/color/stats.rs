//! Per-channel statistics over interleaved RGBA pixel data.

/// Mean and standard deviation of each RGB channel of a buffer.
///
/// Means are in 0..=255; deviations are non-negative. Immutable once computed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelStats {
    pub mean: [f64; 3],
    pub std_dev: [f64; 3],
}

/// Compute per-channel mean and standard deviation in a single pass.
///
/// Accumulates sum and sum-of-squares per channel (exact in u64 for 8-bit
/// input), then finishes with std = sqrt(E[x^2] - E[x]^2). Alpha bytes are
/// skipped. The buffer must hold at least one pixel; decoded images always do.
pub fn channel_stats(rgba: &[u8]) -> ChannelStats {
    debug_assert!(rgba.len() >= 4, "statistics need at least one pixel");

    let mut sum = [0u64; 3];
    let mut sum_sq = [0u64; 3];

    for px in rgba.chunks_exact(4) {
        for c in 0..3 {
            let v = px[c] as u64;
            sum[c] += v;
            sum_sq[c] += v * v;
        }
    }

    let count = (rgba.len() / 4) as f64;
    let mut mean = [0.0f64; 3];
    let mut std_dev = [0.0f64; 3];
    for c in 0..3 {
        let m = sum[c] as f64 / count;
        let variance = sum_sq[c] as f64 / count - m * m;
        mean[c] = m;
        // Variance can land a hair below zero from the f64 subtraction.
        std_dev[c] = variance.max(0.0).sqrt();
    }

    ChannelStats { mean, std_dev }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_rgba(r: u8, g: u8, b: u8, pixels: usize) -> Vec<u8> {
        let mut buf = Vec::with_capacity(pixels * 4);
        for _ in 0..pixels {
            buf.extend_from_slice(&[r, g, b, 255]);
        }
        buf
    }

    #[test]
    fn test_flat_buffer_has_exact_mean_and_zero_std() {
        let buf = flat_rgba(128, 200, 17, 4);
        let stats = channel_stats(&buf);
        assert_eq!(stats.mean, [128.0, 200.0, 17.0]);
        assert_eq!(stats.std_dev, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_two_value_buffer() {
        // Half 0, half 255: mean 127.5, std 127.5 per channel.
        let mut buf = flat_rgba(0, 0, 0, 2);
        buf.extend_from_slice(&flat_rgba(255, 255, 255, 2));
        let stats = channel_stats(&buf);
        for c in 0..3 {
            assert!((stats.mean[c] - 127.5).abs() < 1e-9);
            assert!((stats.std_dev[c] - 127.5).abs() < 1e-9);
        }
    }

    #[test]
    fn test_mean_in_range_and_std_non_negative() {
        let buf: Vec<u8> = (0..64u32)
            .flat_map(|i| {
                let v = (i * 37 % 256) as u8;
                [v, v.wrapping_mul(3), v.wrapping_add(91), 255]
            })
            .collect();
        let stats = channel_stats(&buf);
        for c in 0..3 {
            assert!(stats.mean[c] >= 0.0 && stats.mean[c] <= 255.0);
            assert!(stats.std_dev[c] >= 0.0);
        }
    }

    #[test]
    fn test_alpha_is_ignored() {
        let mut buf = flat_rgba(10, 20, 30, 3);
        // Vary alpha wildly; channel statistics must not move.
        buf[3] = 0;
        buf[7] = 99;
        let stats = channel_stats(&buf);
        assert_eq!(stats.mean, [10.0, 20.0, 30.0]);
        assert_eq!(stats.std_dev, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_single_pixel() {
        let stats = channel_stats(&[42, 0, 255, 255]);
        assert_eq!(stats.mean, [42.0, 0.0, 255.0]);
        assert_eq!(stats.std_dev, [0.0, 0.0, 0.0]);
    }
}
