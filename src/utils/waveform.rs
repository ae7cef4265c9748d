//! Waveform peaks from raw mono PCM

/// Sample rate the waveform extraction decodes to
pub const WAVEFORM_SAMPLE_RATE: u32 = 8_000;

/// Default number of buckets
pub const DEFAULT_WAVEFORM_SAMPLES: usize = 200;

/// RMS per bucket of signed 16-bit little-endian mono PCM, scaled to `[0, 1]`.
///
/// Each bucket is first divided by full scale, then the whole series by its
/// largest bucket. Buckets past the end of the data are zero.
pub fn rms_buckets(pcm: &[u8], buckets: usize) -> Vec<f32> {
    if buckets == 0 {
        return Vec::new();
    }

    let samples: Vec<i16> = pcm
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect();

    let per_bucket = (samples.len() / buckets).max(1);
    let mut levels: Vec<f32> = (0..buckets)
        .map(|bucket| {
            let start = bucket * per_bucket;
            let end = (start + per_bucket).min(samples.len());
            if start >= end {
                return 0.0;
            }
            let sum_squares: f64 = samples[start..end]
                .iter()
                .map(|&s| {
                    let v = s as f64 / 32768.0;
                    v * v
                })
                .sum();
            (sum_squares / (end - start) as f64).sqrt() as f32
        })
        .collect();

    let peak = levels.iter().cloned().fold(0.0f32, f32::max);
    if peak > 0.0 {
        for level in &mut levels {
            *level /= peak;
        }
    }
    levels
}
