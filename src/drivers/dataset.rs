//! Built-in ECG trace used when no recorded table is supplied.
//!
//! The table holds ten identical PQRST beats (500 samples each) with a little
//! seeded baseline noise, so it loops without a visible seam and every run
//! produces the same values.
use std::sync::Arc;
use once_cell::sync::Lazy;
use rand::{rngs::StdRng, Rng, SeedableRng};
use crate::drivers::{ChartError, SampleTable};
pub const ECG_TABLE_LEN: usize = 5_000;
const BEAT_SAMPLES: usize = 500;
const NOISE_SEED: u64 = 0x00ec_9da7;
const NOISE_AMPLITUDE: f64 = 0.01;
/// (centre as fraction of the beat, amplitude, width as fraction of the beat)
const WAVES: [(f64, f64, f64); 5] = [
    (0.20, 0.15, 0.025), // P
    (0.37, -0.10, 0.010), // Q
    (0.40, 1.00, 0.012), // R
    (0.43, -0.20, 0.010), // S
    (0.65, 0.30, 0.040), // T
];
static ECG_VALUES: Lazy<Arc<[f64]>> = Lazy::new(|| synthesize(ECG_TABLE_LEN).into());
pub fn ecg_table() -> Result<SampleTable, ChartError> {
    SampleTable::new(Arc::clone(&ECG_VALUES))
}
fn synthesize(len: usize) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(NOISE_SEED);
    (0..len)
        .map(|i| {
            let phase = (i % BEAT_SAMPLES) as f64 / BEAT_SAMPLES as f64;
            let clean: f64 = WAVES
                .iter()
                .map(|&(centre, amp, width)| {
                    let d = (phase - centre) / width;
                    amp * (-0.5 * d * d).exp()
                })
                .sum();
            clean + rng.gen_range(-NOISE_AMPLITUDE..NOISE_AMPLITUDE)
        })
        .collect()
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::SampleSource;
    #[test]
    fn table_has_expected_length_and_peaks() {
        let table = ecg_table().unwrap();
        assert_eq!(table.len(), ECG_TABLE_LEN);
        let (min, max) = table.value_range();
        assert!(max > 0.9 && max < 1.1, "R peak near 1.0, got {max}");
        assert!(min < -0.15, "S trough below baseline, got {min}");
    }
    #[test]
    fn table_is_identical_across_calls() {
        let a = ecg_table().unwrap().fetch_batch(0, 64);
        let b = ecg_table().unwrap().fetch_batch(0, 64);
        assert_eq!(a, b);
    }
}
