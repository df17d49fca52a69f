use std::fs;
use std::path::Path;
use std::time::Duration;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use crate::drivers::ChartError;
/// Chart session settings. JSON keys are camelCase (`numChannels`, ...).
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartConfig {
    pub num_channels: usize,
    pub tick_interval_ms: u64,
    /// Samples per channel per tick.
    pub batch_step: usize,
    /// Samples retained per channel.
    pub window_capacity: usize,
    /// Fraction of the window cleared by each sweep.
    pub sweep_gap_ratio: f64,
    pub container_id: String,
}
impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            num_channels: 4,
            tick_interval_ms: 50,
            batch_step: 2_200,
            // 5 seconds at 44 kHz
            window_capacity: 220_000,
            sweep_gap_ratio: 0.02,
            container_id: "chart".to_owned(),
        }
    }
}
impl ChartConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading chart config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing chart config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }
    pub fn validate(&self) -> Result<(), ChartError> {
        let fail = |msg: String| -> Result<(), ChartError> { Err(ChartError::InvalidConfig(msg)) };
        if self.num_channels == 0 {
            return Err(ChartError::InvalidCount(self.num_channels));
        }
        if self.tick_interval_ms == 0 {
            return fail("tickIntervalMs must be greater than zero".into());
        }
        if self.batch_step == 0 {
            return fail("batchStep must be greater than zero".into());
        }
        if self.window_capacity == 0 {
            return fail("windowCapacity must be greater than zero".into());
        }
        if !(0.0..1.0).contains(&self.sweep_gap_ratio) {
            return fail(format!(
                "sweepGapRatio must be in [0, 1), got {}",
                self.sweep_gap_ratio
            ));
        }
        if self.batch_step >= self.window_capacity {
            return fail(format!(
                "batchStep {} must be smaller than windowCapacity {}",
                self.batch_step, self.window_capacity
            ));
        }
        Ok(())
    }
    /// Free slots reopened by each eviction sweep.
    pub fn sweep_gap(&self) -> usize {
        (self.window_capacity as f64 * self.sweep_gap_ratio).floor() as usize
    }
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
    pub fn samples_per_tick(&self) -> usize {
        self.batch_step * self.num_channels
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn defaults_are_valid() {
        let config = ChartConfig::default();
        config.validate().unwrap();
        assert_eq!(config.sweep_gap(), 4_400);
        assert_eq!(config.samples_per_tick(), 8_800);
        assert_eq!(config.tick_interval(), Duration::from_millis(50));
    }
    #[test]
    fn partial_json_keeps_defaults() {
        let config: ChartConfig =
            serde_json::from_str(r#"{ "numChannels": 8, "sweepGapRatio": 0.1 }"#).unwrap();
        assert_eq!(config.num_channels, 8);
        assert_eq!(config.batch_step, 2_200);
        assert_eq!(config.sweep_gap(), 22_000);
    }
    #[test]
    fn rejects_out_of_range_values() {
        let bad = [
            ChartConfig {
                tick_interval_ms: 0,
                ..ChartConfig::default()
            },
            ChartConfig {
                batch_step: 0,
                ..ChartConfig::default()
            },
            ChartConfig {
                sweep_gap_ratio: 1.0,
                ..ChartConfig::default()
            },
            ChartConfig {
                sweep_gap_ratio: -0.1,
                ..ChartConfig::default()
            },
            ChartConfig {
                batch_step: 220_000,
                ..ChartConfig::default()
            },
        ];
        for config in bad {
            assert!(matches!(
                config.validate(),
                Err(ChartError::InvalidConfig(_))
            ));
        }
        let none = ChartConfig {
            num_channels: 0,
            ..ChartConfig::default()
        };
        assert_eq!(none.validate().unwrap_err(), ChartError::InvalidCount(0));
    }
    #[test]
    fn load_reports_missing_file() {
        let err = ChartConfig::load("/nonexistent/ecg-sweep.json").unwrap_err();
        assert!(err.to_string().contains("reading chart config"));
    }
    #[test]
    fn load_validates_file_contents() {
        let path = std::env::temp_dir().join(format!("ecg-sweep-{}.json", std::process::id()));
        fs::write(&path, r#"{ "batchStep": 500000 }"#).unwrap();
        let result = ChartConfig::load(&path);
        fs::remove_file(&path).ok();
        assert!(result.is_err());
    }
}
