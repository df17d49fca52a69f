use std::collections::VecDeque;
use log::debug;
use crate::drivers::ChartError;
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub index: u64,
    pub value: f64,
}
/// A live sample placed on the sweep axis `[0, capacity)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SweepPoint {
    pub position: usize,
    pub value: f64,
}
/// Bounded per-track sample store with gap-sweep eviction.
///
/// Samples accumulate until the buffer is full, then the oldest ones are
/// dropped in a single sweep that leaves exactly `gap` free slots. The free
/// region is what shows up as the blank band ahead of the sweep head.
pub struct ChannelBuffer {
    id: String,
    samples: VecDeque<Sample>,
    capacity: usize,
    gap: usize,
    last_index: Option<u64>,
    appended: u64,
    sweeps: u64,
}
impl ChannelBuffer {
    pub fn new(id: impl Into<String>, capacity: usize, gap: usize) -> Result<Self, ChartError> {
        if capacity == 0 {
            return Err(ChartError::InvalidConfig(
                "buffer capacity must be greater than zero".into(),
            ));
        }
        if gap >= capacity {
            return Err(ChartError::InvalidConfig(format!(
                "sweep gap {gap} must be smaller than capacity {capacity}"
            )));
        }
        Ok(Self {
            id: id.into(),
            samples: VecDeque::with_capacity(capacity),
            capacity,
            gap,
            last_index: None,
            appended: 0,
            sweeps: 0,
        })
    }
    /// Append a run of samples and sweep if the buffer filled up.
    ///
    /// Indices must strictly increase, both within the run and relative to
    /// the last sample ever appended. The whole run is validated before
    /// anything is stored. Returns the number of samples evicted.
    pub fn append(&mut self, indices: &[u64], values: &[f64]) -> Result<usize, ChartError> {
        if indices.len() != values.len() {
            return Err(ChartError::LengthMismatch {
                indices: indices.len(),
                values: values.len(),
            });
        }
        if indices.len() >= self.capacity {
            return Err(ChartError::CapacityViolation {
                batch: indices.len(),
                capacity: self.capacity,
            });
        }
        let mut last = self.last_index;
        for &next in indices {
            if let Some(last) = last {
                if next <= last {
                    return Err(ChartError::OutOfOrderAppend { last, next });
                }
            }
            last = Some(next);
        }
        self.samples.extend(
            indices
                .iter()
                .zip(values)
                .map(|(&index, &value)| Sample { index, value }),
        );
        self.last_index = last;
        self.appended += indices.len() as u64;
        if self.samples.len() >= self.capacity {
            Ok(self.sweep())
        } else {
            Ok(0)
        }
    }
    fn sweep(&mut self) -> usize {
        let keep = self.capacity - self.gap;
        let evict = self.samples.len().saturating_sub(keep);
        if evict > 0 {
            self.samples.drain(..evict);
            self.sweeps += 1;
            debug!(
                "{}: sweep #{} evicted {} samples, {} retained",
                self.id,
                self.sweeps,
                evict,
                self.samples.len()
            );
        }
        evict
    }
    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn len(&self) -> usize {
        self.samples.len()
    }
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
    pub fn capacity(&self) -> usize {
        self.capacity
    }
    pub fn gap(&self) -> usize {
        self.gap
    }
    pub fn free_space(&self) -> usize {
        self.capacity - self.samples.len()
    }
    pub fn sweeps(&self) -> u64 {
        self.sweeps
    }
    pub fn oldest(&self) -> Option<&Sample> {
        self.samples.front()
    }
    pub fn newest(&self) -> Option<&Sample> {
        self.samples.back()
    }
    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }
    /// Live samples laid out as the sweep display draws them.
    ///
    /// A sample's position is its append ordinal modulo capacity; a new
    /// segment starts wherever the position wraps back to zero.
    pub fn sweep_points(&self) -> Vec<Vec<SweepPoint>> {
        let first_ordinal = self.appended - self.samples.len() as u64;
        let mut segments: Vec<Vec<SweepPoint>> = Vec::new();
        let mut current = Vec::new();
        for (offset, sample) in self.samples.iter().enumerate() {
            let position = ((first_ordinal + offset as u64) % self.capacity as u64) as usize;
            if position == 0 && !current.is_empty() {
                segments.push(std::mem::take(&mut current));
            }
            current.push(SweepPoint {
                position,
                value: sample.value,
            });
        }
        if !current.is_empty() {
            segments.push(current);
        }
        segments
    }
}
