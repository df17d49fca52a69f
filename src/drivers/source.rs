use std::sync::Arc;
use crate::drivers::ChartError;
/// Contiguous run of logical indices with the values they resolve to.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SampleBatch {
    pub indices: Vec<u64>,
    pub values: Vec<f64>,
}
impl SampleBatch {
    pub fn len(&self) -> usize {
        self.indices.len()
    }
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
    /// Borrow `len` samples starting at `offset`, clamped to the batch end.
    pub fn slice(&self, offset: usize, len: usize) -> (&[u64], &[f64]) {
        let start = offset.min(self.len());
        let end = offset.saturating_add(len).min(self.len());
        (&self.indices[start..end], &self.values[start..end])
    }
}
/// Anything that can resolve a run of logical indices to sample values.
pub trait SampleSource {
    fn fetch_batch(&self, start_index: u64, count: usize) -> SampleBatch;
    /// Smallest and largest value the source can produce.
    fn value_range(&self) -> (f64, f64);
}
/// Pre-recorded values addressed circularly: index `i` reads slot `i mod len`.
#[derive(Clone, Debug)]
pub struct SampleTable {
    values: Arc<[f64]>,
    min: f64,
    max: f64,
}
impl SampleTable {
    pub fn new(values: impl Into<Arc<[f64]>>) -> Result<Self, ChartError> {
        let values = values.into();
        if values.is_empty() {
            return Err(ChartError::EmptyTable);
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Ok(Self { values, min, max })
    }
    pub fn len(&self) -> usize {
        self.values.len()
    }
    pub fn value_at(&self, index: u64) -> f64 {
        self.values[(index % self.values.len() as u64) as usize]
    }
}
impl SampleSource for SampleTable {
    fn fetch_batch(&self, start_index: u64, count: usize) -> SampleBatch {
        let mut indices = Vec::with_capacity(count);
        let mut values = Vec::with_capacity(count);
        for index in start_index..start_index + count as u64 {
            indices.push(index);
            values.push(self.value_at(index));
        }
        SampleBatch { indices, values }
    }
    fn value_range(&self) -> (f64, f64) {
        (self.min, self.max)
    }
}
