use crate::drivers::ChartError;
/// One horizontal lane of the stacked chart, as a slice of `[0, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Band {
    pub id: String,
    pub range_start: f64,
    pub range_end: f64,
}
impl Band {
    pub fn height(&self) -> f64 {
        self.range_end - self.range_start
    }
    /// Map a value in `[0, 1]` into this band.
    pub fn project(&self, normalized: f64) -> f64 {
        self.range_start + normalized.clamp(0.0, 1.0) * self.height()
    }
}
/// Split the vertical space into `count` equal, gapless bands in track order.
pub fn allocate(count: usize) -> Result<Vec<Band>, ChartError> {
    if count == 0 {
        return Err(ChartError::InvalidCount(count));
    }
    // Both edges go through the same expression so neighbours share exact bounds.
    let edge = |i: usize| i as f64 / count as f64;
    Ok((1..=count)
        .map(|i| Band {
            id: format!("yAxis{i}"),
            range_start: edge(i - 1),
            range_end: edge(i),
        })
        .collect())
}
