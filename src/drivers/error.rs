use thiserror::Error;
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ChartError {
    #[error("append batch of {batch} samples cannot fit a buffer of capacity {capacity}")]
    CapacityViolation { batch: usize, capacity: usize },
    #[error("track count must be at least one, got {0}")]
    InvalidCount(usize),
    #[error("out-of-order append: index {next} does not follow {last}")]
    OutOfOrderAppend { last: u64, next: u64 },
    #[error("index/value length mismatch: {indices} indices, {values} values")]
    LengthMismatch { indices: usize, values: usize },
    #[error("sample table must hold at least one value")]
    EmptyTable,
    #[error("invalid chart configuration: {0}")]
    InvalidConfig(String),
    #[error("scheduler stopped after a failed tick: {0}")]
    SchedulerFaulted(Box<ChartError>),
    #[error("surface creation was abandoned before it completed")]
    SurfaceLost,
    #[error("chart session has been torn down")]
    SessionClosed,
    #[error("failed to render plot: {0}")]
    Plot(String),
}
impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for ChartError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        ChartError::Plot(format!("{value:?}"))
    }
}
impl From<image::ImageError> for ChartError {
    fn from(value: image::ImageError) -> Self {
        ChartError::Plot(value.to_string())
    }
}
