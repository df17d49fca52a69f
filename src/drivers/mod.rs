// src/drivers/mod.rs
pub mod axis;
pub mod buffer;
pub mod controller;
pub mod dataset;
pub mod error;
pub mod plot;
pub mod scheduler;
pub mod source;
pub mod surface;
pub use axis::Band;
pub use buffer::ChannelBuffer;
pub use controller::{Phase, SurfaceController, Track};
pub use error::ChartError;
pub use plot::{render_tracks_png, PlotStyle};
pub use scheduler::{Clock, MonotonicClock, TickReport, UpdateScheduler};
pub use source::{SampleBatch, SampleSource, SampleTable};
pub use surface::{
    spawn_surface, LayoutRenderer, LayoutSurface, PendingSurface, SeriesStyle, Surface,
};
