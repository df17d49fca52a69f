use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread;
use log::debug;
use crate::drivers::{Band, ChartError};
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointMarker {
    pub width: f32,
    pub height: f32,
    pub stroke: [u8; 3],
}
#[derive(Clone, Debug, PartialEq)]
pub struct SeriesStyle {
    pub stroke_thickness: f32,
    pub color: [u8; 3],
    pub point_marker: Option<PointMarker>,
}
const PALETTE: [[u8; 3]; 6] = [
    [0x5b, 0x8f, 0xff],
    [0xff, 0x8c, 0x42],
    [0x54, 0xc7, 0x6b],
    [0xd1, 0x5b, 0xff],
    [0x00, 0xdd, 0xdd],
    [0xff, 0xd7, 0x00],
];
impl SeriesStyle {
    pub fn for_track(track: usize) -> Self {
        Self {
            stroke_thickness: 2.0,
            color: PALETTE[track % PALETTE.len()],
            point_marker: Some(PointMarker {
                width: 8.0,
                height: 8.0,
                stroke: [0xff, 0xc0, 0xcb],
            }),
        }
    }
}
/// The drawing target a chart session binds its tracks to.
pub trait Surface: Send + 'static {
    fn add_axis_band(&mut self, band: &Band);
    fn bind_series(&mut self, series_id: &str, band_id: &str, style: &SeriesStyle);
    fn dispose(&mut self);
}
pub trait Renderer: Send + 'static {
    type Surface: Surface;
    fn create_surface(&self, container_id: &str) -> Result<Self::Surface, ChartError>;
}
/// A surface whose creation may still be in flight.
pub struct PendingSurface<S> {
    rx: Receiver<Result<S, ChartError>>,
}
impl<S> PendingSurface<S> {
    pub fn channel() -> (Sender<Result<S, ChartError>>, Self) {
        let (tx, rx) = channel();
        (tx, Self { rx })
    }
    pub fn ready(surface: S) -> Self {
        let (tx, pending) = Self::channel();
        tx.send(Ok(surface)).ok();
        pending
    }
    /// `None` while creation is still running. A creator that went away
    /// without answering yields `SurfaceLost`.
    pub fn try_take(&self) -> Option<Result<S, ChartError>> {
        match self.rx.try_recv() {
            Ok(created) => Some(created),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(ChartError::SurfaceLost)),
        }
    }
    pub fn wait(self) -> Result<S, ChartError> {
        self.rx.recv().unwrap_or(Err(ChartError::SurfaceLost))
    }
}
/// Create the surface on a worker thread and hand back the pending result.
pub fn spawn_surface<R: Renderer>(renderer: R, container_id: &str) -> PendingSurface<R::Surface> {
    let (tx, pending) = PendingSurface::channel();
    let container_id = container_id.to_owned();
    thread::spawn(move || {
        debug!("creating surface for container '{container_id}'");
        tx.send(renderer.create_surface(&container_id)).ok();
    });
    pending
}
#[derive(Clone, Debug, PartialEq)]
pub struct SeriesBinding {
    pub series_id: String,
    pub band_id: String,
    pub style: SeriesStyle,
}
/// Surface that records the chart layout; the egui window and the PNG
/// exporter both draw from what it holds.
#[derive(Clone, Debug, Default)]
pub struct LayoutSurface {
    pub container_id: String,
    pub bands: Vec<Band>,
    pub series: Vec<SeriesBinding>,
    pub disposed: bool,
}
impl Surface for LayoutSurface {
    fn add_axis_band(&mut self, band: &Band) {
        self.bands.push(band.clone());
    }
    fn bind_series(&mut self, series_id: &str, band_id: &str, style: &SeriesStyle) {
        self.series.push(SeriesBinding {
            series_id: series_id.to_owned(),
            band_id: band_id.to_owned(),
            style: style.clone(),
        });
    }
    fn dispose(&mut self) {
        if !self.disposed {
            debug!("disposing surface '{}'", self.container_id);
        }
        self.disposed = true;
    }
}
#[derive(Clone, Copy, Debug, Default)]
pub struct LayoutRenderer;
impl Renderer for LayoutRenderer {
    type Surface = LayoutSurface;
    fn create_surface(&self, container_id: &str) -> Result<LayoutSurface, ChartError> {
        Ok(LayoutSurface {
            container_id: container_id.to_owned(),
            ..LayoutSurface::default()
        })
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::axis;
    #[test]
    fn spawned_surface_arrives() {
        let surface = spawn_surface(LayoutRenderer, "chart").wait().unwrap();
        assert_eq!(surface.container_id, "chart");
        assert!(!surface.disposed);
    }
    #[test]
    fn pending_reports_empty_then_value() {
        let (tx, pending) = PendingSurface::<LayoutSurface>::channel();
        assert!(pending.try_take().is_none());
        tx.send(Ok(LayoutSurface::default())).unwrap();
        assert!(pending.try_take().unwrap().is_ok());
    }
    #[test]
    fn dropped_creator_means_surface_lost() {
        let (tx, pending) = PendingSurface::<LayoutSurface>::channel();
        drop(tx);
        assert_eq!(pending.try_take().unwrap().unwrap_err(), ChartError::SurfaceLost);
    }
    #[test]
    fn layout_surface_records_bindings_and_disposal() {
        let mut surface = LayoutSurface::default();
        for band in axis::allocate(2).unwrap() {
            surface.add_axis_band(&band);
        }
        surface.bind_series("series2", "yAxis2", &SeriesStyle::for_track(1));
        assert_eq!(surface.bands.len(), 2);
        assert_eq!(surface.series[0].band_id, "yAxis2");
        assert_eq!(surface.series[0].style.color, SeriesStyle::for_track(7).color);
        surface.dispose();
        surface.dispose();
        assert!(surface.disposed);
    }
}
