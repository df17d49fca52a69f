use std::io::Cursor;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use plotters::prelude::*;
use crate::drivers::{ChartError, Track};
#[derive(Clone, Debug)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub background: RGBColor,
    /// Upper bound on points drawn per track; longer tracks are strided.
    pub max_points_per_track: usize,
}
impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 600,
            background: RGBColor(10, 10, 10),
            max_points_per_track: 4_000,
        }
    }
}
/// Scale `value` into `[0, 1]` given the source's value range.
pub fn normalize(value: f64, (min, max): (f64, f64)) -> f64 {
    if (max - min).abs() < f64::EPSILON {
        0.5
    } else {
        (value - min) / (max - min)
    }
}
pub fn stride_for(len: usize, max_points: usize) -> usize {
    (len / max_points.max(1)).max(1)
}
/// Draw every track in its band on a shared sweep axis and encode as PNG.
pub fn render_tracks_png(
    tracks: &[Track<'_>],
    value_range: (f64, f64),
    style: &PlotStyle,
) -> Result<Vec<u8>, ChartError> {
    let Some(first) = tracks.first() else {
        return Err(ChartError::Plot("chart has no tracks to draw".into()));
    };
    let capacity = first.buffer.capacity() as f64;
    let mut buffer = vec![0u8; (style.width * style.height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)?;
        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .build_cartesian_2d(0f64..capacity, 0f64..1f64)?;
        for track in tracks.iter().skip(1) {
            let y = track.band.range_start;
            chart.draw_series(LineSeries::new(
                vec![(0.0, y), (capacity, y)],
                &WHITE.mix(0.2),
            ))?;
        }
        for track in tracks {
            let [r, g, b] = track.style.color;
            let line = RGBColor(r, g, b).stroke_width(track.style.stroke_thickness.max(1.0) as u32);
            let stride = stride_for(track.buffer.len(), style.max_points_per_track);
            for segment in track.buffer.sweep_points() {
                let points = segment.iter().step_by(stride).map(|p| {
                    (
                        p.position as f64,
                        track.band.project(normalize(p.value, value_range)),
                    )
                });
                chart.draw_series(LineSeries::new(points, line))?;
            }
        }
        root.present()?;
    }
    encode_png(&buffer, style.width, style.height)
}
fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ChartError> {
    let image = ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, buffer.to_vec())
        .ok_or_else(|| ChartError::Plot("failed to allocate image buffer".into()))?;
    let mut output = Vec::new();
    let dynamic = DynamicImage::ImageRgb8(image);
    dynamic.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
    Ok(output)
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChartConfig;
    use crate::drivers::dataset::ecg_table;
    use crate::drivers::{LayoutSurface, PendingSurface, SampleSource, SurfaceController};
    #[test]
    fn normalize_handles_flat_range() {
        assert_eq!(normalize(3.0, (3.0, 3.0)), 0.5);
        assert_eq!(normalize(1.5, (1.0, 2.0)), 0.5);
    }
    #[test]
    fn stride_never_drops_below_one() {
        assert_eq!(stride_for(10, 4_000), 1);
        assert_eq!(stride_for(8_000, 4_000), 2);
        assert_eq!(stride_for(5, 0), 5);
    }
    #[test]
    fn empty_chart_is_an_error() {
        assert!(render_tracks_png(&[], (0.0, 1.0), &PlotStyle::default()).is_err());
    }
    #[test]
    fn renders_live_tracks_to_png() {
        let config = ChartConfig {
            num_channels: 3,
            batch_step: 200,
            window_capacity: 1_000,
            ..ChartConfig::default()
        };
        let table = ecg_table().unwrap();
        let range = table.value_range();
        let mut controller = SurfaceController::new(
            config,
            table,
            PendingSurface::ready(LayoutSurface::default()),
        )
        .unwrap();
        controller.start().unwrap();
        controller.poll().unwrap();
        let style = PlotStyle {
            width: 320,
            height: 200,
            ..PlotStyle::default()
        };
        let png = render_tracks_png(&controller.tracks(), range, &style).unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }
}
