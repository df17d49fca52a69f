// src/gui.rs
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use anyhow::{anyhow, Context, Result};
use eframe::egui;
use egui::Color32;
use egui_plot::{Line, MarkerShape, Plot, PlotPoints, Points};
use log::{error, info};
use crate::config::ChartConfig;
use crate::drivers::dataset::ecg_table;
use crate::drivers::plot::{normalize, stride_for};
use crate::drivers::{
    render_tracks_png, spawn_surface, LayoutRenderer, LayoutSurface, Phase, PlotStyle,
    SampleSource, SampleTable, SurfaceController, TickReport,
};
const MAX_POINTS_PER_TRACK: usize = 4_000;
// Repaint cadence while the surface is still being created.
const SETUP_REPAINT: Duration = Duration::from_millis(16);
pub struct SweepApp {
    controller: SurfaceController<LayoutSurface, SampleTable>,
    value_range: (f64, f64),
    last_report: Option<TickReport>,
    notice: Option<String>,
    snapshot_path: PathBuf,
}
impl SweepApp {
    pub fn new(config: ChartConfig, snapshot_path: PathBuf) -> Result<Self> {
        let table = ecg_table()?;
        let value_range = table.value_range();
        let pending = spawn_surface(LayoutRenderer, &config.container_id);
        let mut controller = SurfaceController::new(config, table, pending)?;
        // 表面就绪后自动开始
        controller.start()?;
        Ok(Self {
            controller,
            value_range,
            last_report: None,
            notice: None,
            snapshot_path,
        })
    }
    fn status_line(&self) -> String {
        let scheduler = self.controller.scheduler();
        match self.controller.phase() {
            Phase::Initializing => "Setting up surface...".to_owned(),
            Phase::TornDown => "Torn down".to_owned(),
            Phase::Ready => match scheduler.last_error() {
                Some(err) => format!("Stopped after error: {err}"),
                None if scheduler.is_running() => "Running".to_owned(),
                None => "Stopped".to_owned(),
            },
        }
    }
    fn save_snapshot(&self) -> Result<PathBuf> {
        let png = render_tracks_png(
            &self.controller.tracks(),
            self.value_range,
            &PlotStyle::default(),
        )?;
        fs::write(&self.snapshot_path, png)
            .with_context(|| format!("writing snapshot {}", self.snapshot_path.display()))?;
        info!("snapshot saved to {}", self.snapshot_path.display());
        Ok(self.snapshot_path.clone())
    }
    fn draw_controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let running = self.controller.scheduler().is_running();
            if ui
                .add_enabled(!running, egui::Button::new("▶ Start"))
                .clicked()
            {
                self.notice = self.controller.start().err().map(|e| e.to_string());
            }
            if ui.add_enabled(running, egui::Button::new("⏹ Stop")).clicked() {
                self.controller.stop();
                self.notice = None;
            }
            if ui.button("📷 Snapshot").clicked() {
                self.notice = Some(match self.save_snapshot() {
                    Ok(path) => format!("Saved {}", path.display()),
                    Err(err) => format!("Snapshot failed: {err:#}"),
                });
            }
            ui.separator();
            ui.label(self.status_line());
            if let Some(report) = &self.last_report {
                ui.label(format!("tick {} | cursor {}", report.tick, report.cursor));
            }
            if let Some(track) = self.controller.tracks().first() {
                ui.label(format!(
                    "retained {}/{} | sweeps {}",
                    track.buffer.len(),
                    track.buffer.capacity(),
                    track.buffer.sweeps()
                ));
            }
            if let Some(notice) = &self.notice {
                ui.label(notice.as_str());
            }
        });
    }
    fn draw_tracks(&self, ui: &mut egui::Ui) {
        let capacity = self.controller.config().window_capacity as f64;
        let tracks = self.controller.tracks();
        Plot::new("sweep_plot")
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .include_x(0.0)
            .include_x(capacity)
            .include_y(0.0)
            .include_y(1.0)
            .show(ui, |plot_ui| {
                for track in &tracks {
                    let [r, g, b] = track.style.color;
                    let color = Color32::from_rgb(r, g, b);
                    let stride = stride_for(track.buffer.len(), MAX_POINTS_PER_TRACK);
                    let project = |value: f64| track.band.project(normalize(value, self.value_range));
                    let segments = track.buffer.sweep_points();
                    for segment in &segments {
                        let points: Vec<[f64; 2]> = segment
                            .iter()
                            .step_by(stride)
                            .map(|p| {
                                [p.position as f64, project(p.value)]
                            })
                            .collect();
                        plot_ui.line(
                            Line::new(PlotPoints::new(points))
                                .color(color)
                                .width(track.style.stroke_thickness),
                        );
                    }
                    // Marker on the sweep head.
                    let head = segments.last().and_then(|s| s.last());
                    if let (Some(head), Some(marker)) = (head, track.style.point_marker) {
                        let [r, g, b] = marker.stroke;
                        plot_ui.points(
                            Points::new(vec![[head.position as f64, project(head.value)]])
                                .shape(MarkerShape::Circle)
                                .filled(false)
                                .radius(marker.width.max(marker.height) / 2.0)
                                .color(Color32::from_rgb(r, g, b)),
                        );
                    }
                }
            });
    }
}
impl eframe::App for SweepApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        match self.controller.poll() {
            Ok(Some(report)) => self.last_report = Some(report),
            Ok(None) => {}
            Err(err) => error!("chart stopped: {err}"),
        }
        egui::TopBottomPanel::top("controls").show(ctx, |ui| self.draw_controls(ui));
        egui::CentralPanel::default().show(ctx, |ui| self.draw_tracks(ui));
        match self.controller.time_until_next_tick() {
            Some(wait) => ctx.request_repaint_after(wait),
            None if self.controller.phase() == Phase::Initializing => {
                ctx.request_repaint_after(SETUP_REPAINT)
            }
            None => {}
        }
    }
}
pub fn run(config: ChartConfig, snapshot_path: PathBuf) -> Result<()> {
    let app = SweepApp::new(config, snapshot_path)?;
    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([1200.0, 760.0])
        .with_min_inner_size([640.0, 400.0])
        .with_title("ECG sweep");
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    eframe::run_native(
        "ecg-sweep",
        options,
        Box::new(move |_cc| Box::new(app)),
    )
    .map_err(|err| anyhow!("window closed with error: {err}"))
}
