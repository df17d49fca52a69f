use std::mem;
use std::thread;
use std::time::Duration;
use log::{info, warn};
use crate::config::ChartConfig;
use crate::drivers::{
    axis, Band, ChannelBuffer, ChartError, Clock, MonotonicClock, PendingSurface, SampleSource,
    SeriesStyle, Surface, TickReport, UpdateScheduler,
};
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Initializing,
    Ready,
    TornDown,
}
/// Read-only view of one lane: its band, its style and the samples it shows.
pub struct Track<'a> {
    pub band: &'a Band,
    pub style: &'a SeriesStyle,
    pub buffer: &'a ChannelBuffer,
}
struct Session<S> {
    surface: S,
    bands: Vec<Band>,
    styles: Vec<SeriesStyle>,
    buffers: Vec<ChannelBuffer>,
}
impl<S: Surface> Session<S> {
    fn build(config: &ChartConfig, mut surface: S) -> Result<Self, ChartError> {
        let layout = axis::allocate(config.num_channels).and_then(|bands| {
            let buffers = (1..=bands.len())
                .map(|i| {
                    ChannelBuffer::new(
                        format!("series{i}"),
                        config.window_capacity,
                        config.sweep_gap(),
                    )
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok((bands, buffers))
        });
        let (bands, buffers) = match layout {
            Ok(layout) => layout,
            Err(err) => {
                surface.dispose();
                return Err(err);
            }
        };
        for band in &bands {
            surface.add_axis_band(band);
        }
        let styles: Vec<SeriesStyle> = (0..buffers.len()).map(SeriesStyle::for_track).collect();
        for ((buffer, band), style) in buffers.iter().zip(&bands).zip(&styles) {
            surface.bind_series(buffer.id(), &band.id, style);
        }
        Ok(Self {
            surface,
            bands,
            styles,
            buffers,
        })
    }
}
enum Lifecycle<S> {
    Initializing {
        pending: PendingSurface<S>,
        start_queued: bool,
        teardown_queued: bool,
    },
    Ready(Session<S>),
    TornDown,
}
/// Owns one chart session: the surface, the track buffers and the scheduler
/// feeding them.
///
/// Surface creation may still be running when the controller is built.
/// `start` and `teardown` requests made in that window are queued and
/// replayed as soon as setup completes; a queued teardown wins over a
/// queued start.
pub struct SurfaceController<S: Surface, Src: SampleSource, C: Clock = MonotonicClock> {
    config: ChartConfig,
    scheduler: UpdateScheduler<Src, C>,
    lifecycle: Lifecycle<S>,
}
impl<S: Surface, Src: SampleSource> SurfaceController<S, Src> {
    pub fn new(
        config: ChartConfig,
        source: Src,
        pending: PendingSurface<S>,
    ) -> Result<Self, ChartError> {
        Self::with_clock(config, source, pending, MonotonicClock)
    }
}
impl<S: Surface, Src: SampleSource, C: Clock> SurfaceController<S, Src, C> {
    pub fn with_clock(
        config: ChartConfig,
        source: Src,
        pending: PendingSurface<S>,
        clock: C,
    ) -> Result<Self, ChartError> {
        config.validate()?;
        let scheduler = UpdateScheduler::with_clock(
            source,
            config.tick_interval(),
            config.batch_step,
            config.num_channels,
            clock,
        );
        Ok(Self {
            config,
            scheduler,
            lifecycle: Lifecycle::Initializing {
                pending,
                start_queued: false,
                teardown_queued: false,
            },
        })
    }
    pub fn phase(&self) -> Phase {
        match self.lifecycle {
            Lifecycle::Initializing { .. } => Phase::Initializing,
            Lifecycle::Ready(_) => Phase::Ready,
            Lifecycle::TornDown => Phase::TornDown,
        }
    }
    pub fn config(&self) -> &ChartConfig {
        &self.config
    }
    pub fn scheduler(&self) -> &UpdateScheduler<Src, C> {
        &self.scheduler
    }
    pub fn surface(&self) -> Option<&S> {
        match &self.lifecycle {
            Lifecycle::Ready(session) => Some(&session.surface),
            _ => None,
        }
    }
    pub fn tracks(&self) -> Vec<Track<'_>> {
        match &self.lifecycle {
            Lifecycle::Ready(session) => session
                .bands
                .iter()
                .zip(&session.styles)
                .zip(&session.buffers)
                .map(|((band, style), buffer)| Track {
                    band,
                    style,
                    buffer,
                })
                .collect(),
            _ => Vec::new(),
        }
    }
    pub fn time_until_next_tick(&self) -> Option<Duration> {
        self.scheduler.time_until_next_tick()
    }
    pub fn start(&mut self) -> Result<(), ChartError> {
        match &mut self.lifecycle {
            Lifecycle::Initializing {
                start_queued,
                teardown_queued,
                ..
            } => {
                if *teardown_queued {
                    return Err(ChartError::SessionClosed);
                }
                *start_queued = true;
                info!("start requested during setup; queued");
                Ok(())
            }
            Lifecycle::Ready(_) => self.scheduler.start(),
            Lifecycle::TornDown => Err(ChartError::SessionClosed),
        }
    }
    /// Cancel the pending tick (or a queued start). Safe to call at any time.
    pub fn stop(&mut self) {
        if let Lifecycle::Initializing { start_queued, .. } = &mut self.lifecycle {
            *start_queued = false;
        }
        self.scheduler.stop();
    }
    pub fn teardown(&mut self) {
        self.scheduler.stop();
        match mem::replace(&mut self.lifecycle, Lifecycle::TornDown) {
            Lifecycle::Initializing { pending, .. } => {
                info!("teardown requested during setup; deferred until the surface arrives");
                self.lifecycle = Lifecycle::Initializing {
                    pending,
                    start_queued: false,
                    teardown_queued: true,
                };
            }
            Lifecycle::Ready(mut session) => {
                session.surface.dispose();
                info!(
                    "chart torn down after {} ticks (cursor {})",
                    self.scheduler.ticks(),
                    self.scheduler.cursor()
                );
            }
            Lifecycle::TornDown => {}
        }
    }
    /// Finish setup if the surface has arrived, then run the tick if one is due.
    pub fn poll(&mut self) -> Result<Option<TickReport>, ChartError> {
        if let Lifecycle::Initializing {
            pending,
            start_queued,
            teardown_queued,
        } = &self.lifecycle
        {
            let Some(created) = pending.try_take() else {
                return Ok(None);
            };
            let (start_queued, teardown_queued) = (*start_queued, *teardown_queued);
            self.finish_setup(created, start_queued, teardown_queued)?;
        }
        match &mut self.lifecycle {
            Lifecycle::Ready(session) => self.scheduler.poll(&mut session.buffers),
            _ => Ok(None),
        }
    }
    /// Block until surface creation resolves. No-op once past setup.
    pub fn wait_until_ready(&mut self) -> Result<(), ChartError> {
        if self.phase() != Phase::Initializing {
            return Ok(());
        }
        if let Lifecycle::Initializing {
            pending,
            start_queued,
            teardown_queued,
        } = mem::replace(&mut self.lifecycle, Lifecycle::TornDown)
        {
            self.finish_setup(pending.wait(), start_queued, teardown_queued)?;
        }
        Ok(())
    }
    fn finish_setup(
        &mut self,
        created: Result<S, ChartError>,
        start_queued: bool,
        teardown_queued: bool,
    ) -> Result<(), ChartError> {
        self.lifecycle = Lifecycle::TornDown;
        let surface = match created {
            Ok(surface) => surface,
            Err(err) => {
                warn!("surface creation failed: {err}");
                return if teardown_queued { Ok(()) } else { Err(err) };
            }
        };
        let mut session = Session::build(&self.config, surface)?;
        if teardown_queued {
            session.surface.dispose();
            info!("surface arrived after teardown request; disposed immediately");
            return Ok(());
        }
        info!(
            "chart ready: {} tracks, {} samples retained per track, sweep gap {}",
            session.buffers.len(),
            self.config.window_capacity,
            self.config.sweep_gap()
        );
        self.lifecycle = Lifecycle::Ready(session);
        if start_queued {
            self.scheduler.start()?;
        }
        Ok(())
    }
}
impl<S: Surface, Src: SampleSource, C: Clock> Drop for SurfaceController<S, Src, C> {
    fn drop(&mut self) {
        self.scheduler.stop();
        match mem::replace(&mut self.lifecycle, Lifecycle::TornDown) {
            Lifecycle::Ready(mut session) => session.surface.dispose(),
            Lifecycle::Initializing { pending, .. } => {
                info!("controller dropped during setup; surface will be disposed on arrival");
                thread::spawn(move || {
                    if let Ok(mut surface) = pending.wait() {
                        surface.dispose();
                    }
                });
            }
            Lifecycle::TornDown => {}
        }
    }
}
