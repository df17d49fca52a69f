use std::time::{Duration, Instant};
use log::{debug, error, info};
use crate::drivers::{ChannelBuffer, ChartError, SampleSource};
/// Time source for the scheduler, swappable so tests can drive time by hand.
pub trait Clock {
    fn now(&self) -> Instant;
}
#[derive(Clone, Copy, Debug, Default)]
pub struct MonotonicClock;
impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
/// The armed timer. Dropping it cancels the pending tick.
#[derive(Debug)]
pub struct TimerHandle {
    due: Instant,
}
impl TimerHandle {
    pub fn due(&self) -> Instant {
        self.due
    }
}
#[derive(Debug)]
pub enum SchedulerState {
    Idle,
    Running(TimerHandle),
}
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u64,
    /// Logical cursor after this tick.
    pub cursor: u64,
    pub appended: usize,
    pub evicted: usize,
}
/// Self-rescheduling driver that moves samples from a source into the track buffers.
///
/// The scheduler is polled cooperatively. A tick runs only when the armed
/// timer is due, and the next one is armed `interval` after the tick
/// *finishes*, so real spacing is `interval + processing time`.
pub struct UpdateScheduler<S: SampleSource, C: Clock = MonotonicClock> {
    source: S,
    clock: C,
    interval: Duration,
    step: usize,
    num_channels: usize,
    cursor: u64,
    ticks: u64,
    state: SchedulerState,
    last_error: Option<ChartError>,
}
impl<S: SampleSource> UpdateScheduler<S> {
    pub fn new(source: S, interval: Duration, step: usize, num_channels: usize) -> Self {
        Self::with_clock(source, interval, step, num_channels, MonotonicClock)
    }
}
impl<S: SampleSource, C: Clock> UpdateScheduler<S, C> {
    pub fn with_clock(
        source: S,
        interval: Duration,
        step: usize,
        num_channels: usize,
        clock: C,
    ) -> Self {
        Self {
            source,
            clock,
            interval,
            step,
            num_channels,
            cursor: 0,
            ticks: 0,
            state: SchedulerState::Idle,
            last_error: None,
        }
    }
    /// Arm the timer so the next poll ticks immediately.
    ///
    /// A running scheduler is stopped first, so only one timer is ever armed.
    /// After a failed tick the scheduler stays down and this returns the fault.
    pub fn start(&mut self) -> Result<(), ChartError> {
        if let Some(err) = &self.last_error {
            return Err(ChartError::SchedulerFaulted(Box::new(err.clone())));
        }
        if self.is_running() {
            self.stop();
        }
        self.state = SchedulerState::Running(TimerHandle {
            due: self.clock.now(),
        });
        info!(
            "scheduler started: {} channels x {} samples every {:?}",
            self.num_channels, self.step, self.interval
        );
        Ok(())
    }
    pub fn stop(&mut self) {
        if let SchedulerState::Running(handle) =
            std::mem::replace(&mut self.state, SchedulerState::Idle)
        {
            debug!("scheduler stopped, cancelled tick due at {:?}", handle.due());
        }
    }
    pub fn is_running(&self) -> bool {
        matches!(self.state, SchedulerState::Running(_))
    }
    pub fn cursor(&self) -> u64 {
        self.cursor
    }
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
    pub fn last_error(&self) -> Option<&ChartError> {
        self.last_error.as_ref()
    }
    pub fn time_until_next_tick(&self) -> Option<Duration> {
        match &self.state {
            SchedulerState::Running(handle) => {
                Some(handle.due().saturating_duration_since(self.clock.now()))
            }
            SchedulerState::Idle => None,
        }
    }
    /// Run the pending tick if it is due.
    ///
    /// On failure the scheduler drops to `Idle`, keeps the error for
    /// `last_error`, and returns it. No further tick is armed.
    pub fn poll(&mut self, buffers: &mut [ChannelBuffer]) -> Result<Option<TickReport>, ChartError> {
        let due = match &self.state {
            SchedulerState::Running(handle) => handle.due() <= self.clock.now(),
            SchedulerState::Idle => false,
        };
        if !due {
            return Ok(None);
        }
        match self.tick(buffers) {
            Ok(report) => {
                self.state = SchedulerState::Running(TimerHandle {
                    due: self.clock.now() + self.interval,
                });
                Ok(Some(report))
            }
            Err(err) => {
                error!("tick {} failed, stopping scheduler: {err}", self.ticks + 1);
                self.state = SchedulerState::Idle;
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }
    fn tick(&mut self, buffers: &mut [ChannelBuffer]) -> Result<TickReport, ChartError> {
        if buffers.len() != self.num_channels {
            return Err(ChartError::InvalidConfig(format!(
                "scheduler drives {} channels but {} buffers were supplied",
                self.num_channels,
                buffers.len()
            )));
        }
        let count = self.step * self.num_channels;
        let batch = self.source.fetch_batch(self.cursor, count);
        self.cursor += count as u64;
        let mut evicted = 0;
        for (channel, buffer) in buffers.iter_mut().enumerate() {
            let (indices, values) = batch.slice(channel * self.step, self.step);
            evicted += buffer.append(indices, values)?;
        }
        self.ticks += 1;
        Ok(TickReport {
            tick: self.ticks,
            cursor: self.cursor,
            appended: batch.len(),
            evicted,
        })
    }
}
#[cfg(test)]
pub(crate) mod test_clock {
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::{Duration, Instant};
    use super::Clock;
    /// Shared hand-driven clock; clones observe the same time.
    #[derive(Clone)]
    pub(crate) struct ManualClock(Rc<Cell<Instant>>);
    impl ManualClock {
        pub(crate) fn new() -> Self {
            Self(Rc::new(Cell::new(Instant::now())))
        }
        pub(crate) fn advance_ms(&self, ms: u64) {
            self.0.set(self.0.get() + Duration::from_millis(ms));
        }
    }
    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.0.get()
        }
    }
}
#[cfg(test)]
mod tests {
    use super::test_clock::ManualClock;
    use super::*;
    use crate::drivers::SampleTable;
    fn setup(
        step: usize,
        channels: usize,
        capacity: usize,
    ) -> (UpdateScheduler<SampleTable, ManualClock>, Vec<ChannelBuffer>, ManualClock) {
        let table = SampleTable::new((0..5000).map(|v| v as f64).collect::<Vec<_>>()).unwrap();
        let clock = ManualClock::new();
        let scheduler = UpdateScheduler::with_clock(
            table,
            Duration::from_millis(50),
            step,
            channels,
            clock.clone(),
        );
        let buffers = (0..channels)
            .map(|i| ChannelBuffer::new(format!("series{i}"), capacity, capacity / 10).unwrap())
            .collect();
        (scheduler, buffers, clock)
    }
    #[test]
    fn idle_scheduler_never_ticks() {
        let (mut scheduler, mut buffers, clock) = setup(4, 2, 100);
        clock.advance_ms(1_000);
        assert_eq!(scheduler.poll(&mut buffers).unwrap(), None);
        assert!(buffers.iter().all(|b| b.is_empty()));
    }
    #[test]
    fn tick_slices_batch_contiguously_across_channels() {
        let (mut scheduler, mut buffers, _clock) = setup(3, 2, 100);
        scheduler.start().unwrap();
        let report = scheduler.poll(&mut buffers).unwrap().unwrap();
        assert_eq!(
            report,
            TickReport {
                tick: 1,
                cursor: 6,
                appended: 6,
                evicted: 0
            }
        );
        let ch0: Vec<u64> = buffers[0].iter().map(|s| s.index).collect();
        let ch1: Vec<u64> = buffers[1].iter().map(|s| s.index).collect();
        assert_eq!(ch0, vec![0, 1, 2]);
        assert_eq!(ch1, vec![3, 4, 5]);
    }
    #[test]
    fn next_tick_waits_a_full_interval() {
        let (mut scheduler, mut buffers, clock) = setup(2, 1, 100);
        scheduler.start().unwrap();
        assert!(scheduler.poll(&mut buffers).unwrap().is_some());
        clock.advance_ms(49);
        assert!(scheduler.poll(&mut buffers).unwrap().is_none());
        assert_eq!(
            scheduler.time_until_next_tick(),
            Some(Duration::from_millis(1))
        );
        clock.advance_ms(1);
        assert!(scheduler.poll(&mut buffers).unwrap().is_some());
        assert_eq!(scheduler.cursor(), 4);
    }
    #[test]
    fn stop_twice_is_a_no_op() {
        let (mut scheduler, mut buffers, clock) = setup(2, 1, 100);
        scheduler.start().unwrap();
        scheduler.stop();
        scheduler.stop();
        assert!(!scheduler.is_running());
        clock.advance_ms(500);
        assert!(scheduler.poll(&mut buffers).unwrap().is_none());
        assert_eq!(scheduler.time_until_next_tick(), None);
    }
    #[test]
    fn restart_replaces_the_armed_timer() {
        let (mut scheduler, mut buffers, clock) = setup(2, 1, 1_000);
        scheduler.start().unwrap();
        assert!(scheduler.poll(&mut buffers).unwrap().is_some());
        clock.advance_ms(10);
        scheduler.start().unwrap();
        assert!(scheduler.poll(&mut buffers).unwrap().is_some());
        // The first timer (due at +50ms) must not fire; the new one is due at +60ms.
        clock.advance_ms(40);
        assert!(scheduler.poll(&mut buffers).unwrap().is_none());
        clock.advance_ms(10);
        assert!(scheduler.poll(&mut buffers).unwrap().is_some());
        assert!(scheduler.poll(&mut buffers).unwrap().is_none());
        assert_eq!(scheduler.ticks(), 3);
    }
    #[test]
    fn failed_tick_stops_and_stays_inspectable() {
        // Each channel slice of 10 cannot fit a capacity-10 buffer.
        let (mut scheduler, mut buffers, clock) = setup(10, 2, 10);
        scheduler.start().unwrap();
        let err = scheduler.poll(&mut buffers).unwrap_err();
        assert_eq!(
            err,
            ChartError::CapacityViolation {
                batch: 10,
                capacity: 10
            }
        );
        assert!(!scheduler.is_running());
        assert_eq!(scheduler.last_error(), Some(&err));
        clock.advance_ms(1_000);
        assert!(scheduler.poll(&mut buffers).unwrap().is_none());
        assert_eq!(
            scheduler.start().unwrap_err(),
            ChartError::SchedulerFaulted(Box::new(err))
        );
    }
    #[test]
    fn buffer_count_must_match_channels() {
        let (mut scheduler, mut buffers, _clock) = setup(2, 3, 100);
        buffers.pop();
        scheduler.start().unwrap();
        assert!(matches!(
            scheduler.poll(&mut buffers),
            Err(ChartError::InvalidConfig(_))
        ));
    }
}
