//! The playback state machine
//!
//! [`PlaybackController`] walks a bound dataset either one tone per point
//! (discrete) or as a single gliding sweep (continuous). It is a cheap
//! `Clone` handle; every clone drives the same traversal.
//!
//! Collaborators are called while the controller's lock is held, so an
//! announcer or focus target must never call back into the controller.

use log::{debug, error, info, warn};
use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::Instant;

use super::events::PlaybackEvent;
use super::keys::NavigationKey;
use super::services::{Announcer, FocusTarget, Services, SweepHandle, ToneRenderer};
use super::state::{clamp_speed, PlaybackMode, PlaybackState};
use super::timer::TimerSlot;
use crate::config::SonifyConfig;
use crate::data::{Accessor, DataPoint};
use crate::describe::DescriptionGenerator;
use crate::error::Result;
use crate::mapping::{Marker, SweepParameters, ValueMapper};

/// Pause between the summary announcement and the first sound
pub const SETTLE_DELAY: Duration = Duration::from_millis(100);

/// How often the continuous-mode tracker samples sweep progress
pub const TRACK_INTERVAL: Duration = Duration::from_millis(16);

/// A continuous sweep narrates roughly this many points
const NARRATION_STOPS: usize = 5;

const EVENT_CAPACITY: usize = 64;

struct ActiveSweep {
    handle: Box<dyn SweepHandle>,
    params: SweepParameters,
    start: usize,
    started: Instant,
}

impl ActiveSweep {
    fn duration(&self) -> Duration {
        secs(self.params.duration)
    }
}

struct Inner {
    config: SonifyConfig,
    points: Vec<DataPoint>,
    mapper: ValueMapper,
    describer: DescriptionGenerator,
    state: PlaybackState,
    /// Mode of the traversal in progress; `state.mode` applies from the next play
    running: PlaybackMode,
    /// Bumped whenever an in-flight `play()` must give up
    session: u64,
    initialized: bool,
    step: TimerSlot,
    /// Deadline of the step last scheduled; the next one is chained from it
    step_due: Option<Instant>,
    tracker: TimerSlot,
    sweep: Option<ActiveSweep>,
    renderer: Arc<dyn ToneRenderer>,
    announcer: Arc<dyn Announcer>,
    focus: Arc<dyn FocusTarget>,
    events: broadcast::Sender<PlaybackEvent>,
    this: Weak<Mutex<Inner>>,
}

/// Drives playback of one dataset
#[derive(Clone)]
pub struct PlaybackController {
    inner: Arc<Mutex<Inner>>,
}

impl PlaybackController {
    /// Bind `points` and build a controller. An empty dataset produces a
    /// controller on which every operation is a no-op.
    pub fn new(points: Vec<DataPoint>, config: SonifyConfig, services: Services) -> Self {
        Self::build(points, config, services, None)
    }

    /// Like [`new`](Self::new), reading each point's value through `accessor`
    /// instead of the configured pitch field
    pub fn with_value_accessor(
        points: Vec<DataPoint>,
        config: SonifyConfig,
        services: Services,
        accessor: Accessor,
    ) -> Self {
        Self::build(points, config, services, Some(accessor))
    }

    fn build(
        points: Vec<DataPoint>,
        config: SonifyConfig,
        services: Services,
        accessor: Option<Accessor>,
    ) -> Self {
        let mut mapper = ValueMapper::new(&config);
        let mut describer = DescriptionGenerator::new(&config);
        if let Some(accessor) = accessor {
            mapper = mapper.with_pitch_accessor(accessor.clone());
            describer = describer.with_value_accessor(accessor);
        }

        let state = PlaybackState {
            mode: config.mode,
            ..PlaybackState::default()
        };
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        let inner = Arc::new_cyclic(|this| {
            Mutex::new(Inner {
                running: config.mode,
                config,
                points: Vec::new(),
                mapper,
                describer,
                state,
                session: 0,
                initialized: false,
                step: TimerSlot::default(),
                step_due: None,
                tracker: TimerSlot::default(),
                sweep: None,
                renderer: Arc::from(services.renderer),
                announcer: Arc::from(services.announcer),
                focus: Arc::from(services.focus),
                events,
                this: this.clone(),
            })
        });

        let controller = Self { inner };
        controller.bind(points);
        controller
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        lock(&self.inner)
    }

    /// Replace the dataset. Cancels any traversal and resets to idle;
    /// mode and speed are kept.
    pub fn bind(&self, points: Vec<DataPoint>) {
        let mut inner = self.lock();
        inner.halt();
        inner.state = PlaybackState {
            mode: inner.state.mode,
            speed: inner.state.speed,
            ..PlaybackState::default()
        };

        if points.is_empty() {
            warn!("No data points to sonify; playback disabled");
        } else {
            debug!("Bound {} data points", points.len());
        }
        inner.mapper.analyze(&points);
        inner.points = points;
    }

    /// Start or resume playback.
    ///
    /// From idle this announces the summary, waits [`SETTLE_DELAY`], plays the
    /// start marker and then the first point. From paused it continues with
    /// the point after the current one. Fails only if audio output cannot be
    /// initialized or resumed.
    pub async fn play(&self) -> Result<()> {
        let (renderer, session, fresh, was_paused) = {
            let mut inner = self.lock();
            if inner.points.is_empty() || inner.state.playing {
                return Ok(());
            }
            if !inner.initialized {
                if let Err(e) = inner.renderer.init() {
                    error!("Audio initialization failed: {}", e);
                    return Err(e);
                }
                inner.initialized = true;
            }

            inner.session = inner.session.wrapping_add(1);
            let was_paused = inner.state.paused;
            inner.state.playing = true;
            inner.state.paused = false;
            inner.running = inner.state.mode;
            (
                Arc::clone(&inner.renderer),
                inner.session,
                inner.state.index < 0,
                was_paused,
            )
        };

        if let Err(e) = renderer.resume().await {
            error!("Audio output could not be resumed: {}", e);
            let mut inner = self.lock();
            if inner.session == session {
                inner.state.playing = false;
                inner.state.paused = was_paused;
            }
            return Err(e);
        }

        if fresh {
            {
                let inner = self.lock();
                if inner.session != session {
                    return Ok(());
                }
                info!(
                    "Starting {} playback of {} points",
                    inner.running,
                    inner.points.len()
                );
                if inner.config.accessibility.announce_summary {
                    let summary = inner.describer.summarize(&inner.points);
                    inner.announcer.announce(&summary);
                }
            }

            tokio::time::sleep(SETTLE_DELAY).await;

            let marker_played = {
                let inner = self.lock();
                if inner.session != session {
                    return Ok(());
                }
                if inner.config.markers.start {
                    inner.renderer.play_marker(Marker::Start);
                }
                inner.config.markers.start
            };
            if marker_played {
                tokio::time::sleep(secs(Marker::Start.tone().duration)).await;
            }
        }

        let mut inner = self.lock();
        if inner.session != session {
            return Ok(());
        }
        if fresh {
            inner.emit(PlaybackEvent::Started);
        }
        inner.begin();
        Ok(())
    }

    /// Pause, keeping the current position
    pub fn pause(&self) {
        self.lock().pause();
    }

    /// Stop and reset to the beginning. No end marker is played.
    pub fn stop(&self) {
        self.lock().stop();
    }

    /// Pause if playing, otherwise play
    pub async fn toggle(&self) -> Result<()> {
        if self.is_playing() {
            self.pause();
            Ok(())
        } else {
            self.play().await
        }
    }

    /// Move to the next point; from idle this is the first point
    pub fn next(&self) {
        let mut inner = self.lock();
        let len = inner.points.len();
        if len == 0 {
            return;
        }
        let index = inner.state.index;
        let target = if index < 0 {
            0
        } else {
            (index as usize + 1).min(len - 1)
        };
        if target as isize != index {
            inner.seek(target);
        }
    }

    /// Move to the previous point, stopping at the first
    pub fn previous(&self) {
        let mut inner = self.lock();
        if inner.points.is_empty() {
            return;
        }
        let index = inner.state.index;
        let target = (index - 1).max(0);
        if target != index {
            inner.seek(target as usize);
        }
    }

    pub fn first(&self) {
        self.seek(0);
    }

    pub fn last(&self) {
        let len = self.len();
        if len > 0 {
            self.seek(len - 1);
        }
    }

    /// Jump to `index` (clamped) and render it immediately. While playing,
    /// the traversal continues from there.
    pub fn seek(&self, index: usize) {
        self.lock().seek(index);
    }

    /// Jump to a fraction of the way through the dataset (0.0 to 1.0)
    pub fn seek_percent(&self, percent: f64) {
        let mut inner = self.lock();
        let len = inner.points.len();
        if len == 0 {
            return;
        }
        let percent = if percent.is_finite() {
            percent.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let index = (percent * (len - 1) as f64).round() as usize;
        inner.seek(index);
    }

    /// Preview a point under the pointer. Ignored while playing.
    pub fn hover(&self, index: usize) {
        let mut inner = self.lock();
        if !inner.config.accessibility.hover || inner.state.playing {
            return;
        }
        inner.seek(index);
    }

    /// Dispatch a navigation key
    pub async fn handle_key(&self, key: NavigationKey) -> Result<()> {
        if !self.lock().config.accessibility.keyboard {
            return Ok(());
        }
        match key {
            NavigationKey::Space => return self.toggle().await,
            NavigationKey::Right => self.next(),
            NavigationKey::Left => self.previous(),
            NavigationKey::Home => self.first(),
            NavigationKey::End => self.last(),
            NavigationKey::Escape => self.stop(),
        }
        Ok(())
    }

    /// Set the speed multiplier, clamped to 0.25..=4. Applies from the next
    /// step or the next sweep.
    pub fn set_speed(&self, speed: f64) {
        let mut inner = self.lock();
        inner.state.speed = clamp_speed(speed);
        debug!("Playback speed set to {}", inner.state.speed);
    }

    /// Set the traversal mode. Unknown names select discrete. Applies from
    /// the next play or resume.
    pub fn set_mode(&self, mode: impl Into<PlaybackMode>) {
        self.lock().state.mode = mode.into();
    }

    pub fn state(&self) -> PlaybackState {
        self.lock().state
    }

    pub fn is_playing(&self) -> bool {
        self.lock().state.playing
    }

    pub fn is_paused(&self) -> bool {
        self.lock().state.paused
    }

    /// Most recently rendered point, -1 before the first
    pub fn current_index(&self) -> isize {
        self.lock().state.index
    }

    pub fn len(&self) -> usize {
        self.lock().points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().points.is_empty()
    }

    pub fn mode(&self) -> PlaybackMode {
        self.lock().state.mode
    }

    pub fn speed(&self) -> f64 {
        self.lock().state.speed
    }

    /// Expected length of a full traversal at the current mode and speed,
    /// excluding the summary, settle delay and markers
    pub fn total_duration(&self) -> Duration {
        let inner = self.lock();
        let per_point_ms = match inner.state.mode {
            PlaybackMode::Discrete => inner.config.duration.base_ms() + inner.config.gap,
            PlaybackMode::Continuous => inner.config.duration.base_ms(),
        };
        secs(inner.points.len() as f64 * per_point_ms / 1000.0 / inner.state.speed)
    }

    /// Whether a discrete step timer is waiting to fire
    pub fn has_pending_step(&self) -> bool {
        self.lock().step.is_pending()
    }

    /// Receive lifecycle events from now on
    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.lock().events.subscribe()
    }

    /// Stop, release the renderer and clear focus
    pub fn destroy(&self) {
        let mut inner = self.lock();
        if inner.points.is_empty() {
            return;
        }
        inner.stop();
        if inner.initialized {
            inner.renderer.destroy();
            inner.initialized = false;
        }
        inner.focus.highlight(None);
    }
}

/// Build a controller for `points` and, if `auto_play` is configured, start
/// playing after [`SETTLE_DELAY`]. Must be called inside a tokio runtime.
pub fn sonify(points: Vec<DataPoint>, config: SonifyConfig, services: Services) -> PlaybackController {
    let auto_play = config.auto_play;
    let controller = PlaybackController::new(points, config, services);

    if auto_play && !controller.is_empty() {
        let handle = controller.clone();
        tokio::spawn(async move {
            tokio::time::sleep(SETTLE_DELAY).await;
            if let Err(e) = handle.play().await {
                error!("Auto-play failed: {}", e);
            }
        });
    }

    controller
}

impl Inner {
    fn emit(&self, event: PlaybackEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// Invalidate pending starts, timers and any running sweep
    fn halt(&mut self) {
        self.session = self.session.wrapping_add(1);
        self.step.cancel();
        self.step_due = None;
        self.stop_sweep();
    }

    fn stop_sweep(&mut self) {
        self.tracker.cancel();
        if let Some(sweep) = self.sweep.take() {
            if let Err(e) = sweep.handle.stop() {
                debug!("Ignoring sweep teardown error: {}", e);
            }
        }
    }

    fn ensure_audio(&mut self) -> bool {
        if !self.initialized {
            match self.renderer.init() {
                Ok(()) => self.initialized = true,
                Err(e) => warn!("Audio unavailable, navigating silently: {}", e),
            }
        }
        self.initialized
    }

    fn pause(&mut self) {
        if !self.state.playing {
            return;
        }
        self.halt();
        self.state.playing = false;

        // Interrupted before the first point: nothing to resume from
        if self.state.index < 0 {
            self.state.paused = false;
            return;
        }

        self.state.paused = true;
        if self.config.accessibility.announce {
            self.announcer.announce("Paused");
        }
        self.emit(PlaybackEvent::Paused);
    }

    fn stop(&mut self) {
        if self.points.is_empty() {
            return;
        }
        self.halt();
        let was_active = self.state.playing || self.state.paused || self.state.index >= 0;
        self.state.playing = false;
        self.state.paused = false;
        self.state.index = -1;
        if self.config.accessibility.focus {
            self.focus.highlight(None);
        }
        if was_active {
            self.emit(PlaybackEvent::Stopped);
        }
    }

    fn begin(&mut self) {
        self.step_due = None;
        match self.running {
            PlaybackMode::Discrete => self.advance(),
            PlaybackMode::Continuous => {
                let start = (self.state.index + 1).max(0) as usize;
                self.start_sweep(start);
            }
        }
    }

    fn advance(&mut self) {
        self.state.index += 1;
        let index = self.state.index.max(0) as usize;
        if index >= self.points.len() {
            self.complete();
            return;
        }
        let tone_secs = self.render_point(index);
        self.schedule_step(tone_secs);
    }

    fn schedule_step(&mut self, tone_secs: f64) {
        let delay = secs(tone_secs + self.config.gap / 1000.0 / self.state.speed);
        // Chained deadlines keep timer rounding from piling up over a long run
        let due = self.step_due.unwrap_or_else(Instant::now) + delay;
        self.step_due = Some(due);
        let this = self.this.clone();
        self.step.schedule_at(due, move |ticket| {
            let Some(shared) = this.upgrade() else {
                return;
            };
            let mut inner = lock(&shared);
            if inner.step.claim(ticket) && inner.state.playing {
                inner.advance();
            }
        });
    }

    fn start_sweep(&mut self, start: usize) {
        if start >= self.points.len() {
            self.complete();
            return;
        }

        let seconds_per_point = self.config.duration.base_ms() / 1000.0 / self.state.speed;
        let params = self.mapper.sweep(&self.points, start, seconds_per_point);
        let handle = match self.renderer.start_sweep(&params) {
            Ok(handle) => handle,
            Err(e) => {
                warn!("Sweep unavailable, stepping discretely: {}", e);
                self.running = PlaybackMode::Discrete;
                self.state.index = start as isize - 1;
                self.advance();
                return;
            }
        };

        debug!("Sweep of {} points from {}", params.len(), start);
        self.sweep = Some(ActiveSweep {
            handle,
            params,
            start,
            started: Instant::now(),
        });

        let this = self.this.clone();
        self.tracker.repeat(TRACK_INTERVAL, move |ticket| {
            let Some(shared) = this.upgrade() else {
                return ControlFlow::Break(());
            };
            let mut inner = lock(&shared);
            if !inner.tracker.is_current(ticket) {
                return ControlFlow::Break(());
            }
            inner.track(ticket)
        });
    }

    /// Follow the sweep: move focus with it and finish when it ends
    fn track(&mut self, ticket: u64) -> ControlFlow<()> {
        let Some(sweep) = &self.sweep else {
            return ControlFlow::Break(());
        };

        let elapsed = sweep.started.elapsed();
        if elapsed >= sweep.duration() {
            self.tracker.claim(ticket);
            self.complete();
            return ControlFlow::Break(());
        }

        let index = sweep.start + sweep.params.index_at(elapsed.as_secs_f64());
        if index as isize != self.state.index {
            self.state.index = index as isize;
            self.focus_point(index);
            let stride = self.points.len().div_ceil(NARRATION_STOPS).max(1);
            if index % stride == 0 {
                self.narrate(index);
            }
        }
        ControlFlow::Continue(())
    }

    fn complete(&mut self) {
        self.halt();
        if self.config.markers.end {
            self.renderer.play_marker(Marker::End);
        }
        if self.config.accessibility.announce {
            self.announcer.announce("Playback complete");
        }
        self.state.playing = false;
        self.state.paused = false;
        self.state.index = -1;
        if self.config.accessibility.focus {
            self.focus.highlight(None);
        }
        info!("Playback complete");
        self.emit(PlaybackEvent::Completed);
    }

    fn seek(&mut self, index: usize) {
        let len = self.points.len();
        if len == 0 {
            return;
        }
        let index = index.min(len - 1);
        self.state.index = index as isize;

        if !self.state.playing {
            self.render_point(index);
            return;
        }

        // Supersede a start sequence still awaiting its marker
        self.session = self.session.wrapping_add(1);
        match self.running {
            PlaybackMode::Discrete => {
                self.step.cancel();
                self.step_due = None;
                let tone_secs = self.render_point(index);
                self.schedule_step(tone_secs);
            }
            PlaybackMode::Continuous => {
                self.stop_sweep();
                self.narrate(index);
                self.focus_point(index);
                self.start_sweep(index);
            }
        }
    }

    /// Play, narrate and focus one point. Returns the tone length in seconds.
    fn render_point(&mut self, index: usize) -> f64 {
        let tone = self.mapper.map(&self.points[index], index, self.points.len());
        let tone = tone.scaled(self.state.speed);
        if self.ensure_audio() {
            self.renderer.play_tone(&tone);
        }
        self.narrate(index);
        self.focus_point(index);
        tone.duration
    }

    fn narrate(&self, index: usize) {
        if self.config.accessibility.announce {
            let description = self
                .describer
                .describe(&self.points[index], index, self.points.len());
            self.announcer.announce(&description);
        }
    }

    fn focus_point(&self, index: usize) {
        let handle = self.points[index].handle;
        if self.config.accessibility.focus {
            self.focus.highlight(handle);
        }
        self.emit(PlaybackEvent::Point { index, handle });
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Seconds to a Duration, treating negative or non-finite values as zero
fn secs(seconds: f64) -> Duration {
    if seconds.is_finite() && seconds > 0.0 {
        Duration::from_secs_f64(seconds)
    } else {
        Duration::ZERO
    }
}
