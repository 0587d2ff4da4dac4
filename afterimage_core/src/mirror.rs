// Copyright 2026 the Afterimage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The delay buffer state machine.
//!
//! [`DelayMirror`] samples a [`FrameSource`] on a fixed period into a
//! [`SnapshotBuffer`] and, after a delay, drains that buffer onto a
//! [`Surface`] at the same period.
//!
//! # States
//!
//! ```text
//!            start_record             RenderStart fires
//!   Idle ───────────────► Recording ───────────────────► Draining
//!    ▲                        │                             │
//!    └──────── clear() ───────┴─────────── clear() ─────────┘
//! ```
//!
//! `start_render` is called while Recording; it only arms the one-shot.
//! The transition to Draining happens when that one-shot fires.
//!
//! # Empty buffer
//!
//! A drain tick can find the buffer empty: the delay may be shorter than one
//! sample period, the source may not have produced a frame yet, or the host
//! may run the drain tick ahead of a capture tick due at the same instant.
//! That tick draws nothing and reports [`TickOutcome::Skipped`].

use crate::backend::{FrameSource, Surface};
use crate::buffer::SnapshotBuffer;
use crate::config::MirrorConfig;
use crate::error::MirrorError;
use crate::geometry::FrameSize;
use crate::time::Duration;
use crate::timer::{TimerFire, TimerHost, TimerKind};
use crate::trace::{
    CaptureEvent, CaptureMissEvent, ClearEvent, DrainSkipEvent, DrawEvent, RecordStartEvent,
    RenderScheduleEvent, RenderStartEvent, StaleTickEvent, Tracer,
};

/// Lifecycle state of a [`DelayMirror`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MirrorState {
    /// No timers armed, buffer empty.
    Idle,
    /// Capturing; playback not started.
    Recording,
    /// Capturing and draining.
    Draining,
}

/// Per-session counters. Reset by `clear()`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MirrorStats {
    /// Snapshots appended to the buffer.
    pub captured: u64,
    /// Capture ticks that found no frame.
    pub missed: u64,
    /// Snapshots drawn.
    pub drawn: u64,
    /// Drain ticks that found the buffer empty.
    pub skipped: u64,
}

/// What a single timer fire did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// The fire belonged to an earlier session or a timer that is no longer
    /// meaningful in the current state; nothing happened.
    Stale,
    /// A snapshot was captured and buffered.
    Captured {
        /// Sequence number of the new snapshot.
        seq: u64,
    },
    /// The source had no frame; nothing was buffered.
    CaptureMissed,
    /// The delay elapsed and draining was armed.
    RenderStarted,
    /// The oldest snapshot was drawn and discarded.
    Drawn {
        /// Sequence number of the drawn snapshot.
        seq: u64,
    },
    /// The buffer was empty; nothing was drawn.
    Skipped,
}

/// Samples a capture source into a FIFO and replays it after a delay.
///
/// The mirror owns the buffer and the session bookkeeping. The capture
/// source, display surface and timers are passed into each call so that the
/// same state machine can drive browser objects or test doubles.
#[derive(Debug)]
pub struct DelayMirror<I> {
    config: MirrorConfig,
    state: MirrorState,
    buffer: SnapshotBuffer<I>,
    source_size: Option<FrameSize>,
    render_pending: bool,
    epoch: u64,
    stats: MirrorStats,
}

impl<I> DelayMirror<I> {
    /// Creates an idle mirror.
    ///
    /// # Panics
    ///
    /// Panics if `config.sample_period` is zero. Use
    /// [`MirrorConfig::validate`] to check untrusted configurations first.
    #[must_use]
    pub fn new(config: MirrorConfig) -> Self {
        assert!(
            config.validate().is_ok(),
            "sample period must be non-zero"
        );
        Self {
            config,
            state: MirrorState::Idle,
            buffer: SnapshotBuffer::new(),
            source_size: None,
            render_pending: false,
            epoch: 0,
            stats: MirrorStats::default(),
        }
    }

    /// The configuration this mirror was built with.
    #[must_use]
    pub const fn config(&self) -> &MirrorConfig {
        &self.config
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> MirrorState {
        self.state
    }

    /// Current session epoch.
    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Counters for the current session.
    #[must_use]
    pub const fn stats(&self) -> MirrorStats {
        self.stats
    }

    /// Number of snapshots waiting to be drawn.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Native source resolution read by `start_record`, while recording.
    #[must_use]
    pub const fn source_size(&self) -> Option<FrameSize> {
        self.source_size
    }

    /// Returns `true` between `start_render` and the one-shot firing.
    #[must_use]
    pub const fn render_pending(&self) -> bool {
        self.render_pending
    }

    /// Cancels every timer, empties the buffer and clears the surface.
    ///
    /// Valid from any state; always leaves the mirror Idle. Calling it again
    /// on an idle mirror changes nothing.
    pub fn clear<D, T>(&mut self, surface: &mut D, timers: &mut T, tracer: &mut Tracer<'_>)
    where
        D: Surface<Image = I>,
        T: TimerHost,
    {
        for kind in TimerKind::ALL {
            timers.cancel(kind);
        }
        let discarded = self.buffer.clear();
        surface.clear();

        // An idle mirror has nothing armed, so no stale fire can exist and the
        // epoch can stay put.
        if self.state != MirrorState::Idle {
            self.epoch = self.epoch.wrapping_add(1);
        }
        self.state = MirrorState::Idle;
        self.source_size = None;
        self.render_pending = false;
        self.stats = MirrorStats::default();

        tracer.clear(&ClearEvent {
            epoch: self.epoch,
            at: timers.now(),
            discarded,
        });
    }

    /// Reads the source resolution and arms the capture interval.
    ///
    /// # Errors
    ///
    /// - [`MirrorError::NotIdle`] unless the mirror is Idle.
    /// - [`MirrorError::NoVideoSize`] if the source reports no resolution, or
    ///   a zero width or height.
    pub fn start_record<S, T>(
        &mut self,
        source: &S,
        timers: &mut T,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), MirrorError>
    where
        S: FrameSource<Image = I>,
        T: TimerHost,
    {
        if self.state != MirrorState::Idle {
            return Err(MirrorError::NotIdle);
        }
        let size = source
            .native_size()
            .filter(|s| !s.is_empty())
            .ok_or(MirrorError::NoVideoSize)?;

        self.source_size = Some(size);
        timers.set_interval(TimerKind::Capture, self.epoch, self.config.sample_period);
        self.state = MirrorState::Recording;

        tracer.record_start(&RecordStartEvent {
            epoch: self.epoch,
            at: timers.now(),
            source: size,
            sample_period: self.config.sample_period,
        });
        Ok(())
    }

    /// Arms the one-shot that starts draining after `delay`.
    ///
    /// # Errors
    ///
    /// - [`MirrorError::NotRecording`] unless the mirror is Recording.
    /// - [`MirrorError::RenderScheduled`] if already called this session.
    pub fn start_render<T>(
        &mut self,
        delay: Duration,
        timers: &mut T,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), MirrorError>
    where
        T: TimerHost,
    {
        if self.state != MirrorState::Recording {
            return Err(MirrorError::NotRecording);
        }
        if self.render_pending {
            return Err(MirrorError::RenderScheduled);
        }
        timers.set_timeout(TimerKind::RenderStart, self.epoch, delay);
        self.render_pending = true;

        tracer.render_schedule(&RenderScheduleEvent {
            epoch: self.epoch,
            at: timers.now(),
            delay,
        });
        Ok(())
    }

    /// Runs a whole session: `clear`, `start_record`, then `start_render`.
    ///
    /// # Errors
    ///
    /// Propagates [`start_record`](Self::start_record) errors. The mirror is
    /// left Idle in that case.
    pub fn start<S, D, T>(
        &mut self,
        delay: Duration,
        source: &S,
        surface: &mut D,
        timers: &mut T,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), MirrorError>
    where
        S: FrameSource<Image = I>,
        D: Surface<Image = I>,
        T: TimerHost,
    {
        self.clear(surface, timers, tracer);
        self.start_record(source, timers, tracer)?;
        self.start_render(delay, timers, tracer)
    }

    /// Handles a timer fire delivered by the host.
    pub fn on_timer<S, D, T>(
        &mut self,
        fire: TimerFire,
        source: &mut S,
        surface: &mut D,
        timers: &mut T,
        tracer: &mut Tracer<'_>,
    ) -> TickOutcome
    where
        S: FrameSource<Image = I>,
        D: Surface<Image = I>,
        T: TimerHost,
    {
        let live = fire.epoch == self.epoch
            && match fire.kind {
                TimerKind::Capture => self.state != MirrorState::Idle,
                TimerKind::RenderStart => {
                    self.state == MirrorState::Recording && self.render_pending
                }
                TimerKind::Drain => self.state == MirrorState::Draining,
            };
        if !live {
            tracer.stale_tick(&StaleTickEvent {
                kind: fire.kind,
                fired_epoch: fire.epoch,
                current_epoch: self.epoch,
                at: timers.now(),
            });
            return TickOutcome::Stale;
        }

        match fire.kind {
            TimerKind::Capture => self.capture_tick(source, surface, timers, tracer),
            TimerKind::RenderStart => self.begin_draining(timers, tracer),
            TimerKind::Drain => self.drain_tick(surface, timers, tracer),
        }
    }

    fn capture_tick<S, D, T>(
        &mut self,
        source: &mut S,
        surface: &mut D,
        timers: &T,
        tracer: &mut Tracer<'_>,
    ) -> TickOutcome
    where
        S: FrameSource<Image = I>,
        D: Surface<Image = I>,
        T: TimerHost,
    {
        let Some(native) = self.source_size else {
            return TickOutcome::Stale;
        };
        let size = native.fit_width(surface.display_width());
        let image = if size.is_empty() {
            None
        } else {
            surface.set_display_height(size.height);
            source.capture(size)
        };

        let Some(image) = image else {
            self.stats.missed += 1;
            tracer.capture_miss(&CaptureMissEvent {
                epoch: self.epoch,
                at: timers.now(),
            });
            return TickOutcome::CaptureMissed;
        };

        let seq = self.buffer.push(image, size);
        self.stats.captured += 1;
        tracer.capture(&CaptureEvent {
            epoch: self.epoch,
            at: timers.now(),
            seq,
            size,
            buffered: self.buffer.len(),
        });
        TickOutcome::Captured { seq }
    }

    fn begin_draining<T>(&mut self, timers: &mut T, tracer: &mut Tracer<'_>) -> TickOutcome
    where
        T: TimerHost,
    {
        self.render_pending = false;
        timers.set_interval(TimerKind::Drain, self.epoch, self.config.sample_period);
        self.state = MirrorState::Draining;

        tracer.render_start(&RenderStartEvent {
            epoch: self.epoch,
            at: timers.now(),
            buffered: self.buffer.len(),
        });
        TickOutcome::RenderStarted
    }

    fn drain_tick<D, T>(&mut self, surface: &mut D, timers: &T, tracer: &mut Tracer<'_>) -> TickOutcome
    where
        D: Surface<Image = I>,
        T: TimerHost,
    {
        let Some(snapshot) = self.buffer.pop() else {
            self.stats.skipped += 1;
            tracer.drain_skip(&DrainSkipEvent {
                epoch: self.epoch,
                at: timers.now(),
            });
            return TickOutcome::Skipped;
        };

        surface.draw(&snapshot.image);
        self.stats.drawn += 1;
        tracer.draw(&DrawEvent {
            epoch: self.epoch,
            at: timers.now(),
            seq: snapshot.seq,
            buffered: self.buffer.len(),
        });
        TickOutcome::Drawn { seq: snapshot.seq }
    }
}
