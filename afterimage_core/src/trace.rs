// Copyright 2026 the Afterimage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for mirror sessions.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! [`DelayMirror`](crate::mirror::DelayMirror) and
//! [`MirrorApp`](crate::app::MirrorApp) call as a session progresses. All
//! method bodies default to no-ops, so implementing only the events you care
//! about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).

use crate::error::{CaptureError, ParseDelayError};
use crate::geometry::FrameSize;
use crate::time::{Duration, HostTime};
use crate::timer::TimerKind;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when the capture interval is armed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordStartEvent {
    /// Session epoch.
    pub epoch: u64,
    /// Host time of the call.
    pub at: HostTime,
    /// Native resolution of the capture source.
    pub source: FrameSize,
    /// Capture interval.
    pub sample_period: Duration,
}

/// Emitted when the one-shot render start is armed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderScheduleEvent {
    /// Session epoch.
    pub epoch: u64,
    /// Host time of the call.
    pub at: HostTime,
    /// Wait before draining begins.
    pub delay: Duration,
}

/// Emitted when the render start elapses and the drain interval is armed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderStartEvent {
    /// Session epoch.
    pub epoch: u64,
    /// Host time the one-shot fired.
    pub at: HostTime,
    /// Snapshots buffered at that moment.
    pub buffered: usize,
}

/// Emitted after a snapshot is appended to the buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureEvent {
    /// Session epoch.
    pub epoch: u64,
    /// Host time of the capture tick.
    pub at: HostTime,
    /// Sequence number of the new snapshot.
    pub seq: u64,
    /// Size the snapshot was captured at.
    pub size: FrameSize,
    /// Buffer length after the append.
    pub buffered: usize,
}

/// Emitted when a capture tick finds no frame to sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureMissEvent {
    /// Session epoch.
    pub epoch: u64,
    /// Host time of the capture tick.
    pub at: HostTime,
}

/// Emitted after a snapshot is drawn and discarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawEvent {
    /// Session epoch.
    pub epoch: u64,
    /// Host time of the drain tick.
    pub at: HostTime,
    /// Sequence number of the drawn snapshot.
    pub seq: u64,
    /// Buffer length after the pop.
    pub buffered: usize,
}

/// Emitted when a drain tick finds the buffer empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrainSkipEvent {
    /// Session epoch.
    pub epoch: u64,
    /// Host time of the drain tick.
    pub at: HostTime,
}

/// Emitted when a timer fire from an earlier session is ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StaleTickEvent {
    /// Which timer fired.
    pub kind: TimerKind,
    /// Epoch the timer was armed in.
    pub fired_epoch: u64,
    /// Epoch of the current session.
    pub current_epoch: u64,
    /// Host time of the fire.
    pub at: HostTime,
}

/// Emitted by `clear()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClearEvent {
    /// Epoch after the clear.
    pub epoch: u64,
    /// Host time of the call.
    pub at: HostTime,
    /// Snapshots discarded without being drawn.
    pub discarded: usize,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from a mirror session.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when recording starts.
    fn on_record_start(&mut self, e: &RecordStartEvent) {
        _ = e;
    }

    /// Called when playback is scheduled.
    fn on_render_schedule(&mut self, e: &RenderScheduleEvent) {
        _ = e;
    }

    /// Called when draining begins.
    fn on_render_start(&mut self, e: &RenderStartEvent) {
        _ = e;
    }

    /// Called for each buffered snapshot.
    fn on_capture(&mut self, e: &CaptureEvent) {
        _ = e;
    }

    /// Called when a capture tick had no frame.
    fn on_capture_miss(&mut self, e: &CaptureMissEvent) {
        _ = e;
    }

    /// Called for each drawn snapshot.
    fn on_draw(&mut self, e: &DrawEvent) {
        _ = e;
    }

    /// Called when a drain tick found the buffer empty.
    fn on_drain_skip(&mut self, e: &DrainSkipEvent) {
        _ = e;
    }

    /// Called when a stale timer fire is ignored.
    fn on_stale_tick(&mut self, e: &StaleTickEvent) {
        _ = e;
    }

    /// Called by `clear()`.
    fn on_clear(&mut self, e: &ClearEvent) {
        _ = e;
    }

    /// Called when the capture source could not be acquired.
    fn on_capture_error(&mut self, at: HostTime, error: &CaptureError) {
        _ = (at, error);
    }

    /// Called when a delay selection could not be parsed.
    fn on_invalid_delay(&mut self, at: HostTime, error: &ParseDelayError) {
        _ = (at, error);
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`RecordStartEvent`].
    #[inline]
    pub fn record_start(&mut self, e: &RecordStartEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_record_start(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`RenderScheduleEvent`].
    #[inline]
    pub fn render_schedule(&mut self, e: &RenderScheduleEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_render_schedule(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`RenderStartEvent`].
    #[inline]
    pub fn render_start(&mut self, e: &RenderStartEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_render_start(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`CaptureEvent`].
    #[inline]
    pub fn capture(&mut self, e: &CaptureEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_capture(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`CaptureMissEvent`].
    #[inline]
    pub fn capture_miss(&mut self, e: &CaptureMissEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_capture_miss(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`DrawEvent`].
    #[inline]
    pub fn draw(&mut self, e: &DrawEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_draw(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`DrainSkipEvent`].
    #[inline]
    pub fn drain_skip(&mut self, e: &DrainSkipEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_drain_skip(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`StaleTickEvent`].
    #[inline]
    pub fn stale_tick(&mut self, e: &StaleTickEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_stale_tick(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ClearEvent`].
    #[inline]
    pub fn clear(&mut self, e: &ClearEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_clear(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Reports a capture acquisition failure.
    #[inline]
    pub fn capture_error(&mut self, at: HostTime, error: &CaptureError) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_capture_error(at, error);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = (at, error);
        }
    }

    /// Reports a rejected delay selection.
    #[inline]
    pub fn invalid_delay(&mut self, at: HostTime, error: &ParseDelayError) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_invalid_delay(at, error);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = (at, error);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_capture() -> CaptureEvent {
        CaptureEvent {
            epoch: 3,
            at: HostTime(100_000),
            seq: 7,
            size: FrameSize::new(640, 360),
            buffered: 8,
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_capture(&sample_capture());
        sink.on_drain_skip(&DrainSkipEvent {
            epoch: 0,
            at: HostTime(0),
        });
        sink.on_capture_error(HostTime(0), &CaptureError::from_name("NotAllowedError"));
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.capture(&sample_capture());
        tracer.clear(&ClearEvent {
            epoch: 1,
            at: HostTime(0),
            discarded: 0,
        });
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            seqs: Vec<u64>,
        }
        impl TraceSink for RecordingSink {
            fn on_capture(&mut self, e: &CaptureEvent) {
                self.seqs.push(e.seq);
            }
        }

        let mut sink = RecordingSink { seqs: Vec::new() };
        let mut tracer = Tracer::new(&mut sink);
        tracer.capture(&sample_capture());
        // Access sink after tracer is dropped.
        drop(tracer);
        assert_eq!(sink.seqs, &[7]);
    }
}
