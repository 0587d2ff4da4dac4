// Copyright 2026 the Afterimage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Timestamps
//! are printed in milliseconds since the host time origin.

use std::io::Write;

use afterimage_core::error::{CaptureError, ParseDelayError};
use afterimage_core::time::{Duration, HostTime};
use afterimage_core::trace::{
    CaptureEvent, CaptureMissEvent, ClearEvent, DrainSkipEvent, DrawEvent, RecordStartEvent,
    RenderScheduleEvent, RenderStartEvent, StaleTickEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn ms(t: HostTime) -> f64 {
    t.ticks() as f64 / 1000.0
}

fn span_ms(d: Duration) -> f64 {
    d.ticks() as f64 / 1000.0
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_record_start(&mut self, e: &RecordStartEvent) {
        let _ = writeln!(
            self.writer,
            "[record] #{} source={:?} period={:.1}ms at {:.1}ms",
            e.epoch,
            e.source,
            span_ms(e.sample_period),
            ms(e.at),
        );
    }

    fn on_render_schedule(&mut self, e: &RenderScheduleEvent) {
        let _ = writeln!(
            self.writer,
            "[schedule] #{} delay={:.1}ms at {:.1}ms",
            e.epoch,
            span_ms(e.delay),
            ms(e.at),
        );
    }

    fn on_render_start(&mut self, e: &RenderStartEvent) {
        let _ = writeln!(
            self.writer,
            "[playback] #{} buffered={} at {:.1}ms",
            e.epoch,
            e.buffered,
            ms(e.at),
        );
    }

    fn on_capture(&mut self, e: &CaptureEvent) {
        let _ = writeln!(
            self.writer,
            "[capture] #{} seq={} {:?} buffered={} at {:.1}ms",
            e.epoch,
            e.seq,
            e.size,
            e.buffered,
            ms(e.at),
        );
    }

    fn on_capture_miss(&mut self, e: &CaptureMissEvent) {
        let _ = writeln!(self.writer, "[capture:miss] #{} at {:.1}ms", e.epoch, ms(e.at));
    }

    fn on_draw(&mut self, e: &DrawEvent) {
        let _ = writeln!(
            self.writer,
            "[draw] #{} seq={} buffered={} at {:.1}ms",
            e.epoch,
            e.seq,
            e.buffered,
            ms(e.at),
        );
    }

    fn on_drain_skip(&mut self, e: &DrainSkipEvent) {
        let _ = writeln!(self.writer, "[draw:skip] #{} empty at {:.1}ms", e.epoch, ms(e.at));
    }

    fn on_stale_tick(&mut self, e: &StaleTickEvent) {
        let _ = writeln!(
            self.writer,
            "[stale] {} from #{} (now #{}) at {:.1}ms",
            e.kind.as_str(),
            e.fired_epoch,
            e.current_epoch,
            ms(e.at),
        );
    }

    fn on_clear(&mut self, e: &ClearEvent) {
        let _ = writeln!(
            self.writer,
            "[clear] now #{} discarded={} at {:.1}ms",
            e.epoch,
            e.discarded,
            ms(e.at),
        );
    }

    fn on_capture_error(&mut self, at: HostTime, error: &CaptureError) {
        let _ = writeln!(
            self.writer,
            "[error] {error} kind={:?} at {:.1}ms",
            error.kind(),
            ms(at),
        );
    }

    fn on_invalid_delay(&mut self, at: HostTime, error: &ParseDelayError) {
        let _ = writeln!(self.writer, "[ignored] {error} at {:.1}ms", ms(at));
    }
}
