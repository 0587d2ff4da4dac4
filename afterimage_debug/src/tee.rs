// Copyright 2026 the Afterimage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fan-out to two sinks.

use afterimage_core::error::{CaptureError, ParseDelayError};
use afterimage_core::time::HostTime;
use afterimage_core::trace::{
    CaptureEvent, CaptureMissEvent, ClearEvent, DrainSkipEvent, DrawEvent, RecordStartEvent,
    RenderScheduleEvent, RenderStartEvent, StaleTickEvent, TraceSink,
};

/// A [`TraceSink`] that forwards every event to `.0` and then `.1`.
///
/// Nest `Tee`s to reach more than two sinks.
#[derive(Debug, Default)]
pub struct Tee<A, B>(pub A, pub B);

impl<A: TraceSink, B: TraceSink> TraceSink for Tee<A, B> {
    fn on_record_start(&mut self, e: &RecordStartEvent) {
        self.0.on_record_start(e);
        self.1.on_record_start(e);
    }

    fn on_render_schedule(&mut self, e: &RenderScheduleEvent) {
        self.0.on_render_schedule(e);
        self.1.on_render_schedule(e);
    }

    fn on_render_start(&mut self, e: &RenderStartEvent) {
        self.0.on_render_start(e);
        self.1.on_render_start(e);
    }

    fn on_capture(&mut self, e: &CaptureEvent) {
        self.0.on_capture(e);
        self.1.on_capture(e);
    }

    fn on_capture_miss(&mut self, e: &CaptureMissEvent) {
        self.0.on_capture_miss(e);
        self.1.on_capture_miss(e);
    }

    fn on_draw(&mut self, e: &DrawEvent) {
        self.0.on_draw(e);
        self.1.on_draw(e);
    }

    fn on_drain_skip(&mut self, e: &DrainSkipEvent) {
        self.0.on_drain_skip(e);
        self.1.on_drain_skip(e);
    }

    fn on_stale_tick(&mut self, e: &StaleTickEvent) {
        self.0.on_stale_tick(e);
        self.1.on_stale_tick(e);
    }

    fn on_clear(&mut self, e: &ClearEvent) {
        self.0.on_clear(e);
        self.1.on_clear(e);
    }

    fn on_capture_error(&mut self, at: HostTime, error: &CaptureError) {
        self.0.on_capture_error(at, error);
        self.1.on_capture_error(at, error);
    }

    fn on_invalid_delay(&mut self, at: HostTime, error: &ParseDelayError) {
        self.0.on_invalid_delay(at, error);
        self.1.on_invalid_delay(at, error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pretty::PrettyPrintSink;
    use crate::recorder::{RecorderSink, decode};

    #[test]
    fn both_sides_see_every_event() {
        let mut tee = Tee(
            PrettyPrintSink::with_writer(Vec::<u8>::new()),
            RecorderSink::new(),
        );
        tee.on_drain_skip(&DrainSkipEvent {
            epoch: 0,
            at: HostTime::from_millis(150),
        });
        tee.on_capture_error(HostTime::ZERO, &CaptureError::unsupported());

        let Tee(pretty, recorder) = tee;
        let text = String::from_utf8(pretty.into_inner()).unwrap();
        assert_eq!(text.lines().count(), 2, "got: {text}");
        assert_eq!(decode(recorder.as_bytes()).count(), 2);
    }
}
