// Copyright 2026 the Afterimage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser console tracing and `window.alert` notifications.

use alloc::format;
use alloc::string::String;

use afterimage_core::backend::Notifier;
use afterimage_core::error::{CaptureError, ParseDelayError};
use afterimage_core::time::HostTime;
use afterimage_core::trace::{
    CaptureEvent, CaptureMissEvent, ClearEvent, DrainSkipEvent, DrawEvent, RecordStartEvent,
    RenderScheduleEvent, RenderStartEvent, StaleTickEvent, TraceSink,
};
use wasm_bindgen::JsValue;

/// A [`TraceSink`] that logs session events to the browser console.
///
/// Lifecycle events (start, schedule, playback, clear) are always logged.
/// Per-tick events are only logged when `verbose` is set, since they arrive
/// ten times a second. Failures go to `console.warn`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleSink {
    verbose: bool,
}

impl ConsoleSink {
    /// Logs lifecycle events and failures.
    #[must_use]
    pub const fn new() -> Self {
        Self { verbose: false }
    }

    /// Also logs every capture, draw and skip.
    #[must_use]
    pub const fn verbose() -> Self {
        Self { verbose: true }
    }

    fn tick(&self, line: &str) {
        if self.verbose {
            log(line);
        }
    }
}

fn log(line: &str) {
    web_sys::console::log_1(&JsValue::from_str(line));
}

pub(crate) fn warn(line: &str) {
    web_sys::console::warn_1(&JsValue::from_str(line));
}

fn stamp(at: HostTime) -> String {
    let ms = at.ticks() as f64 / 1000.0;
    format!("{ms:.1}ms")
}

pub(crate) fn record_start_line(e: &RecordStartEvent) -> String {
    format!(
        "[afterimage {}] recording #{}: source {:?}, every {}ms",
        stamp(e.at),
        e.epoch,
        e.source,
        e.sample_period.as_millis(),
    )
}

pub(crate) fn render_schedule_line(e: &RenderScheduleEvent) -> String {
    format!(
        "[afterimage {}] playback #{} in {}ms",
        stamp(e.at),
        e.epoch,
        e.delay.as_millis(),
    )
}

pub(crate) fn render_start_line(e: &RenderStartEvent) -> String {
    format!(
        "[afterimage {}] playback #{} started with {} buffered",
        stamp(e.at),
        e.epoch,
        e.buffered,
    )
}

pub(crate) fn clear_line(e: &ClearEvent) -> String {
    format!(
        "[afterimage {}] cleared, now #{} ({} discarded)",
        stamp(e.at),
        e.epoch,
        e.discarded,
    )
}

pub(crate) fn capture_error_line(at: HostTime, error: &CaptureError) -> String {
    format!("[afterimage {}] {error} ({:?})", stamp(at), error.kind())
}

impl TraceSink for ConsoleSink {
    fn on_record_start(&mut self, e: &RecordStartEvent) {
        log(&record_start_line(e));
    }

    fn on_render_schedule(&mut self, e: &RenderScheduleEvent) {
        log(&render_schedule_line(e));
    }

    fn on_render_start(&mut self, e: &RenderStartEvent) {
        log(&render_start_line(e));
    }

    fn on_capture(&mut self, e: &CaptureEvent) {
        self.tick(&format!(
            "[afterimage {}] capture seq={} {:?} buffered={}",
            stamp(e.at),
            e.seq,
            e.size,
            e.buffered,
        ));
    }

    fn on_capture_miss(&mut self, e: &CaptureMissEvent) {
        self.tick(&format!("[afterimage {}] capture miss", stamp(e.at)));
    }

    fn on_draw(&mut self, e: &DrawEvent) {
        self.tick(&format!(
            "[afterimage {}] draw seq={} buffered={}",
            stamp(e.at),
            e.seq,
            e.buffered,
        ));
    }

    fn on_drain_skip(&mut self, e: &DrainSkipEvent) {
        self.tick(&format!("[afterimage {}] drain skipped: empty", stamp(e.at)));
    }

    fn on_stale_tick(&mut self, e: &StaleTickEvent) {
        self.tick(&format!(
            "[afterimage {}] stale {} tick from #{} (now #{})",
            stamp(e.at),
            e.kind.as_str(),
            e.fired_epoch,
            e.current_epoch,
        ));
    }

    fn on_clear(&mut self, e: &ClearEvent) {
        log(&clear_line(e));
    }

    fn on_capture_error(&mut self, at: HostTime, error: &CaptureError) {
        warn(&capture_error_line(at, error));
    }

    fn on_invalid_delay(&mut self, at: HostTime, error: &ParseDelayError) {
        warn(&format!("[afterimage {}] ignored: {error}", stamp(at)));
    }
}

/// Shows notifications with a blocking `window.alert`.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlertNotifier;

impl Notifier for AlertNotifier {
    fn notify(&mut self, message: &str) {
        if let Some(window) = web_sys::window() {
            let _ = window.alert_with_message(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use afterimage_core::geometry::FrameSize;
    use afterimage_core::time::Duration;

    #[test]
    fn stamps_are_milliseconds() {
        assert_eq!(stamp(HostTime(3_100_000)), "3100.0ms");
        assert_eq!(stamp(HostTime(1_260)), "1.3ms");
    }

    #[test]
    fn record_start_names_source_and_period() {
        let line = record_start_line(&RecordStartEvent {
            epoch: 2,
            at: HostTime::from_millis(5),
            source: FrameSize::new(1280, 720),
            sample_period: Duration::from_millis(100),
        });
        assert!(line.contains("#2"), "got: {line}");
        assert!(line.contains("1280x720"), "got: {line}");
        assert!(line.contains("every 100ms"), "got: {line}");
    }

    #[test]
    fn capture_error_keeps_host_name() {
        let line = capture_error_line(HostTime::ZERO, &CaptureError::from_name("NotFoundError"));
        assert!(line.contains("NotFoundError"), "got: {line}");
        assert!(line.contains("NotFound"), "got: {line}");
    }

    #[test]
    fn clear_reports_discarded() {
        let line = clear_line(&ClearEvent {
            epoch: 4,
            at: HostTime::ZERO,
            discarded: 30,
        });
        assert!(line.contains("30 discarded"), "got: {line}");
    }
}
