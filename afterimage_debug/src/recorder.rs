// Copyright 2026 the Afterimage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as little-endian records, one tag byte followed by the event's
//! fields. [`decode`] reads them back as an iterator of [`RecordedEvent`].
//!
//! Error events keep their text (capture error name, rejected delay input)
//! as a length-prefixed UTF-8 string, truncated to `u16::MAX` bytes.

use afterimage_core::error::{CaptureError, ParseDelayError};
use afterimage_core::geometry::FrameSize;
use afterimage_core::time::{Duration, HostTime};
use afterimage_core::timer::TimerKind;
use afterimage_core::trace::{
    CaptureEvent, CaptureMissEvent, ClearEvent, DrainSkipEvent, DrawEvent, RecordStartEvent,
    RenderScheduleEvent, RenderStartEvent, StaleTickEvent, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_RECORD_START: u8 = 1;
const TAG_RENDER_SCHEDULE: u8 = 2;
const TAG_RENDER_START: u8 = 3;
const TAG_CAPTURE: u8 = 4;
const TAG_CAPTURE_MISS: u8 = 5;
const TAG_DRAW: u8 = 6;
const TAG_DRAIN_SKIP: u8 = 7;
const TAG_STALE_TICK: u8 = 8;
const TAG_CLEAR: u8 = 9;
const TAG_CAPTURE_ERROR: u8 = 10;
const TAG_INVALID_DELAY: u8 = 11;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_len(&mut self, v: usize) {
        self.write_u64(u64::try_from(v).unwrap_or(u64::MAX));
    }

    fn write_size(&mut self, size: FrameSize) {
        self.write_u32(size.width);
        self.write_u32(size.height);
    }

    fn write_header(&mut self, tag: u8, epoch: u64, at: HostTime) {
        self.write_u8(tag);
        self.write_u64(epoch);
        self.write_u64(at.ticks());
    }

    fn write_str(&mut self, s: &str) {
        let mut end = s.len().min(usize::from(u16::MAX));
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        let len = u16::try_from(end).unwrap_or(u16::MAX);
        self.buf.extend_from_slice(&len.to_le_bytes());
        self.buf.extend_from_slice(&s.as_bytes()[..end]);
    }
}

fn timer_kind_code(kind: TimerKind) -> u8 {
    match kind {
        TimerKind::Capture => 0,
        TimerKind::RenderStart => 1,
        TimerKind::Drain => 2,
    }
}

impl TraceSink for RecorderSink {
    fn on_record_start(&mut self, e: &RecordStartEvent) {
        self.write_header(TAG_RECORD_START, e.epoch, e.at);
        self.write_size(e.source);
        self.write_u64(e.sample_period.ticks());
    }

    fn on_render_schedule(&mut self, e: &RenderScheduleEvent) {
        self.write_header(TAG_RENDER_SCHEDULE, e.epoch, e.at);
        self.write_u64(e.delay.ticks());
    }

    fn on_render_start(&mut self, e: &RenderStartEvent) {
        self.write_header(TAG_RENDER_START, e.epoch, e.at);
        self.write_len(e.buffered);
    }

    fn on_capture(&mut self, e: &CaptureEvent) {
        self.write_header(TAG_CAPTURE, e.epoch, e.at);
        self.write_u64(e.seq);
        self.write_size(e.size);
        self.write_len(e.buffered);
    }

    fn on_capture_miss(&mut self, e: &CaptureMissEvent) {
        self.write_header(TAG_CAPTURE_MISS, e.epoch, e.at);
    }

    fn on_draw(&mut self, e: &DrawEvent) {
        self.write_header(TAG_DRAW, e.epoch, e.at);
        self.write_u64(e.seq);
        self.write_len(e.buffered);
    }

    fn on_drain_skip(&mut self, e: &DrainSkipEvent) {
        self.write_header(TAG_DRAIN_SKIP, e.epoch, e.at);
    }

    fn on_stale_tick(&mut self, e: &StaleTickEvent) {
        self.write_header(TAG_STALE_TICK, e.current_epoch, e.at);
        self.write_u8(timer_kind_code(e.kind));
        self.write_u64(e.fired_epoch);
    }

    fn on_clear(&mut self, e: &ClearEvent) {
        self.write_header(TAG_CLEAR, e.epoch, e.at);
        self.write_len(e.discarded);
    }

    fn on_capture_error(&mut self, at: HostTime, error: &CaptureError) {
        self.write_u8(TAG_CAPTURE_ERROR);
        self.write_u64(at.ticks());
        self.write_str(error.name());
    }

    fn on_invalid_delay(&mut self, at: HostTime, error: &ParseDelayError) {
        self.write_u8(TAG_INVALID_DELAY);
        self.write_u64(at.ticks());
        self.write_str(error.raw());
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    /// A [`RecordStartEvent`].
    RecordStart(RecordStartEvent),
    /// A [`RenderScheduleEvent`].
    RenderSchedule(RenderScheduleEvent),
    /// A [`RenderStartEvent`].
    RenderStart(RenderStartEvent),
    /// A [`CaptureEvent`].
    Capture(CaptureEvent),
    /// A [`CaptureMissEvent`].
    CaptureMiss(CaptureMissEvent),
    /// A [`DrawEvent`].
    Draw(DrawEvent),
    /// A [`DrainSkipEvent`].
    DrainSkip(DrainSkipEvent),
    /// A [`StaleTickEvent`].
    StaleTick(StaleTickEvent),
    /// A [`ClearEvent`].
    Clear(ClearEvent),
    /// The capture source could not be acquired.
    CaptureError {
        /// Host time of the failure.
        at: HostTime,
        /// The error, rebuilt from its recorded name.
        error: CaptureError,
    },
    /// A delay selection was rejected.
    InvalidDelay {
        /// Host time of the selection.
        at: HostTime,
        /// The rejected input.
        raw: String,
    },
}

impl RecordedEvent {
    /// Host time the event happened at.
    #[must_use]
    pub fn at(&self) -> HostTime {
        match self {
            Self::RecordStart(e) => e.at,
            Self::RenderSchedule(e) => e.at,
            Self::RenderStart(e) => e.at,
            Self::Capture(e) => e.at,
            Self::CaptureMiss(e) => e.at,
            Self::Draw(e) => e.at,
            Self::DrainSkip(e) => e.at,
            Self::StaleTick(e) => e.at,
            Self::Clear(e) => e.at,
            Self::CaptureError { at, .. } | Self::InvalidDelay { at, .. } => *at,
        }
    }
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take(&mut self, n: usize) -> Option<&[u8]> {
        let end = self.pos.checked_add(n)?;
        let bytes = self.data.get(self.pos..end)?;
        self.pos = end;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        Some(self.take(1)?[0])
    }

    fn read_u16(&mut self) -> Option<u16> {
        Some(u16::from_le_bytes(self.take(2)?.try_into().ok()?))
    }

    fn read_u32(&mut self) -> Option<u32> {
        Some(u32::from_le_bytes(self.take(4)?.try_into().ok()?))
    }

    fn read_u64(&mut self) -> Option<u64> {
        Some(u64::from_le_bytes(self.take(8)?.try_into().ok()?))
    }

    fn read_time(&mut self) -> Option<HostTime> {
        self.read_u64().map(HostTime)
    }

    fn read_len(&mut self) -> Option<usize> {
        usize::try_from(self.read_u64()?).ok()
    }

    fn read_size(&mut self) -> Option<FrameSize> {
        Some(FrameSize::new(self.read_u32()?, self.read_u32()?))
    }

    fn read_str(&mut self) -> Option<String> {
        let len = usize::from(self.read_u16()?);
        String::from_utf8(self.take(len)?.to_vec()).ok()
    }

    fn read_timer_kind(&mut self) -> Option<TimerKind> {
        TimerKind::ALL.get(usize::from(self.read_u8()?)).copied()
    }

    fn decode_tagged(&mut self, tag: u8) -> Option<RecordedEvent> {
        if tag == TAG_CAPTURE_ERROR {
            let at = self.read_time()?;
            let error = CaptureError::from_name(self.read_str()?);
            return Some(RecordedEvent::CaptureError { at, error });
        }
        if tag == TAG_INVALID_DELAY {
            let at = self.read_time()?;
            let raw = self.read_str()?;
            return Some(RecordedEvent::InvalidDelay { at, raw });
        }

        let epoch = self.read_u64()?;
        let at = self.read_time()?;
        Some(match tag {
            TAG_RECORD_START => RecordedEvent::RecordStart(RecordStartEvent {
                epoch,
                at,
                source: self.read_size()?,
                sample_period: Duration(self.read_u64()?),
            }),
            TAG_RENDER_SCHEDULE => RecordedEvent::RenderSchedule(RenderScheduleEvent {
                epoch,
                at,
                delay: Duration(self.read_u64()?),
            }),
            TAG_RENDER_START => RecordedEvent::RenderStart(RenderStartEvent {
                epoch,
                at,
                buffered: self.read_len()?,
            }),
            TAG_CAPTURE => RecordedEvent::Capture(CaptureEvent {
                epoch,
                at,
                seq: self.read_u64()?,
                size: self.read_size()?,
                buffered: self.read_len()?,
            }),
            TAG_CAPTURE_MISS => RecordedEvent::CaptureMiss(CaptureMissEvent { epoch, at }),
            TAG_DRAW => RecordedEvent::Draw(DrawEvent {
                epoch,
                at,
                seq: self.read_u64()?,
                buffered: self.read_len()?,
            }),
            TAG_DRAIN_SKIP => RecordedEvent::DrainSkip(DrainSkipEvent { epoch, at }),
            TAG_STALE_TICK => RecordedEvent::StaleTick(StaleTickEvent {
                kind: self.read_timer_kind()?,
                fired_epoch: self.read_u64()?,
                current_epoch: epoch,
                at,
            }),
            TAG_CLEAR => RecordedEvent::Clear(ClearEvent {
                epoch,
                at,
                discarded: self.read_len()?,
            }),
            _ => return None,
        })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        // Unknown tags and truncated records end the iteration.
        self.decode_tagged(tag)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use afterimage_core::control::parse_delay;

    fn sample_capture() -> CaptureEvent {
        CaptureEvent {
            epoch: 3,
            at: HostTime::from_millis(700),
            seq: 6,
            size: FrameSize::new(641, 361),
            buffered: 7,
        }
    }

    fn sample_stale() -> StaleTickEvent {
        StaleTickEvent {
            kind: TimerKind::Drain,
            fired_epoch: 1,
            current_epoch: 2,
            at: HostTime::from_millis(3_100),
        }
    }

    #[test]
    fn session_events_survive_recording() {
        let mut rec = RecorderSink::new();
        rec.on_capture(&sample_capture());
        rec.on_stale_tick(&sample_stale());
        rec.on_clear(&ClearEvent {
            epoch: 4,
            at: HostTime::from_millis(3_200),
            discarded: 29,
        });

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(
            events,
            [
                RecordedEvent::Capture(sample_capture()),
                RecordedEvent::StaleTick(sample_stale()),
                RecordedEvent::Clear(ClearEvent {
                    epoch: 4,
                    at: HostTime::from_millis(3_200),
                    discarded: 29,
                }),
            ]
        );
    }

    #[test]
    fn error_text_is_kept() {
        let mut rec = RecorderSink::new();
        rec.on_capture_error(HostTime(5), &CaptureError::from_name("NotReadableError"));
        let bad = parse_delay("3s").unwrap_err();
        rec.on_invalid_delay(HostTime(9), &bad);

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), 2);
        let RecordedEvent::CaptureError { at, error } = &events[0] else {
            panic!("expected capture error, got {:?}", events[0]);
        };
        assert_eq!(*at, HostTime(5));
        assert_eq!(error.name(), "NotReadableError");
        assert_eq!(
            events[1],
            RecordedEvent::InvalidDelay {
                at: HostTime(9),
                raw: "3s".into(),
            }
        );
    }

    #[test]
    fn truncated_recording_stops_cleanly() {
        let mut rec = RecorderSink::new();
        rec.on_capture(&sample_capture());
        rec.on_capture(&sample_capture());
        let bytes = rec.into_bytes();
        let cut = &bytes[..bytes.len() - 3];
        assert_eq!(decode(cut).count(), 1, "partial record is dropped");
    }

    #[test]
    fn unknown_tag_stops_iteration() {
        assert_eq!(decode(&[0xff, 1, 2, 3]).count(), 0);
        assert_eq!(decode(&[]).count(), 0);
    }

    #[test]
    fn long_strings_truncate_on_char_boundary() {
        let long = "é".repeat(40_000);
        let mut rec = RecorderSink::new();
        rec.on_capture_error(HostTime::ZERO, &CaptureError::from_name(long));
        let event = decode(rec.as_bytes()).next().expect("decoded");
        let RecordedEvent::CaptureError { error, .. } = event else {
            panic!("expected capture error");
        };
        assert_eq!(error.name().len(), 65_534, "largest even byte count");
    }
}
