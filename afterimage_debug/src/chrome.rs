// Copyright 2026 the Afterimage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! Each session becomes a duration slice from its recording start to the
//! `clear()` that ends it. Captures and draws are instant events on separate
//! tracks, and the buffer length is plotted as a counter.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use afterimage_core::time::HostTime;

use crate::recorder::{RecordedEvent, decode};

const TID_SESSION: u32 = 0;
const TID_CAPTURE: u32 = 1;
const TID_PLAYBACK: u32 = 2;

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Host time ticks are microseconds, which is the format's native unit.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    let mut open_session: Option<u64> = None;

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::RecordStart(e) => {
                open_session = Some(e.epoch);
                events.push(json!({
                    "ph": "B",
                    "name": format!("session #{}", e.epoch),
                    "cat": "Session",
                    "ts": us(e.at),
                    "pid": 0,
                    "tid": TID_SESSION,
                    "args": {
                        "source": format!("{:?}", e.source),
                        "sample_period_ms": e.sample_period.as_millis(),
                    }
                }));
            }
            RecordedEvent::RenderSchedule(e) => {
                events.push(instant("RenderSchedule", "Session", TID_SESSION, e.at, json!({
                    "epoch": e.epoch,
                    "delay_ms": e.delay.as_millis(),
                })));
            }
            RecordedEvent::RenderStart(e) => {
                events.push(instant("RenderStart", "Session", TID_SESSION, e.at, json!({
                    "epoch": e.epoch,
                    "buffered": e.buffered,
                })));
            }
            RecordedEvent::Capture(e) => {
                events.push(instant("Capture", "Capture", TID_CAPTURE, e.at, json!({
                    "seq": e.seq,
                    "size": format!("{:?}", e.size),
                })));
                events.push(buffered_counter(e.at, e.buffered));
            }
            RecordedEvent::CaptureMiss(e) => {
                events.push(instant("CaptureMiss", "Capture", TID_CAPTURE, e.at, json!({
                    "epoch": e.epoch,
                })));
            }
            RecordedEvent::Draw(e) => {
                events.push(instant("Draw", "Playback", TID_PLAYBACK, e.at, json!({
                    "seq": e.seq,
                })));
                events.push(buffered_counter(e.at, e.buffered));
            }
            RecordedEvent::DrainSkip(e) => {
                events.push(instant("DrainSkip", "Playback", TID_PLAYBACK, e.at, json!({
                    "epoch": e.epoch,
                })));
            }
            RecordedEvent::StaleTick(e) => {
                events.push(instant("StaleTick", "Session", TID_SESSION, e.at, json!({
                    "kind": e.kind.as_str(),
                    "fired_epoch": e.fired_epoch,
                    "current_epoch": e.current_epoch,
                })));
            }
            RecordedEvent::Clear(e) => {
                if let Some(epoch) = open_session.take() {
                    events.push(json!({
                        "ph": "E",
                        "name": format!("session #{epoch}"),
                        "cat": "Session",
                        "ts": us(e.at),
                        "pid": 0,
                        "tid": TID_SESSION,
                        "args": {
                            "discarded": e.discarded,
                        }
                    }));
                }
                events.push(buffered_counter(e.at, 0));
            }
            RecordedEvent::CaptureError { at, error } => {
                events.push(instant("CaptureError", "Error", TID_SESSION, at, json!({
                    "name": error.name(),
                    "kind": format!("{:?}", error.kind()),
                })));
            }
            RecordedEvent::InvalidDelay { at, raw } => {
                events.push(instant("InvalidDelay", "Error", TID_SESSION, at, json!({
                    "raw": raw,
                })));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn us(t: HostTime) -> u64 {
    t.ticks()
}

fn instant(name: &str, cat: &str, tid: u32, at: HostTime, args: Value) -> Value {
    json!({
        "ph": "i",
        "name": name,
        "cat": cat,
        "ts": us(at),
        "pid": 0,
        "tid": tid,
        "s": "t",
        "args": args,
    })
}

fn buffered_counter(at: HostTime, buffered: usize) -> Value {
    json!({
        "ph": "C",
        "name": "buffer",
        "ts": us(at),
        "pid": 0,
        "args": {
            "snapshots": buffered,
        }
    })
}
