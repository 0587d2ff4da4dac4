// Copyright 2026 the Afterimage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Snapshot buffering and delayed playback for a lagging webcam mirror.
//!
//! `afterimage_core` holds every piece of the delayed mirror that does not
//! touch a browser API. It is `no_std` compatible (with `alloc`) so the same
//! state machine runs under `wasm32` and under a native virtual event loop.
//!
//! # Architecture
//!
//! A session is driven entirely by timer callbacks:
//!
//! ```text
//!   MirrorApp::start(delay)
//!       │  clear ─► start_record ─► start_render
//!       ▼
//!   TimerHost ──(Capture every P)──► DelayMirror ──► FrameSource::capture
//!       │                                 │               │
//!       │                                 ▼               ▼
//!       │                          Surface::set_display_height
//!       │                                 │
//!       │                          SnapshotBuffer::push (tail)
//!       │
//!       ├──(RenderStart after delay)──► arm Drain every P
//!       │
//!       └──(Drain every P)──► SnapshotBuffer::pop (head) ──► Surface::draw
//! ```
//!
//! **[`mirror`]**: The [`DelayMirror`](mirror::DelayMirror) state machine:
//! Idle → Recording → Draining, with `clear()` back to Idle from anywhere.
//!
//! **[`buffer`]**: FIFO of [`Snapshot`](buffer::Snapshot)s with per-session
//! sequence numbers.
//!
//! **[`geometry`]**: Frame sizes and aspect-preserving scaling.
//!
//! **[`timer`]**: The [`TimerHost`](timer::TimerHost) contract and the
//! epoch-tagged [`TimerFire`](timer::TimerFire) a host hands back.
//!
//! **[`backend`]**: [`FrameSource`](backend::FrameSource),
//! [`Surface`](backend::Surface) and [`Notifier`](backend::Notifier), the
//! traits platform backends implement.
//!
//! **[`app`]**: [`MirrorApp`](app::MirrorApp), the explicitly constructed
//! top-level context that owns the source, surface and timers.
//!
//! **[`control`]**: Parsing of user-selected delays.
//!
//! **[`config`]**: [`MirrorConfig`](config::MirrorConfig) with the sample
//! period, default delay and delay presets.
//!
//! **[`error`]**: Capture, state machine and parse errors.
//!
//! **[`time`]**: Microsecond [`HostTime`](time::HostTime) and
//! [`Duration`](time::Duration).
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! session instrumentation, with a zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod app;
pub mod backend;
pub mod buffer;
pub mod config;
pub mod control;
pub mod error;
pub mod geometry;
pub mod mirror;
pub mod time;
pub mod timer;
pub mod trace;

#[cfg(test)]
mod testing;
