// Copyright 2026 the Afterimage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web backend for afterimage.
//!
//! This crate provides integration with browser APIs:
//!
//! - [`BrowserTimers`]: `setInterval` / `setTimeout` timer host
//! - [`Camera`]: `getUserMedia` capture source bound to a `<video>` element
//! - [`CanvasSurface`]: 2-D canvas display surface
//! - [`bind_delay_buttons`]: click handlers for `name="delay"` controls
//! - [`ConsoleSink`] and [`AlertNotifier`]: console tracing and
//!   `window.alert` notifications

#![no_std]

extern crate alloc;

mod camera;
mod console;
mod controls;
mod surface;
mod timers;

pub use afterimage_core::backend::{FrameSource, Notifier, Surface};
pub use camera::Camera;
pub use console::{AlertNotifier, ConsoleSink};
pub use controls::bind_delay_buttons;
pub use surface::CanvasSurface;
pub use timers::BrowserTimers;

use afterimage_core::time::HostTime;
use wasm_bindgen::{JsCast as _, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

/// Returns the current host time from `performance.now()`.
///
/// The returned [`HostTime`] is in microsecond ticks.
#[must_use]
pub fn now() -> HostTime {
    timers::host_time_from_millis(timers::performance_now())
}

/// Fetches the 2-D rendering context of `canvas`.
pub(crate) fn context_2d(
    canvas: &HtmlCanvasElement,
) -> Result<CanvasRenderingContext2d, JsValue> {
    canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2d canvas context unavailable"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(JsValue::from)
}
