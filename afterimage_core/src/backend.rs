// Copyright 2026 the Afterimage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contract for platform integrations.
//!
//! Afterimage splits platform-specific work into *backend* crates. Each
//! backend provides the following pieces:
//!
//! - **Capture source**: Implements [`FrameSource`] over a live video
//!   stream. Acquiring the stream is asynchronous and platform-specific, so
//!   it is not part of the trait; a backend hands the result to
//!   [`MirrorApp::attach_source`](crate::app::MirrorApp::attach_source) as a
//!   `Result<_, CaptureError>`.
//!
//! - **Display surface**: Implements [`Surface`]: a 2-D target that can be
//!   resized, cleared, and drawn on at the origin.
//!
//! - **Timers**: Implements [`TimerHost`](crate::timer::TimerHost) over the
//!   platform's periodic and one-shot callbacks (`setInterval`/`setTimeout`
//!   on the web, a virtual clock in tests).
//!
//! - **Notifications**: Implements [`Notifier`] to put a blocking message in
//!   front of the user. Only capture failures use it.
//!
//! # Crate boundaries
//!
//! `afterimage_core` owns the data model, the state machine and this contract
//! module. Backend crates depend on `afterimage_core` and provide platform
//! glue. Application code depends on both and wires them together.
//!
//! [`CaptureError`]: crate::error::CaptureError

use crate::geometry::FrameSize;

/// A live video input that can be sampled into images.
pub trait FrameSource {
    /// Image type produced by [`capture`](Self::capture).
    type Image;

    /// Native resolution of the active stream, if known.
    fn native_size(&self) -> Option<FrameSize>;

    /// Draws the current frame into a new image of `size`.
    ///
    /// Returns `None` when no frame is available yet (for example while the
    /// stream is still loading). The mirror skips that sample.
    fn capture(&mut self, size: FrameSize) -> Option<Self::Image>;
}

/// A 2-D drawing target with explicit pixel dimensions.
pub trait Surface {
    /// Image type accepted by [`draw`](Self::draw).
    type Image;

    /// Current display width in pixels. Snapshots are scaled to this width.
    fn display_width(&self) -> u32;

    /// Resizes the surface to `height` pixels, keeping the current width.
    fn set_display_height(&mut self, height: u32);

    /// Clears the whole surface.
    fn clear(&mut self);

    /// Draws `image` with its top-left corner at the origin.
    fn draw(&mut self, image: &Self::Image);
}

/// Presents a blocking message to the user.
pub trait Notifier {
    /// Shows `message`. Returns once the user has seen it, where the
    /// platform supports that.
    fn notify(&mut self, message: &str);
}
