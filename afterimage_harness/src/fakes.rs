// Copyright 2026 the Afterimage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Synthetic capture source, recording surface and notifier.

use alloc::string::String;
use alloc::vec::Vec;

use afterimage_core::backend::{FrameSource, Notifier, Surface};
use afterimage_core::geometry::FrameSize;

/// A synthetic frame: the source's running frame index and the size it was
/// sampled at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Zero-based index of successful captures from this source.
    pub index: u64,
    /// Size requested by the mirror.
    pub size: FrameSize,
}

/// A camera stand-in with a fixed native resolution.
#[derive(Clone, Debug)]
pub struct SyntheticSource {
    native: Option<FrameSize>,
    warmup: u32,
    produced: u64,
}

impl SyntheticSource {
    /// A source that produces frames immediately.
    #[must_use]
    pub const fn new(native: FrameSize) -> Self {
        Self {
            native: Some(native),
            warmup: 0,
            produced: 0,
        }
    }

    /// A source whose metadata never arrived.
    #[must_use]
    pub const fn without_metadata() -> Self {
        Self {
            native: None,
            warmup: 0,
            produced: 0,
        }
    }

    /// Makes the first `ticks` captures come back empty, like a camera whose
    /// first frame has not decoded yet.
    #[must_use]
    pub const fn warming_up(mut self, ticks: u32) -> Self {
        self.warmup = ticks;
        self
    }

    /// Frames produced so far.
    #[must_use]
    pub const fn produced(&self) -> u64 {
        self.produced
    }
}

impl FrameSource for SyntheticSource {
    type Image = Frame;

    fn native_size(&self) -> Option<FrameSize> {
        self.native
    }

    fn capture(&mut self, size: FrameSize) -> Option<Frame> {
        if self.warmup > 0 {
            self.warmup -= 1;
            return None;
        }
        let index = self.produced;
        self.produced += 1;
        Some(Frame { index, size })
    }
}

/// A display surface that records everything done to it.
#[derive(Clone, Debug)]
pub struct RecordingSurface {
    /// Reported layout width.
    pub width: u32,
    /// Last height set by the mirror.
    pub height: u32,
    /// Frames drawn, oldest first.
    pub draws: Vec<Frame>,
    /// Number of `clear()` calls.
    pub clears: usize,
}

impl RecordingSurface {
    /// A surface laid out `width` pixels wide, at the default canvas height.
    #[must_use]
    pub const fn new(width: u32) -> Self {
        Self {
            width,
            height: 150,
            draws: Vec::new(),
            clears: 0,
        }
    }

    /// The most recently drawn frame.
    #[must_use]
    pub fn last_drawn(&self) -> Option<&Frame> {
        self.draws.last()
    }
}

impl Surface for RecordingSurface {
    type Image = Frame;

    fn display_width(&self) -> u32 {
        self.width
    }

    fn set_display_height(&mut self, height: u32) {
        self.height = height;
    }

    fn clear(&mut self) {
        self.clears += 1;
    }

    fn draw(&mut self, image: &Frame) {
        self.draws.push(*image);
    }
}

/// Collects notification messages instead of showing them.
#[derive(Clone, Debug, Default)]
pub struct RecordingNotifier {
    /// Messages in the order they were shown.
    pub messages: Vec<String>,
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self, message: &str) {
        self.messages.push(message.into());
    }
}
