// Copyright 2026 the Afterimage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal test doubles for unit tests in this crate.

use alloc::string::String;
use alloc::vec::Vec;

use crate::backend::{FrameSource, Notifier, Surface};
use crate::geometry::FrameSize;
use crate::time::{Duration, HostTime};
use crate::timer::{TimerHost, TimerKind};

/// Source whose images are the count of successful captures so far.
#[derive(Debug)]
pub(crate) struct FakeSource {
    size: Option<FrameSize>,
    warmup: u32,
    frames: u64,
    pub(crate) captured_sizes: Vec<FrameSize>,
}

impl FakeSource {
    pub(crate) fn new(size: FrameSize) -> Self {
        Self {
            size: Some(size),
            warmup: 0,
            frames: 0,
            captured_sizes: Vec::new(),
        }
    }

    pub(crate) fn without_size() -> Self {
        Self {
            size: None,
            ..Self::new(FrameSize::default())
        }
    }

    /// The first `n` captures return `None`.
    pub(crate) fn warming_up(mut self, n: u32) -> Self {
        self.warmup = n;
        self
    }
}

impl FrameSource for FakeSource {
    type Image = u64;

    fn native_size(&self) -> Option<FrameSize> {
        self.size
    }

    fn capture(&mut self, size: FrameSize) -> Option<u64> {
        if self.warmup > 0 {
            self.warmup -= 1;
            return None;
        }
        self.captured_sizes.push(size);
        let frame = self.frames;
        self.frames += 1;
        Some(frame)
    }
}

#[derive(Debug)]
pub(crate) struct FakeSurface {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) clears: usize,
    pub(crate) drawn: Vec<u64>,
}

impl FakeSurface {
    pub(crate) fn new(width: u32) -> Self {
        Self {
            width,
            height: 150,
            clears: 0,
            drawn: Vec::new(),
        }
    }
}

impl Surface for FakeSurface {
    type Image = u64;

    fn display_width(&self) -> u32 {
        self.width
    }

    fn set_display_height(&mut self, height: u32) {
        self.height = height;
    }

    fn clear(&mut self) {
        self.clears += 1;
    }

    fn draw(&mut self, image: &u64) {
        self.drawn.push(*image);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Armed {
    Interval(Duration),
    Timeout(Duration),
}

/// Records what is armed; fires are delivered by hand.
#[derive(Debug, Default)]
pub(crate) struct ManualTimers {
    pub(crate) now: HostTime,
    slots: [Option<(u64, Armed)>; 3],
}

impl ManualTimers {
    pub(crate) fn period(&self, kind: TimerKind) -> Option<Duration> {
        match self.slots[kind.index()] {
            Some((_, Armed::Interval(p))) => Some(p),
            _ => None,
        }
    }

    pub(crate) fn delay(&self, kind: TimerKind) -> Option<Duration> {
        match self.slots[kind.index()] {
            Some((_, Armed::Timeout(d))) => Some(d),
            _ => None,
        }
    }

    pub(crate) fn epoch(&self, kind: TimerKind) -> Option<u64> {
        self.slots[kind.index()].map(|(epoch, _)| epoch)
    }
}

impl TimerHost for ManualTimers {
    fn now(&self) -> HostTime {
        self.now
    }

    fn set_interval(&mut self, kind: TimerKind, epoch: u64, period: Duration) {
        self.slots[kind.index()] = Some((epoch, Armed::Interval(period)));
    }

    fn set_timeout(&mut self, kind: TimerKind, epoch: u64, delay: Duration) {
        self.slots[kind.index()] = Some((epoch, Armed::Timeout(delay)));
    }

    fn cancel(&mut self, kind: TimerKind) {
        self.slots[kind.index()] = None;
    }

    fn is_armed(&self, kind: TimerKind) -> bool {
        self.slots[kind.index()].is_some()
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakeNotifier {
    pub(crate) messages: Vec<String>,
}

impl Notifier for FakeNotifier {
    fn notify(&mut self, message: &str) {
        self.messages.push(message.into());
    }
}
