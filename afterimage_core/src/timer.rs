// Copyright 2026 the Afterimage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timer contract between the mirror and its host event loop.
//!
//! A session uses exactly three timers, one per [`TimerKind`]: the capture
//! interval, the one-shot render start, and the drain interval. The mirror
//! arms and cancels them through a [`TimerHost`]; when a timer elapses the
//! host hands a [`TimerFire`] back to
//! [`DelayMirror::on_timer`](crate::mirror::DelayMirror::on_timer).
//!
//! Every armed timer carries the session *epoch* it was armed in. A fire
//! whose epoch no longer matches the mirror's is stale and is ignored, so a
//! callback that was already queued when `clear()` ran cannot touch the next
//! session.
//!
//! Capture and drain are independent schedules with the same nominal period.
//! When both are due at the same instant, which runs first is up to the host;
//! nothing in the mirror depends on that order.

use crate::time::{Duration, HostTime};

/// Identifies one of the three session timers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Periodic sampling of the capture source.
    Capture,
    /// One-shot wait before draining begins.
    RenderStart,
    /// Periodic playback of the oldest snapshot.
    Drain,
}

impl TimerKind {
    /// All timer kinds, in slot order.
    pub const ALL: [Self; 3] = [Self::Capture, Self::RenderStart, Self::Drain];

    /// Dense index for slot arrays.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Capture => 0,
            Self::RenderStart => 1,
            Self::Drain => 2,
        }
    }

    /// Short lowercase name for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Capture => "capture",
            Self::RenderStart => "render-start",
            Self::Drain => "drain",
        }
    }
}

/// A timer that elapsed, as delivered by a [`TimerHost`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerFire {
    /// Which timer elapsed.
    pub kind: TimerKind,
    /// Session epoch the timer was armed in.
    pub epoch: u64,
}

/// A source of periodic and one-shot callbacks.
///
/// Arming a kind that is already armed replaces the previous timer.
/// Cancelling a kind that is not armed is a no-op.
pub trait TimerHost {
    /// Current time on the host clock.
    fn now(&self) -> HostTime;

    /// Fires `kind` every `period`, first after one full period.
    fn set_interval(&mut self, kind: TimerKind, epoch: u64, period: Duration);

    /// Fires `kind` once after `delay`.
    fn set_timeout(&mut self, kind: TimerKind, epoch: u64, delay: Duration);

    /// Cancels `kind`. No further fires for it are delivered.
    fn cancel(&mut self, kind: TimerKind);

    /// Returns `true` if `kind` is armed.
    fn is_armed(&self, kind: TimerKind) -> bool;
}
