// Copyright 2026 the Afterimage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Virtual clock and timer queue.

use afterimage_core::time::{Duration, HostTime};
use afterimage_core::timer::{TimerFire, TimerHost, TimerKind};

/// How [`VirtualTimers`] orders timers that fall due at the same instant.
///
/// Browsers run same-instant timers in the order they were queued, but
/// nothing in the mirror may rely on that. Flipping the order exercises the
/// other interleaving.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TieOrder {
    /// Earliest-armed first, as browsers do.
    #[default]
    ArmOrder,
    /// Latest-armed first.
    ReverseArmOrder,
}

#[derive(Clone, Copy, Debug)]
struct Slot {
    epoch: u64,
    due: HostTime,
    period: Option<Duration>,
    queued: u64,
}

/// A [`TimerHost`] driven by an explicit virtual clock.
///
/// Nothing fires on its own: call [`pop_due`](Self::pop_due) to take the next
/// fire up to some instant. Intervals re-queue themselves one period after
/// their due time; timeouts disarm after firing.
#[derive(Clone, Debug, Default)]
pub struct VirtualTimers {
    now: HostTime,
    slots: [Option<Slot>; 3],
    queue_counter: u64,
    tie_order: TieOrder,
}

impl VirtualTimers {
    /// Creates a timer queue at time zero with browser tie ordering.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a timer queue with the given tie ordering.
    #[must_use]
    pub fn with_tie_order(tie_order: TieOrder) -> Self {
        Self {
            tie_order,
            ..Self::default()
        }
    }

    /// Earliest due time among armed timers.
    #[must_use]
    pub fn next_due(&self) -> Option<HostTime> {
        self.slots.iter().flatten().map(|slot| slot.due).min()
    }

    /// Number of armed timers.
    #[must_use]
    pub fn armed_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Takes the next timer due at or before `until`, advancing the clock to
    /// its due time.
    pub fn pop_due(&mut self, until: HostTime) -> Option<TimerFire> {
        let tie_order = self.tie_order;
        let (index, slot) = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.map(|s| (i, s)))
            .filter(|(_, s)| s.due <= until)
            .min_by_key(|(_, s)| {
                let rank = match tie_order {
                    TieOrder::ArmOrder => s.queued,
                    TieOrder::ReverseArmOrder => u64::MAX - s.queued,
                };
                (s.due, rank)
            })?;

        self.now = self.now.max(slot.due);
        let kind = TimerKind::ALL[index];
        self.slots[index] = slot.period.map(|period| Slot {
            due: slot.due.saturating_add(period),
            queued: self.next_queued(),
            ..slot
        });
        Some(TimerFire {
            kind,
            epoch: slot.epoch,
        })
    }

    /// Moves the clock forward to `t`. Never moves it backwards.
    pub fn advance_to(&mut self, t: HostTime) {
        self.now = self.now.max(t);
    }

    fn next_queued(&mut self) -> u64 {
        let n = self.queue_counter;
        self.queue_counter += 1;
        n
    }

    fn arm(&mut self, kind: TimerKind, epoch: u64, after: Duration, period: Option<Duration>) {
        let queued = self.next_queued();
        self.slots[kind.index()] = Some(Slot {
            epoch,
            due: self.now.saturating_add(after),
            period,
            queued,
        });
    }
}

impl TimerHost for VirtualTimers {
    fn now(&self) -> HostTime {
        self.now
    }

    fn set_interval(&mut self, kind: TimerKind, epoch: u64, period: Duration) {
        // A zero period would re-queue at the same instant forever.
        let period = period.max(Duration(1));
        self.arm(kind, epoch, period, Some(period));
    }

    fn set_timeout(&mut self, kind: TimerKind, epoch: u64, delay: Duration) {
        self.arm(kind, epoch, delay, None);
    }

    fn cancel(&mut self, kind: TimerKind) {
        self.slots[kind.index()] = None;
    }

    fn is_armed(&self, kind: TimerKind) -> bool {
        self.slots[kind.index()].is_some()
    }
}
