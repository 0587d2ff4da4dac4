// Copyright 2026 the Afterimage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! FIFO of captured snapshots awaiting delayed playback.
//!
//! [`SnapshotBuffer`] is the only owner of a [`Snapshot`] between capture and
//! playback. Snapshots enter at the tail and leave from the head; each one
//! carries a sequence number assigned at insertion so arrival order stays
//! observable after the fact.

use alloc::collections::VecDeque;

use crate::geometry::FrameSize;
use crate::time::Duration;

/// One captured, scaled video frame held pending delayed display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot<I> {
    /// Position in arrival order, starting at zero for each session.
    pub seq: u64,
    /// Size the image was captured at.
    pub size: FrameSize,
    /// The captured image.
    pub image: I,
}

/// First-in first-out queue of [`Snapshot`]s.
#[derive(Clone, Debug)]
pub struct SnapshotBuffer<I> {
    queue: VecDeque<Snapshot<I>>,
    next_seq: u64,
}

impl<I> Default for SnapshotBuffer<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I> SnapshotBuffer<I> {
    /// Creates an empty buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            next_seq: 0,
        }
    }

    /// Appends an image at the tail and returns its sequence number.
    pub fn push(&mut self, image: I, size: FrameSize) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push_back(Snapshot { seq, size, image });
        seq
    }

    /// Removes and returns the oldest snapshot, or `None` when empty.
    pub fn pop(&mut self) -> Option<Snapshot<I>> {
        self.queue.pop_front()
    }

    /// Returns the oldest snapshot without removing it.
    #[must_use]
    pub fn peek(&self) -> Option<&Snapshot<I>> {
        self.queue.front()
    }

    /// Number of buffered snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns `true` if nothing is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Sequence number the next pushed snapshot will receive.
    #[must_use]
    pub const fn next_seq(&self) -> u64 {
        self.next_seq
    }

    /// Drops every snapshot and restarts numbering at zero.
    ///
    /// Returns how many snapshots were discarded.
    pub fn clear(&mut self) -> usize {
        let discarded = self.queue.len();
        self.queue.clear();
        self.next_seq = 0;
        discarded
    }
}

/// Length the buffer settles at once draining runs: `ceil(delay / period)`.
///
/// Capture and drain share one period, so after the initial delay each drain
/// removes roughly what each capture adds. Returns zero for a zero period.
#[must_use]
pub const fn expected_steady_len(delay: Duration, period: Duration) -> u64 {
    delay.div_ceil(period)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: FrameSize = FrameSize::new(4, 3);

    #[test]
    fn pops_in_arrival_order() {
        let mut buf = SnapshotBuffer::new();
        for image in ['a', 'b', 'c'] {
            buf.push(image, SIZE);
        }
        let order: alloc::vec::Vec<_> = core::iter::from_fn(|| buf.pop())
            .map(|s| (s.seq, s.image))
            .collect();
        assert_eq!(order, [(0, 'a'), (1, 'b'), (2, 'c')]);
    }

    #[test]
    fn pop_on_empty_is_none() {
        let mut buf: SnapshotBuffer<u8> = SnapshotBuffer::new();
        assert!(buf.pop().is_none());
        assert!(buf.is_empty());
    }

    #[test]
    fn interleaved_push_pop_keeps_fifo() {
        let mut buf = SnapshotBuffer::new();
        buf.push(10, SIZE);
        buf.push(11, SIZE);
        assert_eq!(buf.pop().map(|s| s.image), Some(10));
        buf.push(12, SIZE);
        assert_eq!(buf.peek().map(|s| s.seq), Some(1));
        assert_eq!(buf.pop().map(|s| s.image), Some(11));
        assert_eq!(buf.pop().map(|s| s.image), Some(12));
        assert_eq!(buf.len(), 0);
    }

    #[test]
    fn clear_resets_numbering() {
        let mut buf = SnapshotBuffer::new();
        buf.push((), SIZE);
        buf.push((), SIZE);
        assert_eq!(buf.clear(), 2);
        assert_eq!(buf.next_seq(), 0);
        assert_eq!(buf.push((), SIZE), 0, "numbering restarts per session");
    }

    #[test]
    fn steady_len_rounds_up() {
        let p = Duration::from_millis(100);
        assert_eq!(expected_steady_len(Duration::from_millis(3_000), p), 30);
        assert_eq!(expected_steady_len(Duration::from_millis(250), p), 3);
        assert_eq!(expected_steady_len(Duration::from_millis(1), Duration::ZERO), 0);
    }
}
