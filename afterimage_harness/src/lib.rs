// Copyright 2026 the Afterimage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic virtual event loop for afterimage sessions.
//!
//! A [`Session`] owns a [`MirrorApp`] wired to a [`SyntheticSource`], a
//! [`RecordingSurface`] and [`VirtualTimers`]. Time only moves when the caller
//! runs the loop, so every capture, draw and skip lands at an exact,
//! repeatable instant.

#![no_std]

extern crate alloc;

mod fakes;
mod timers;

pub use fakes::{Frame, RecordingNotifier, RecordingSurface, SyntheticSource};
pub use timers::{TieOrder, VirtualTimers};

use alloc::vec::Vec;
use core::fmt;

use afterimage_core::app::MirrorApp;
use afterimage_core::config::MirrorConfig;
use afterimage_core::error::{CaptureError, MirrorError};
use afterimage_core::mirror::TickOutcome;
use afterimage_core::time::{Duration, HostTime};
use afterimage_core::timer::{TimerFire, TimerHost};
use afterimage_core::trace::Tracer;

/// The app type a [`Session`] drives.
pub type SimulatedApp = MirrorApp<SyntheticSource, RecordingSurface, VirtualTimers>;

/// Why [`Session::launch`] did not leave a session running.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LaunchError {
    /// The capture source could not be acquired.
    Capture(CaptureError),
    /// The source was acquired but recording could not start.
    Mirror(MirrorError),
}

impl fmt::Display for LaunchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Capture(e) => write!(f, "launch failed: {e}"),
            Self::Mirror(e) => write!(f, "launch failed: {e}"),
        }
    }
}

impl core::error::Error for LaunchError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Capture(e) => Some(e),
            Self::Mirror(e) => Some(e),
        }
    }
}

/// A simulated mirror session on a virtual clock.
#[derive(Debug)]
pub struct Session {
    app: SimulatedApp,
    notifier: RecordingNotifier,
    outcomes: Vec<(HostTime, TickOutcome)>,
}

impl Session {
    /// Creates a session whose display is `display_width` pixels wide.
    ///
    /// # Panics
    ///
    /// Panics if `config.sample_period` is zero.
    #[must_use]
    pub fn new(config: MirrorConfig, display_width: u32, tie_order: TieOrder) -> Self {
        Self {
            app: MirrorApp::new(
                config,
                RecordingSurface::new(display_width),
                VirtualTimers::with_tie_order(tie_order),
            ),
            notifier: RecordingNotifier::default(),
            outcomes: Vec::new(),
        }
    }

    /// A session with the web configuration and browser tie ordering.
    #[must_use]
    pub fn web(display_width: u32) -> Self {
        Self::new(MirrorConfig::web(), display_width, TieOrder::ArmOrder)
    }

    /// Attaches the acquired source and starts the default-delay session,
    /// the same sequence the browser app runs once the camera resolves.
    ///
    /// # Errors
    ///
    /// [`LaunchError::Capture`] if acquisition failed (the notifier has been
    /// told), [`LaunchError::Mirror`] if recording could not start.
    pub fn launch(
        &mut self,
        acquired: Result<SyntheticSource, CaptureError>,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), LaunchError> {
        self.app
            .attach_source(acquired, &mut self.notifier, tracer)
            .map_err(LaunchError::Capture)?;
        self.app.start_default(tracer).map_err(LaunchError::Mirror)
    }

    /// Runs every timer due at or before `t`, then moves the clock to `t`.
    pub fn run_until(&mut self, t: HostTime, tracer: &mut Tracer<'_>) {
        while let Some(fire) = self.app.timers_mut().pop_due(t) {
            self.deliver(fire, tracer);
        }
        self.app.timers_mut().advance_to(t);
    }

    /// Runs the loop for `d` past the current time.
    pub fn run_for(&mut self, d: Duration, tracer: &mut Tracer<'_>) {
        let until = self.now().saturating_add(d);
        self.run_until(until, tracer);
    }

    /// Hands one fire to the app and logs the outcome at the current time.
    ///
    /// Use this to inject fires the timers would never produce themselves,
    /// such as one from an earlier session.
    pub fn deliver(&mut self, fire: TimerFire, tracer: &mut Tracer<'_>) -> TickOutcome {
        let outcome = self.app.on_timer(fire, tracer);
        self.outcomes.push((self.now(), outcome));
        outcome
    }

    /// Current virtual time.
    #[must_use]
    pub fn now(&self) -> HostTime {
        self.app.timers().now()
    }

    /// Every tick outcome so far, with the time it happened.
    #[must_use]
    pub fn outcomes(&self) -> &[(HostTime, TickOutcome)] {
        &self.outcomes
    }

    /// Messages shown to the user.
    #[must_use]
    pub fn notifications(&self) -> &[alloc::string::String] {
        &self.notifier.messages
    }

    /// The simulated app.
    #[must_use]
    pub const fn app(&self) -> &SimulatedApp {
        &self.app
    }

    /// The simulated app, mutably.
    pub fn app_mut(&mut self) -> &mut SimulatedApp {
        &mut self.app
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use afterimage_core::buffer::expected_steady_len;
    use afterimage_core::error::CaptureErrorKind;
    use afterimage_core::geometry::FrameSize;
    use afterimage_core::mirror::MirrorState;
    use afterimage_core::timer::TimerKind;
    use afterimage_core::trace::{CaptureEvent, TraceSink};

    const HD: FrameSize = FrameSize::new(1280, 720);

    fn ms(v: u64) -> HostTime {
        HostTime::from_millis(v)
    }

    fn launched(width: u32) -> Session {
        let mut session = Session::web(width);
        session
            .launch(Ok(SyntheticSource::new(HD)), &mut Tracer::none())
            .expect("launch");
        session
    }

    fn draws_at(session: &Session) -> Vec<(u64, u64)> {
        session
            .outcomes()
            .iter()
            .filter_map(|(at, o)| match o {
                TickOutcome::Drawn { seq } => Some((at.as_millis(), *seq)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn start_then_clear_never_ticks() {
        for delay in [0, 50, 1_000, 3_000, 10_000] {
            let mut s = launched(640);
            s.app_mut()
                .start(Duration::from_millis(delay), &mut Tracer::none())
                .expect("start");
            s.app_mut().clear(&mut Tracer::none());

            s.run_for(Duration::from_millis(20_000), &mut Tracer::none());

            assert!(s.outcomes().is_empty(), "delay {delay}: ticks after clear");
            assert_eq!(s.app().timers().armed_count(), 0, "delay {delay}");
            assert_eq!(s.app().mirror().buffered(), 0, "delay {delay}");
            assert!(s.app().surface().draws.is_empty(), "delay {delay}");
        }
    }

    #[test]
    fn clearing_twice_is_harmless() {
        let mut s = launched(640);
        s.run_until(ms(500), &mut Tracer::none());
        s.app_mut().clear(&mut Tracer::none());
        let epoch = s.app().mirror().epoch();
        let clears = s.app().surface().clears;

        s.app_mut().clear(&mut Tracer::none());

        assert_eq!(s.app().mirror().epoch(), epoch, "idle clear keeps epoch");
        assert_eq!(s.app().surface().clears, clears + 1);
        assert_eq!(s.app().mirror().state(), MirrorState::Idle);
    }

    #[test]
    fn samples_scale_to_display_width() {
        let mut s = launched(641);
        s.run_until(ms(100), &mut Tracer::none());

        assert_eq!(s.outcomes(), [(ms(100), TickOutcome::Captured { seq: 0 })]);
        assert_eq!(s.app().surface().height, 361, "640.5 rounds up");
        assert_eq!(s.app().source().map(SyntheticSource::produced), Some(1));
    }

    #[test]
    fn default_session_plays_back_three_seconds_late() {
        let mut s = launched(640);
        s.run_until(ms(3_100), &mut Tracer::none());

        let first_capture = s
            .outcomes()
            .iter()
            .find(|(_, o)| *o == TickOutcome::Captured { seq: 0 })
            .map(|(at, _)| at.as_millis());
        assert_eq!(first_capture, Some(100));
        assert_eq!(draws_at(&s), [(3_100, 0)], "first draw is seq 0 at 3.1s");
        let drawn = s.app().surface().last_drawn().copied().expect("drawn");
        assert_eq!(drawn.index, 0);
        assert_eq!(drawn.size, FrameSize::new(640, 360));
    }

    #[test]
    fn playback_is_fifo() {
        let mut s = launched(640);
        s.run_until(ms(8_000), &mut Tracer::none());

        let draws = draws_at(&s);
        assert_eq!(draws.len(), 50, "draws from 3.1s through 8.0s");
        for (i, (at, seq)) in draws.iter().enumerate() {
            assert_eq!(*seq, i as u64, "draw {i} out of order");
            assert_eq!(*at, 3_100 + 100 * i as u64, "draw {i} mistimed");
        }
        let indices: Vec<u64> = s.app().surface().draws.iter().map(|f| f.index).collect();
        assert!(indices.windows(2).all(|w| w[1] == w[0] + 1));
    }

    #[test]
    fn buffer_settles_at_delay_over_period() {
        let mut s = launched(640);
        s.run_until(ms(20_000), &mut Tracer::none());

        let config = s.app().mirror().config();
        let expected = expected_steady_len(config.default_delay, config.sample_period);
        assert_eq!(expected, 30);
        assert_eq!(s.app().mirror().buffered() as u64, expected);
        let stats = s.app().mirror().stats();
        assert_eq!(stats.captured, 200);
        assert_eq!(stats.drawn, 170);
        assert_eq!(stats.skipped, 0);
    }

    #[test]
    fn empty_buffer_drain_is_skipped() {
        let mut s = Session::web(640);
        s.launch(
            Ok(SyntheticSource::new(HD).warming_up(1)),
            &mut Tracer::none(),
        )
        .expect("launch");
        s.app_mut()
            .start(Duration::from_millis(50), &mut Tracer::none())
            .expect("start");

        s.run_until(ms(250), &mut Tracer::none());

        assert_eq!(
            s.outcomes(),
            [
                (ms(50), TickOutcome::RenderStarted),
                (ms(100), TickOutcome::CaptureMissed),
                (ms(150), TickOutcome::Skipped),
                (ms(200), TickOutcome::Captured { seq: 0 }),
                (ms(250), TickOutcome::Drawn { seq: 0 }),
            ]
        );
        assert_eq!(s.app().surface().draws.len(), 1);
    }

    #[test]
    fn zero_delay_tie_order_is_not_guaranteed() {
        let run = |tie_order| {
            let mut s = Session::new(MirrorConfig::web(), 640, tie_order);
            s.launch(Ok(SyntheticSource::new(HD)), &mut Tracer::none())
                .expect("launch");
            s.app_mut()
                .start(Duration::ZERO, &mut Tracer::none())
                .expect("start");
            s.run_until(ms(100), &mut Tracer::none());
            s.outcomes().to_vec()
        };

        assert_eq!(
            run(TieOrder::ArmOrder),
            [
                (ms(0), TickOutcome::RenderStarted),
                (ms(100), TickOutcome::Captured { seq: 0 }),
                (ms(100), TickOutcome::Drawn { seq: 0 }),
            ]
        );
        assert_eq!(
            run(TieOrder::ReverseArmOrder),
            [
                (ms(0), TickOutcome::RenderStarted),
                (ms(100), TickOutcome::Skipped),
                (ms(100), TickOutcome::Captured { seq: 0 }),
            ]
        );
    }

    #[test]
    fn denied_camera_notifies_once_and_stays_idle() {
        let mut s = Session::web(640);
        let err = s
            .launch(
                Err(CaptureError::from_name("NotAllowedError")),
                &mut Tracer::none(),
            )
            .expect_err("denied");

        let LaunchError::Capture(capture) = &err else {
            panic!("expected a capture error, got {err:?}");
        };
        assert_eq!(capture.kind(), CaptureErrorKind::NotAllowed);
        assert_eq!(s.notifications().len(), 1);
        assert!(s.notifications()[0].contains("NotAllowedError"));

        s.run_for(Duration::from_millis(10_000), &mut Tracer::none());
        assert!(s.outcomes().is_empty());
        assert_eq!(s.app().mirror().state(), MirrorState::Idle);
        assert_eq!(s.app().mirror().buffered(), 0);
    }

    #[test]
    fn missing_metadata_fails_to_start() {
        let mut s = Session::web(640);
        let err = s
            .launch(Ok(SyntheticSource::without_metadata()), &mut Tracer::none())
            .expect_err("no size");
        assert_eq!(err, LaunchError::Mirror(MirrorError::NoVideoSize));
        assert_eq!(s.app().timers().armed_count(), 0);
        assert!(s.notifications().is_empty());
    }

    #[test]
    fn restart_discards_the_old_session() {
        let mut s = launched(640);
        s.run_until(ms(3_500), &mut Tracer::none());
        let old_epoch = s.app().mirror().epoch();

        s.app_mut()
            .start(Duration::from_millis(1_000), &mut Tracer::none())
            .expect("restart");
        assert_eq!(s.app().mirror().buffered(), 0);
        assert_eq!(s.app().mirror().state(), MirrorState::Recording);

        let stale = s.deliver(
            TimerFire {
                kind: TimerKind::Drain,
                epoch: old_epoch,
            },
            &mut Tracer::none(),
        );
        assert_eq!(stale, TickOutcome::Stale);

        let before = s.app().surface().draws.len();
        s.run_until(ms(4_600), &mut Tracer::none());
        let after: Vec<_> = s.app().surface().draws[before..].to_vec();
        assert_eq!(after.len(), 1, "one draw 1.1s after restart");
        // Frames 0..=34 were captured before the restart.
        assert_eq!(after[0].index, 35);
        assert_eq!(draws_at(&s).last(), Some(&(4_600, 0)), "seq restarts at 0");
    }

    #[derive(Default)]
    struct CaptureLog(Vec<CaptureEvent>);

    impl TraceSink for CaptureLog {
        fn on_capture(&mut self, e: &CaptureEvent) {
            self.0.push(*e);
        }
    }

    #[test]
    fn traced_captures_carry_virtual_time() {
        let mut log = CaptureLog::default();
        let mut s = Session::web(320);
        s.launch(Ok(SyntheticSource::new(HD)), &mut Tracer::new(&mut log))
            .expect("launch");
        s.run_until(ms(300), &mut Tracer::new(&mut log));

        let times: Vec<u64> = log.0.iter().map(|e| e.at.as_millis()).collect();
        assert_eq!(times, [100, 200, 300]);
        assert!(log.0.iter().all(|e| e.size == FrameSize::new(320, 180)));
    }
}
