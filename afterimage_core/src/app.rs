// Copyright 2026 the Afterimage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Top-level application context.
//!
//! [`MirrorApp`] ties one [`DelayMirror`] to the capture source, display
//! surface and timers it drives. It is constructed explicitly and handed to
//! whatever runs the event loop; there is no global instance.
//!
//! The capture source arrives later than everything else: acquiring it is
//! asynchronous and may fail. [`MirrorApp::attach_source`] takes the outcome
//! of that acquisition. On failure the user is notified and the app stays
//! Idle; every `start` afterwards reports [`MirrorError::NoSource`].

use core::fmt;

use crate::backend::{FrameSource, Notifier, Surface};
use crate::config::MirrorConfig;
use crate::error::{CaptureError, MirrorError, ParseDelayError};
use crate::mirror::{DelayMirror, TickOutcome};
use crate::time::Duration;
use crate::timer::{TimerFire, TimerHost};
use crate::trace::Tracer;

/// The delayed mirror together with everything it drives.
pub struct MirrorApp<S: FrameSource, D, T> {
    mirror: DelayMirror<S::Image>,
    source: Option<S>,
    surface: D,
    timers: T,
}

impl<S: FrameSource, D, T> fmt::Debug for MirrorApp<S, D, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MirrorApp")
            .field("state", &self.mirror.state())
            .field("epoch", &self.mirror.epoch())
            .field("buffered", &self.mirror.buffered())
            .field("has_source", &self.source.is_some())
            .finish_non_exhaustive()
    }
}

impl<S, D, T> MirrorApp<S, D, T>
where
    S: FrameSource,
    D: Surface<Image = S::Image>,
    T: TimerHost,
{
    /// Creates an app with no capture source yet.
    ///
    /// # Panics
    ///
    /// Panics if `config.sample_period` is zero.
    #[must_use]
    pub fn new(config: MirrorConfig, surface: D, timers: T) -> Self {
        Self {
            mirror: DelayMirror::new(config),
            source: None,
            surface,
            timers,
        }
    }

    /// Takes the outcome of acquiring the capture source.
    ///
    /// On failure the error is traced, `notifier` shows its
    /// [notification message](CaptureError::notification_message), and the
    /// error is handed back. Nothing is retried.
    ///
    /// # Errors
    ///
    /// Returns the acquisition error unchanged.
    pub fn attach_source(
        &mut self,
        acquired: Result<S, CaptureError>,
        notifier: &mut impl Notifier,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), CaptureError> {
        match acquired {
            Ok(source) => {
                self.source = Some(source);
                Ok(())
            }
            Err(error) => {
                tracer.capture_error(self.timers.now(), &error);
                notifier.notify(&error.notification_message());
                Err(error)
            }
        }
    }

    /// Starts a fresh session that plays back after `delay`.
    ///
    /// # Errors
    ///
    /// [`MirrorError::NoSource`] before a source is attached, otherwise any
    /// error from [`DelayMirror::start`].
    pub fn start(&mut self, delay: Duration, tracer: &mut Tracer<'_>) -> Result<(), MirrorError> {
        let Some(source) = &self.source else {
            return Err(MirrorError::NoSource);
        };
        self.mirror
            .start(delay, source, &mut self.surface, &mut self.timers, tracer)
    }

    /// Starts a session with the configured default delay.
    ///
    /// # Errors
    ///
    /// Same as [`start`](Self::start).
    pub fn start_default(&mut self, tracer: &mut Tracer<'_>) -> Result<(), MirrorError> {
        let delay = self.mirror.config().default_delay;
        self.start(delay, tracer)
    }

    /// Handles a delay selection from the control surface.
    ///
    /// A malformed selection is traced and ignored; the running session
    /// continues untouched.
    ///
    /// # Errors
    ///
    /// Same as [`start`](Self::start) for a well-formed selection.
    pub fn select_delay(
        &mut self,
        selection: Result<Duration, ParseDelayError>,
        tracer: &mut Tracer<'_>,
    ) -> Result<(), MirrorError> {
        match selection {
            Ok(delay) => self.start(delay, tracer),
            Err(error) => {
                tracer.invalid_delay(self.timers.now(), &error);
                Ok(())
            }
        }
    }

    /// Ends the current session. See [`DelayMirror::clear`].
    pub fn clear(&mut self, tracer: &mut Tracer<'_>) {
        self.mirror
            .clear(&mut self.surface, &mut self.timers, tracer);
    }

    /// Routes a timer fire to the mirror.
    pub fn on_timer(&mut self, fire: TimerFire, tracer: &mut Tracer<'_>) -> TickOutcome {
        let Some(source) = self.source.as_mut() else {
            return TickOutcome::Stale;
        };
        self.mirror
            .on_timer(fire, source, &mut self.surface, &mut self.timers, tracer)
    }

    /// The mirror state machine.
    #[must_use]
    pub const fn mirror(&self) -> &DelayMirror<S::Image> {
        &self.mirror
    }

    /// The attached capture source, if any.
    #[must_use]
    pub const fn source(&self) -> Option<&S> {
        self.source.as_ref()
    }

    /// The display surface.
    #[must_use]
    pub const fn surface(&self) -> &D {
        &self.surface
    }

    /// The display surface, mutably.
    pub fn surface_mut(&mut self) -> &mut D {
        &mut self.surface
    }

    /// The timer host.
    #[must_use]
    pub const fn timers(&self) -> &T {
        &self.timers
    }

    /// The timer host, mutably.
    pub fn timers_mut(&mut self) -> &mut T {
        &mut self.timers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CaptureErrorKind;
    use crate::geometry::FrameSize;
    use crate::mirror::MirrorState;
    use crate::testing::{FakeNotifier, FakeSource, FakeSurface, ManualTimers};
    use crate::timer::TimerKind;

    type App = MirrorApp<FakeSource, FakeSurface, ManualTimers>;

    fn app() -> App {
        MirrorApp::new(
            MirrorConfig::web(),
            FakeSurface::new(320),
            ManualTimers::default(),
        )
    }

    #[test]
    fn start_without_source_fails() {
        let mut app = app();
        assert_eq!(
            app.start(Duration::ZERO, &mut Tracer::none()),
            Err(MirrorError::NoSource)
        );
        assert_eq!(app.mirror().state(), MirrorState::Idle);
    }

    #[test]
    fn rejected_capture_notifies_and_stays_idle() {
        let mut app = app();
        let mut notifier = FakeNotifier::default();

        let result = app.attach_source(
            Err(CaptureError::from_name("NotAllowedError")),
            &mut notifier,
            &mut Tracer::none(),
        );

        let err = result.expect_err("acquisition failed");
        assert_eq!(err.kind(), CaptureErrorKind::NotAllowed);
        assert_eq!(notifier.messages.len(), 1, "exactly one notification");
        assert!(notifier.messages[0].contains("NotAllowedError"));
        assert!(app.source().is_none());
        assert_eq!(
            app.start_default(&mut Tracer::none()),
            Err(MirrorError::NoSource)
        );
        assert_eq!(app.mirror().state(), MirrorState::Idle);
        assert_eq!(app.mirror().buffered(), 0);
    }

    #[test]
    fn attached_source_starts_default_session() {
        let mut app = app();
        let mut notifier = FakeNotifier::default();
        app.attach_source(
            Ok(FakeSource::new(FrameSize::new(640, 480))),
            &mut notifier,
            &mut Tracer::none(),
        )
        .unwrap();

        app.start_default(&mut Tracer::none()).unwrap();

        assert!(notifier.messages.is_empty());
        assert_eq!(app.mirror().state(), MirrorState::Recording);
        assert_eq!(
            app.timers().delay(TimerKind::RenderStart),
            Some(Duration::from_millis(3_000))
        );
    }

    #[test]
    fn selecting_a_delay_restarts_the_session() {
        let mut app = app();
        app.attach_source(
            Ok(FakeSource::new(FrameSize::new(640, 480))),
            &mut FakeNotifier::default(),
            &mut Tracer::none(),
        )
        .unwrap();
        app.start_default(&mut Tracer::none()).unwrap();
        let first_epoch = app.mirror().epoch();

        app.select_delay(Ok(Duration::from_millis(1_000)), &mut Tracer::none())
            .unwrap();

        assert_eq!(app.mirror().epoch(), first_epoch + 1);
        assert_eq!(app.timers().epoch(TimerKind::Capture), Some(first_epoch + 1));
        assert_eq!(
            app.timers().delay(TimerKind::RenderStart),
            Some(Duration::from_millis(1_000))
        );
    }

    #[test]
    fn malformed_selection_keeps_session() {
        let mut app = app();
        app.attach_source(
            Ok(FakeSource::new(FrameSize::new(640, 480))),
            &mut FakeNotifier::default(),
            &mut Tracer::none(),
        )
        .unwrap();
        app.start_default(&mut Tracer::none()).unwrap();
        let epoch = app.mirror().epoch();

        let bad = crate::control::parse_delay("soon");
        assert_eq!(app.select_delay(bad, &mut Tracer::none()), Ok(()));

        assert_eq!(app.mirror().epoch(), epoch, "no restart");
        assert_eq!(app.mirror().state(), MirrorState::Recording);
    }

    #[test]
    fn timer_fire_without_source_is_stale() {
        let mut app = app();
        let outcome = app.on_timer(
            TimerFire {
                kind: TimerKind::Capture,
                epoch: 0,
            },
            &mut Tracer::none(),
        );
        assert_eq!(outcome, TickOutcome::Stale);
    }

    #[test]
    fn start_then_clear_leaves_nothing_armed() {
        let mut app = app();
        app.attach_source(
            Ok(FakeSource::new(FrameSize::new(640, 480))),
            &mut FakeNotifier::default(),
            &mut Tracer::none(),
        )
        .unwrap();
        app.start(Duration::from_millis(500), &mut Tracer::none())
            .unwrap();
        app.clear(&mut Tracer::none());

        for kind in TimerKind::ALL {
            assert!(!app.timers().is_armed(kind), "{kind:?} still armed");
        }
        assert_eq!(app.mirror().buffered(), 0);
        assert_eq!(app.surface().clears, 2);
    }
}
