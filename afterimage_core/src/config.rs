// Copyright 2026 the Afterimage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mirror configuration.

use crate::error::MirrorError;
use crate::time::Duration;

/// Configuration for a [`DelayMirror`](crate::mirror::DelayMirror).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MirrorConfig {
    /// Interval between captures, and between drained draws.
    pub sample_period: Duration,
    /// Delay used for the session started right after the camera comes up.
    pub default_delay: Duration,
    /// Delays offered as buttons, in milliseconds.
    pub delay_presets: &'static [u32],
}

impl MirrorConfig {
    /// Delay presets offered by [`web`](Self::web), in milliseconds.
    pub const WEB_PRESETS: &'static [u32] = &[0, 1_000, 3_000, 5_000, 10_000];

    /// Default configuration for the browser mirror.
    ///
    /// Samples every 100 ms and starts with a 3 s delay.
    #[must_use]
    pub const fn web() -> Self {
        Self {
            sample_period: Duration::from_millis(100),
            default_delay: Duration::from_millis(3_000),
            delay_presets: Self::WEB_PRESETS,
        }
    }

    /// Returns `self` with a different sample period.
    #[must_use]
    pub const fn with_sample_period(mut self, period: Duration) -> Self {
        self.sample_period = period;
        self
    }

    /// Returns `self` with a different default delay.
    #[must_use]
    pub const fn with_default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    /// Checks that the configuration can drive a session.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::ZeroSamplePeriod`] if the sample period is zero.
    pub const fn validate(&self) -> Result<(), MirrorError> {
        if self.sample_period.is_zero() {
            return Err(MirrorError::ZeroSamplePeriod);
        }
        Ok(())
    }
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self::web()
    }
}
