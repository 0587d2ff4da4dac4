// Copyright 2026 the Afterimage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame sizes and aspect-preserving scaling.

use core::fmt;

/// Pixel dimensions of a video frame, snapshot or display surface.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FrameSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl FrameSize {
    /// Creates a size from width and height.
    #[inline]
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns `true` if either dimension is zero.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Scales `self` to `width`, preserving the aspect ratio.
    ///
    /// The height is `round(width * self.height / self.width)`, rounding
    /// halves up. A zero-width source yields a zero height.
    #[must_use]
    pub fn fit_width(self, width: u32) -> Self {
        Self::new(width, scaled_height(width, self))
    }
}

impl fmt::Debug for FrameSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Height of `source` scaled to `display_width`, rounded half-up.
///
/// Computed in integer arithmetic as
/// `(2 * display_width * height + width) / (2 * width)`, which equals
/// `round(display_width * height / width)` for all non-negative inputs.
#[must_use]
pub fn scaled_height(display_width: u32, source: FrameSize) -> u32 {
    if source.width == 0 {
        return 0;
    }
    let num = u128::from(display_width) * u128::from(source.height);
    let den = u128::from(source.width);
    let rounded = (2 * num + den) / (2 * den);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}
