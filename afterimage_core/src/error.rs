// Copyright 2026 the Afterimage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.
//!
//! [`CaptureError`] is the only failure a user ever sees: the capture source
//! could not be acquired. [`MirrorError`] reports misuse of the
//! [`DelayMirror`](crate::mirror::DelayMirror) state machine, and
//! [`ParseDelayError`] rejects malformed delay selections.

use alloc::format;
use alloc::string::String;
use core::fmt;

/// Broad category of a capture failure, derived from the host error name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CaptureErrorKind {
    /// The user or a permissions policy denied camera access.
    NotAllowed,
    /// No video input device matched the request.
    NotFound,
    /// A device exists but could not be opened (e.g. in use elsewhere).
    NotReadable,
    /// No device satisfies the requested constraints.
    Overconstrained,
    /// Media capture is disabled for this document.
    Security,
    /// Acquisition was aborted by the host.
    Abort,
    /// The request itself was malformed.
    Type,
    /// The host offers no media capture API at all.
    Unsupported,
    /// Any other error name.
    Other,
}

impl CaptureErrorKind {
    /// Classifies a host error name such as `"NotAllowedError"`.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            // `PermissionDeniedError` is the pre-standard spelling.
            "NotAllowedError" | "PermissionDeniedError" => Self::NotAllowed,
            "NotFoundError" | "DevicesNotFoundError" => Self::NotFound,
            "NotReadableError" | "TrackStartError" => Self::NotReadable,
            "OverconstrainedError" | "ConstraintNotSatisfiedError" => Self::Overconstrained,
            "SecurityError" => Self::Security,
            "AbortError" => Self::Abort,
            "TypeError" => Self::Type,
            "NotSupportedError" => Self::Unsupported,
            _ => Self::Other,
        }
    }
}

/// The capture source could not be acquired.
///
/// Carries the host error's name verbatim so it can be shown to the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaptureError {
    kind: CaptureErrorKind,
    name: String,
}

impl CaptureError {
    /// Name used when the host provides no media capture API.
    pub const UNSUPPORTED_NAME: &'static str = "NotSupportedError";

    /// Name used when the host error carries no name.
    pub const UNKNOWN_NAME: &'static str = "UnknownError";

    /// Creates an error from a host error name.
    #[must_use]
    pub fn from_name(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            kind: CaptureErrorKind::from_name(&name),
            name,
        }
    }

    /// Error for a host without any media capture API.
    #[must_use]
    pub fn unsupported() -> Self {
        Self::from_name(Self::UNSUPPORTED_NAME)
    }

    /// Classified category.
    #[must_use]
    pub const fn kind(&self) -> CaptureErrorKind {
        self.kind
    }

    /// Host error name, verbatim.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Text for the blocking notification shown to the user.
    #[must_use]
    pub fn notification_message(&self) -> String {
        format!(
            "Camera access was denied, or something else went wrong.\nError: {}",
            self.name
        )
    }
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "video capture failed: {}", self.name)
    }
}

impl core::error::Error for CaptureError {}

/// Misuse of the [`DelayMirror`](crate::mirror::DelayMirror) state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MirrorError {
    /// `start_record` requires the Idle state.
    NotIdle,
    /// `start_render` requires the Recording state.
    NotRecording,
    /// `start_render` was already called for this session.
    RenderScheduled,
    /// The capture source reported no usable native resolution.
    NoVideoSize,
    /// No capture source has been attached.
    NoSource,
    /// The configured sample period is zero.
    ZeroSamplePeriod,
}

impl fmt::Display for MirrorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotIdle => f.write_str("recording requires an idle mirror; clear it first"),
            Self::NotRecording => f.write_str("playback can only be scheduled while recording"),
            Self::RenderScheduled => f.write_str("playback is already scheduled"),
            Self::NoVideoSize => f.write_str("capture source has no video resolution"),
            Self::NoSource => f.write_str("no capture source attached"),
            Self::ZeroSamplePeriod => f.write_str("sample period must be non-zero"),
        }
    }
}

impl core::error::Error for MirrorError {}

/// A delay selection that is not a base-10 non-negative integer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseDelayError {
    raw: String,
}

impl ParseDelayError {
    pub(crate) fn new(raw: &str) -> Self {
        Self { raw: raw.into() }
    }

    /// The rejected input.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for ParseDelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid delay {:?}: expected whole milliseconds", self.raw)
    }
}

impl core::error::Error for ParseDelayError {}
