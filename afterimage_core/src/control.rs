// Copyright 2026 the Afterimage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Delay selection parsing.
//!
//! Delay buttons carry their delay in a `value` attribute as a base-10 count
//! of milliseconds. The control surface keeps no state: a click is parsed
//! here and handed straight to the application callback.

use crate::error::ParseDelayError;
use crate::time::Duration;

/// Parses a delay selection in whole milliseconds.
///
/// Surrounding whitespace is ignored. Negative, fractional and non-numeric
/// values are rejected.
///
/// # Errors
///
/// Returns [`ParseDelayError`] carrying the raw input when it is not a
/// non-negative base-10 integer.
pub fn parse_delay(raw: &str) -> Result<Duration, ParseDelayError> {
    raw.trim()
        .parse::<u32>()
        .map(|ms| Duration::from_millis(u64::from(ms)))
        .map_err(|_| ParseDelayError::new(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whole_milliseconds() {
        assert_eq!(parse_delay("3000"), Ok(Duration::from_millis(3_000)));
        assert_eq!(parse_delay("0"), Ok(Duration::ZERO));
        assert_eq!(parse_delay(" 250\n"), Ok(Duration::from_millis(250)));
    }

    #[test]
    fn leading_zeros_are_decimal() {
        assert_eq!(parse_delay("0100"), Ok(Duration::from_millis(100)), "not octal");
    }

    #[test]
    fn rejects_non_integers() {
        for raw in ["", "abc", "-100", "1.5", "3s", "0x10"] {
            let err = parse_delay(raw).expect_err(raw);
            assert_eq!(err.raw(), raw);
        }
    }
}
