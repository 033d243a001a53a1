//! Logbook durations.
//!
//! Flight times in the source sheet are written as `H:MM`. They are parsed into
//! [`Duration`], summed exactly at one-second granularity and rounded to the
//! nearest minute only when rendered back to text.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

const SECS_PER_MINUTE: u64 = 60;
const SECS_PER_HOUR: u64 = 3_600;

/// Reasons a duration token can be rejected by [`Duration::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseDurationError {
    /// The token has no `:` separator, or more than one.
    #[error("expected H:MM, got '{0}'")]
    Shape(String),

    /// The hours part is not an unsigned integer.
    #[error("invalid hours in '{0}'")]
    Hours(String),

    /// The minutes part is not an unsigned decimal number.
    #[error("invalid minutes in '{0}'")]
    Minutes(String),
}

/// A non-negative time span with one-second resolution.
///
/// Addition saturates at `u64::MAX` seconds.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Duration {
    secs: u64,
}

impl Duration {
    /// The empty duration.
    pub const ZERO: Self = Self { secs: 0 };

    /// Build a duration from whole seconds.
    #[must_use]
    pub const fn from_secs(secs: u64) -> Self {
        Self { secs }
    }

    /// Build a duration from hours and minutes.
    #[must_use]
    pub const fn from_hm(hours: u64, minutes: u64) -> Self {
        Self {
            secs: hours * SECS_PER_HOUR + minutes * SECS_PER_MINUTE,
        }
    }

    /// Underlying seconds.
    #[must_use]
    pub const fn as_secs(self) -> u64 {
        self.secs
    }

    /// Whole minutes after rounding half up to the nearest minute.
    #[must_use]
    pub const fn rounded_minutes(self) -> u64 {
        self.secs.saturating_add(SECS_PER_MINUTE / 2) / SECS_PER_MINUTE
    }

    /// True when the duration rounds to `0:00`.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.rounded_minutes() == 0
    }

    /// Parse an `H:MM` token.
    ///
    /// Blank input is `0:0`. Minutes may carry a decimal fraction and may exceed
    /// 59 (`1:75` is `2:15`).
    ///
    /// # Errors
    ///
    /// Returns a [`ParseDurationError`] when the token is not of the form `H:MM`.
    pub fn parse(text: &str) -> Result<Self, ParseDurationError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Self::ZERO);
        }

        let mut parts = text.split(':');
        let (Some(hours), Some(minutes), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(ParseDurationError::Shape(text.to_string()));
        };

        let hours: u64 = if hours.is_empty() {
            0
        } else if hours.bytes().all(|b| b.is_ascii_digit()) {
            hours
                .parse()
                .map_err(|_| ParseDurationError::Hours(text.to_string()))?
        } else {
            return Err(ParseDurationError::Hours(text.to_string()));
        };

        let minutes = parse_minutes(minutes)
            .ok_or_else(|| ParseDurationError::Minutes(text.to_string()))?;

        hours
            .checked_mul(SECS_PER_HOUR)
            .and_then(|secs| secs.checked_add(minutes))
            .map(Self::from_secs)
            .ok_or_else(|| ParseDurationError::Hours(text.to_string()))
    }

    /// Parse an `H:MM` token, falling back to zero when it is malformed.
    ///
    /// The rejected token is logged at `warn` level.
    #[must_use]
    pub fn parse_lenient(text: &str) -> Self {
        Self::parse(text).unwrap_or_else(|err| {
            warn!(token = %text, error = %err, "unparseable duration, using 0:00");
            Self::ZERO
        })
    }

    /// Text for a logbook body cell: empty when zero.
    #[must_use]
    pub fn render_for_body(self) -> String {
        if self.is_zero() {
            String::new()
        } else {
            self.to_string()
        }
    }

    /// Text for a totals cell: always a value, `0:00` when zero.
    #[must_use]
    pub fn render_for_totals(self) -> String {
        self.to_string()
    }
}

/// Minutes as seconds. Accepts `MM` or `MM.f`.
fn parse_minutes(minutes: &str) -> Option<u64> {
    let (whole, frac) = match minutes.split_once('.') {
        Some((whole, frac)) => (whole, Some(frac)),
        None => (minutes, None),
    };
    if whole.is_empty() && frac.map_or(true, str::is_empty) {
        return None;
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let whole: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().ok()?
    };

    let frac_secs = match frac {
        None | Some("") => 0,
        Some(frac) if frac.bytes().all(|b| b.is_ascii_digit()) => {
            // Keep three digits, enough for one-second resolution.
            let digits: String = frac.chars().chain("000".chars()).take(3).collect();
            let millis: u64 = digits.parse().ok()?;
            (millis * SECS_PER_MINUTE + 500) / 1_000
        }
        Some(_) => return None,
    };

    whole.checked_mul(SECS_PER_MINUTE)?.checked_add(frac_secs)
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let minutes = self.rounded_minutes();
        write!(f, "{}:{:02}", minutes / 60, minutes % 60)
    }
}

impl Add for Duration {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            secs: self.secs.saturating_add(rhs.secs),
        }
    }
}

impl AddAssign for Duration {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for Duration {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}
