// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! A `UnixNanos` type for working with timestamps in nanoseconds since the UNIX epoch.
//!
//! Timestamps parse from either an integer string (nanoseconds) or an RFC 3339 string, and
//! deserialize from integers or strings in the same two forms. Negative timestamps are invalid.

use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{self, Visitor},
};

/// Represents a duration in nanoseconds.
pub type DurationNanos = u64;

/// Represents a timestamp in nanoseconds since the UNIX epoch.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct UnixNanos(u64);

impl UnixNanos {
    /// Creates a new [`UnixNanos`] instance.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns `true` if the value of this instance is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Returns the underlying value as `u64`.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Converts the underlying value to a datetime (UTC).
    ///
    /// Values beyond `i64::MAX` nanoseconds (around the year 2262) saturate.
    #[must_use]
    pub fn to_datetime_utc(&self) -> DateTime<Utc> {
        let nanos = i64::try_from(self.0).unwrap_or(i64::MAX);
        DateTime::from_timestamp_nanos(nanos)
    }

    /// Converts the underlying value to an ISO 8601 (RFC 3339) string.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.to_datetime_utc().to_rfc3339()
    }

    /// Returns the duration in nanoseconds since `other`, or `None` if `other` is later.
    #[must_use]
    pub const fn duration_since(&self, other: &Self) -> Option<DurationNanos> {
        self.0.checked_sub(other.0)
    }

    fn parse_string(s: &str) -> anyhow::Result<Self> {
        let s = s.trim();

        if let Ok(value) = s.parse::<u64>() {
            return Ok(Self(value));
        }

        if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
            anyhow::bail!("Unix timestamp '{s}' is out of range");
        }

        let datetime = DateTime::parse_from_rfc3339(s)
            .map_err(|e| anyhow::anyhow!("Invalid timestamp '{s}': {e}"))?;
        let nanos = datetime
            .timestamp_nanos_opt()
            .ok_or_else(|| anyhow::anyhow!("Timestamp '{s}' is out of range"))?;

        u64::try_from(nanos)
            .map(Self)
            .map_err(|_| anyhow::anyhow!("Unix timestamp cannot be negative, was '{s}'"))
    }
}

impl From<u64> for UnixNanos {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<UnixNanos> for u64 {
    fn from(value: UnixNanos) -> Self {
        value.0
    }
}

impl FromStr for UnixNanos {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_string(s)
    }
}

impl Display for UnixNanos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for UnixNanos {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct UnixNanosVisitor;

        impl Visitor<'_> for UnixNanosVisitor {
            type Value = UnixNanos;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("an integer, a string integer, or an RFC 3339 timestamp")
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(UnixNanos(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                u64::try_from(value)
                    .map(UnixNanos)
                    .map_err(|_| E::custom("Unix timestamp cannot be negative"))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                UnixNanos::parse_string(value).map_err(E::custom)
            }
        }

        deserializer.deserialize_any(UnixNanosVisitor)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_new() {
        let nanos = UnixNanos::new(123);
        assert_eq!(nanos.as_u64(), 123);
        assert!(!nanos.is_zero());
        assert!(UnixNanos::default().is_zero());
    }

    #[rstest]
    fn test_ordering() {
        assert!(UnixNanos::from(1) < UnixNanos::from(2));
        assert_eq!(UnixNanos::from(5), UnixNanos::new(5));
    }

    #[rstest]
    fn test_duration_since() {
        let earlier = UnixNanos::from(1_000);
        let later = UnixNanos::from(1_500);
        assert_eq!(later.duration_since(&earlier), Some(500));
        assert_eq!(earlier.duration_since(&later), None);
    }

    #[rstest]
    fn test_to_rfc3339() {
        let nanos = UnixNanos::from(1_000_000_000);
        assert_eq!(nanos.to_rfc3339(), "1970-01-01T00:00:01+00:00");
    }

    #[rstest]
    #[case("0", 0)]
    #[case("1700000000000000000", 1_700_000_000_000_000_000)]
    #[case(" 42 ", 42)]
    #[case("1970-01-01T00:00:01Z", 1_000_000_000)]
    #[case("2024-01-01T00:00:00.5+00:00", 1_704_067_200_500_000_000)]
    fn test_from_str_valid(#[case] input: &str, #[case] expected: u64) {
        let nanos: UnixNanos = input.parse().unwrap();
        assert_eq!(nanos.as_u64(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("abc")]
    #[case("99999999999999999999999")]
    #[case("1960-01-01T00:00:00Z")]
    fn test_from_str_invalid(#[case] input: &str) {
        assert!(input.parse::<UnixNanos>().is_err());
    }

    #[rstest]
    fn test_serde_roundtrip() {
        let nanos = UnixNanos::from(1_234);
        let json = serde_json::to_string(&nanos).unwrap();
        assert_eq!(json, "1234");
        let parsed: UnixNanos = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, nanos);
    }

    #[rstest]
    fn test_deserialize_from_rfc3339_string() {
        let parsed: UnixNanos = serde_json::from_str("\"1970-01-01T00:00:02Z\"").unwrap();
        assert_eq!(parsed.as_u64(), 2_000_000_000);
    }

    #[rstest]
    fn test_deserialize_negative_fails() {
        assert!(serde_json::from_str::<UnixNanos>("-1").is_err());
    }
}
