//! Cutoff marker
//!
//! The cutoff splits the source collection into a historical set (created
//! strictly before it) and an incremental set (created strictly after it).
//! It is read once per run and threaded through the coordinator explicitly.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Point in time partitioning historical and incremental loads
///
/// The exact instant is kept. Stored timestamps only resolve to the
/// millisecond, so a cutoff with sub-millisecond digits is compared through
/// [`Cutoff::upper_bound`] and [`Cutoff::lower_bound`]: every stored instant
/// below it is still older than the upper bound and every stored instant
/// above it is still newer than the lower bound.
///
/// # Examples
///
/// ```
/// use payorders_etl::domain::cutoff::Cutoff;
/// use std::str::FromStr;
///
/// let cutoff = Cutoff::from_str("2024-06-01T00:00:00Z").unwrap();
/// assert_eq!(cutoff.to_string(), "2024-06-01T00:00:00.000Z");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cutoff(DateTime<Utc>);

impl Cutoff {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self(at)
    }

    /// Returns the cutoff instant
    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// Returns the cutoff as a BSON datetime, rounded down to the millisecond
    pub fn to_bson(&self) -> bson::DateTime {
        self.lower_bound()
    }

    /// Largest BSON datetime not after the cutoff
    pub fn lower_bound(&self) -> bson::DateTime {
        bson::DateTime::from_millis(self.0.timestamp_millis())
    }

    /// Smallest BSON datetime not before the cutoff
    pub fn upper_bound(&self) -> bson::DateTime {
        let millis = self.0.timestamp_millis();
        if self.has_sub_millis() {
            bson::DateTime::from_millis(millis + 1)
        } else {
            bson::DateTime::from_millis(millis)
        }
    }

    fn has_sub_millis(&self) -> bool {
        self.0.timestamp_subsec_nanos() % 1_000_000 != 0
    }
}

impl fmt::Display for Cutoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let format = if self.has_sub_millis() {
            SecondsFormat::AutoSi
        } else {
            SecondsFormat::Millis
        };
        f.write_str(&self.0.to_rfc3339_opts(format, true))
    }
}

impl FromStr for Cutoff {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = DateTime::parse_from_rfc3339(s.trim()).map_err(|e| {
            format!("Invalid cutoff '{s}': expected an RFC 3339 timestamp such as 2024-06-01T00:00:00Z ({e})")
        })?;
        Ok(Self::new(parsed.with_timezone(&Utc)))
    }
}

impl TryFrom<String> for Cutoff {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Cutoff> for String {
    fn from(cutoff: Cutoff) -> Self {
        cutoff.to_string()
    }
}

impl From<DateTime<Utc>> for Cutoff {
    fn from(at: DateTime<Utc>) -> Self {
        Self::new(at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_utc() {
        let cutoff = Cutoff::from_str("2024-06-01T00:00:00Z").unwrap();
        assert_eq!(
            cutoff.as_datetime(),
            Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_with_offset_normalizes_to_utc() {
        let cutoff = Cutoff::from_str("2024-06-01T02:00:00+02:00").unwrap();
        assert_eq!(cutoff.to_string(), "2024-06-01T00:00:00.000Z");
    }

    #[test]
    fn test_keeps_sub_millisecond_instant() {
        let cutoff = Cutoff::from_str("2024-06-01T00:00:00.123456789Z").unwrap();
        assert_eq!(cutoff.to_string(), "2024-06-01T00:00:00.123456789Z");
        assert_eq!(cutoff.as_datetime().timestamp_subsec_nanos(), 123_456_789);
    }

    #[test]
    fn test_bounds_straddle_sub_millisecond_cutoff() {
        let cutoff = Cutoff::from_str("2024-06-01T00:00:00.0005Z").unwrap();
        let base = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

        assert_eq!(cutoff.lower_bound(), bson::DateTime::from_chrono(base));
        assert_eq!(
            cutoff.upper_bound().timestamp_millis(),
            base.timestamp_millis() + 1
        );
    }

    #[test]
    fn test_bounds_coincide_on_whole_millisecond() {
        let cutoff = Cutoff::from_str("2024-06-01T00:00:00.250Z").unwrap();
        assert_eq!(cutoff.lower_bound(), cutoff.upper_bound());
        assert_eq!(cutoff.to_bson().to_chrono(), cutoff.as_datetime());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(Cutoff::from_str("yesterday").is_err());
        assert!(Cutoff::from_str("2024-06-01").is_err());
    }

    #[test]
    fn test_serde_roundtrip_through_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            cutoff: Cutoff,
        }
        let wrapper: Wrapper = toml::from_str(r#"cutoff = "2023-12-31T23:59:59Z""#).unwrap();
        assert_eq!(wrapper.cutoff.to_string(), "2023-12-31T23:59:59.000Z");
    }
}
