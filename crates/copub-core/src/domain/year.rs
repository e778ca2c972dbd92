//! Publication year with an explicit unknown sentinel

use super::NOT_AVAILABLE;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Publication year.
///
/// Parse rule: after trimming, if the first four characters are ASCII digits they are
/// the year (`"2021"`, `"2019 Jan-Feb"`, `"2019.0"`); anything else is `Unknown`.
///
/// `Unknown` orders before every known year, so it is treated as the earliest year in
/// every sort and lands last in a descending listing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Year {
    #[default]
    Unknown,
    Known(i32),
}

impl Year {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.get(..4) {
            Some(prefix) if prefix.bytes().all(|b| b.is_ascii_digit()) => {
                prefix.parse().map(Year::Known).unwrap_or(Year::Unknown)
            }
            _ => Year::Unknown,
        }
    }
}

impl From<Option<i32>> for Year {
    fn from(year: Option<i32>) -> Self {
        year.map(Year::Known).unwrap_or(Year::Unknown)
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Year::Known(y) => write!(f, "{}", y),
            Year::Unknown => f.write_str(NOT_AVAILABLE),
        }
    }
}

impl Serialize for Year {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Year {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct YearVisitor;

        impl<'de> Visitor<'de> for YearVisitor {
            type Value = Year;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a year as a string or a number")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Year, E> {
                Ok(Year::parse(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Year, E> {
                Ok(Year::parse(&v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Year, E> {
                Ok(Year::parse(&v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Year, E> {
                Ok(Year::parse(&v.to_string()))
            }

            fn visit_unit<E: de::Error>(self) -> Result<Year, E> {
                Ok(Year::Unknown)
            }

            fn visit_none<E: de::Error>(self) -> Result<Year, E> {
                Ok(Year::Unknown)
            }
        }

        deserializer.deserialize_any(YearVisitor)
    }
}
