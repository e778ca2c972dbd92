//! Canonical publication key

use chrono::NaiveDateTime;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

const MANUAL_PREFIX: &str = "MAN_";

/// A publication identifier: an externally issued PubMed id or a synthetic
/// `MAN_<timestamp>` id for manual entries.
///
/// The value is canonicalized on construction so that the same logical key read as
/// a number, a string, or a float artifact (`"12345.0"`) always compares equal.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Pmid(String);

impl Pmid {
    pub fn new(raw: &str) -> Self {
        Self(canonicalize(raw))
    }

    /// Synthetic id for a manually entered publication.
    pub fn manual(at: NaiveDateTime) -> Self {
        Self(format!("{}{}", MANUAL_PREFIX, at.format("%Y%m%d%H%M%S")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_manual(&self) -> bool {
        self.0.starts_with(MANUAL_PREFIX)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn canonicalize(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Some((int, frac)) = trimmed.split_once('.') {
        let digits = !int.is_empty() && int.bytes().all(|b| b.is_ascii_digit());
        let zero_fraction = !frac.is_empty() && frac.bytes().all(|b| b == b'0');
        if digits && zero_fraction {
            return int.to_string();
        }
    }
    trimmed.to_string()
}

impl fmt::Display for Pmid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Pmid {
    fn from(s: &str) -> Self {
        Pmid::new(s)
    }
}

impl From<String> for Pmid {
    fn from(s: String) -> Self {
        Pmid::new(&s)
    }
}

impl From<u64> for Pmid {
    fn from(n: u64) -> Self {
        Pmid(n.to_string())
    }
}

impl<'de> Deserialize<'de> for Pmid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PmidVisitor;

        impl<'de> Visitor<'de> for PmidVisitor {
            type Value = Pmid;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a publication identifier as a string or an integer")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Pmid, E> {
                Ok(Pmid::new(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Pmid, E> {
                Ok(Pmid::from(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Pmid, E> {
                u64::try_from(v)
                    .map(Pmid::from)
                    .map_err(|_| E::custom(format!("negative identifier {}", v)))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Pmid, E> {
                if v >= 0.0 && v.fract() == 0.0 && v < u64::MAX as f64 {
                    Ok(Pmid::from(v as u64))
                } else {
                    Err(E::custom(format!("non-integral identifier {}", v)))
                }
            }
        }

        deserializer.deserialize_any(PmidVisitor)
    }
}
