//! The OT-TE case token: `OT-<year>-<zero-padded-number>`.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// A case's natural key, e.g. `OT-2024-007`. Unique per table category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OtTe {
  pub year:   u16,
  pub numero: u32,
}

impl OtTe {
  pub fn new(year: u16, numero: u32) -> Self {
    OtTe { year, numero }
  }
}

impl fmt::Display for OtTe {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "OT-{}-{:03}", self.year, self.numero)
  }
}

impl FromStr for OtTe {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let malformed = || Error::InvalidOtTe(s.to_string());

    let rest = s.strip_prefix("OT-").ok_or_else(malformed)?;
    let (year_str, numero_str) = rest.split_once('-').ok_or_else(malformed)?;

    if year_str.len() != 4 || numero_str.is_empty() {
      return Err(malformed());
    }

    let year: u16 = year_str.parse().map_err(|_| malformed())?;
    let numero: u32 = numero_str.parse().map_err(|_| malformed())?;

    Ok(OtTe { year, numero })
  }
}

impl Serialize for OtTe {
  fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(self)
  }
}

impl<'de> Deserialize<'de> for OtTe {
  fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
    let s = String::deserialize(d)?;
    s.parse().map_err(serde::de::Error::custom)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn formats_with_zero_padding() {
    assert_eq!(OtTe::new(2024, 7).to_string(), "OT-2024-007");
    assert_eq!(OtTe::new(2024, 123).to_string(), "OT-2024-123");
    // Numbers beyond three digits are not truncated.
    assert_eq!(OtTe::new(2024, 1234).to_string(), "OT-2024-1234");
  }

  #[test]
  fn parses_round_trip() {
    let ot: OtTe = "OT-2024-007".parse().unwrap();
    assert_eq!(ot, OtTe::new(2024, 7));
    assert_eq!(ot.to_string(), "OT-2024-007");
  }

  #[test]
  fn rejects_malformed_tokens() {
    for bad in ["", "OT-2024", "TE-2024-007", "OT-24-007", "OT-2024-", "OT-2024-abc"] {
      assert!(bad.parse::<OtTe>().is_err(), "accepted {bad:?}");
    }
  }

  #[test]
  fn serde_as_string() {
    let ot = OtTe::new(2025, 42);
    let json = serde_json::to_string(&ot).unwrap();
    assert_eq!(json, "\"OT-2025-042\"");
    let back: OtTe = serde_json::from_str(&json).unwrap();
    assert_eq!(back, ot);
  }
}
