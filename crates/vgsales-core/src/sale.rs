//! Sale records: one property transaction plus the legal descriptions and
//! interest parties that trail it in the source extract.
//!
//! A record is built once from a `B` line and its trailing `C`/`D` lines,
//! persisted once, and never updated. Corrections arrive as new extract files.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Natural key ─────────────────────────────────────────────────────────────

/// The identity used for duplicate suppression.
///
/// Two records with the same key are the same sale, no matter which file they
/// arrived in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NaturalKey {
  pub district_code: String,
  pub property_id:   String,
  pub sale_sequence: u32,
  pub contract_date: Option<String>,
}

// ─── Sale record ─────────────────────────────────────────────────────────────

/// A single property sale decoded from a `B` line.
///
/// Dates are kept as `YYYY-MM-DD` strings exactly as reformatted from the
/// source; no calendar validation is applied.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SaleRecord {
  pub district_code:        String,
  pub property_id:          String,
  /// Disambiguates multiple sales of one property; defaults to 1.
  pub sale_sequence:        u32,
  /// Source-supplied timestamp, verbatim (e.g. `20251215 01:08`).
  pub record_timestamp:     Option<String>,
  pub unit_number:          Option<String>,
  pub house_number:         Option<String>,
  pub street_name:          Option<String>,
  pub suburb:               Option<String>,
  pub postcode:             Option<String>,
  pub area:                 Option<f64>,
  /// `M` (square metres) or `H` (hectares).
  pub area_unit:            Option<String>,
  pub contract_date:        Option<String>,
  pub settlement_date:      Option<String>,
  /// Whole currency units.
  pub purchase_price:       Option<i64>,
  pub zone_code:            Option<String>,
  pub zone_category:        Option<String>,
  pub property_type:        Option<String>,
  pub property_description: Option<String>,
  pub nature_of_property:   Option<String>,
  pub strata_lot_number:    Option<String>,
  pub component_code:       Option<String>,
  pub sale_code:            Option<String>,
  pub dealing_number:       Option<String>,

  // Provenance
  pub source_file:          String,
  /// `YYYYMMDD`, taken from the file name when it carries one.
  pub file_date:            Option<String>,

  pub legal_descriptions:   Vec<LegalDescription>,
  pub interests:            Vec<InterestRecord>,
}

impl SaleRecord {
  pub fn natural_key(&self) -> NaturalKey {
    NaturalKey {
      district_code: self.district_code.clone(),
      property_id:   self.property_id.clone(),
      sale_sequence: self.sale_sequence,
      contract_date: self.contract_date.clone(),
    }
  }

  /// Land area normalised to square metres.
  ///
  /// Returns `None` when either the area or a recognised unit is missing.
  pub fn area_sqm(&self) -> Option<f64> {
    let area = self.area?;
    match self.area_unit.as_deref()?.trim() {
      u if u.eq_ignore_ascii_case("M") => Some(area),
      u if u.eq_ignore_ascii_case("H") => Some(area * 10_000.0),
      _ => None,
    }
  }

  /// Single-line street address, e.g. `3/84 MERRIVILLE RD`.
  pub fn street_address(&self) -> Option<String> {
    let street = self.street_name.as_deref()?;
    let number = match (self.unit_number.as_deref(), self.house_number.as_deref()) {
      (Some(unit), Some(house)) => format!("{unit}/{house} "),
      (None, Some(house)) => format!("{house} "),
      (Some(unit), None) => format!("{unit}/ "),
      (None, None) => String::new(),
    };
    Some(format!("{number}{street}"))
  }
}

// ─── Legal description ───────────────────────────────────────────────────────

/// Kind of survey plan a lot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanType {
  /// Deposited plan (`DP`).
  #[serde(rename = "DP")]
  Deposited,
  /// Strata plan (`SP`).
  #[serde(rename = "SP")]
  Strata,
}

impl PlanType {
  pub fn as_code(self) -> &'static str {
    match self {
      Self::Deposited => "DP",
      Self::Strata => "SP",
    }
  }
}

impl FromStr for PlanType {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "DP" => Ok(Self::Deposited),
      "SP" => Ok(Self::Strata),
      other => Err(Error::UnknownPlanType(other.to_string())),
    }
  }
}

/// A `C` line attached to its sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalDescription {
  /// The description exactly as it appeared in the source.
  pub raw:         String,
  pub lot_number:  Option<String>,
  pub plan_number: Option<String>,
  pub plan_type:   Option<PlanType>,
}

// ─── Interest ────────────────────────────────────────────────────────────────

/// Role of the party named by a `D` line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum InterestType {
  Purchaser,
  Vendor,
  /// Any other tag, preserved verbatim.
  Other(String),
}

impl InterestType {
  pub fn from_code(code: &str) -> Self {
    match code {
      "P" => Self::Purchaser,
      "V" => Self::Vendor,
      other => Self::Other(other.to_string()),
    }
  }

  pub fn as_code(&self) -> &str {
    match self {
      Self::Purchaser => "P",
      Self::Vendor => "V",
      Self::Other(code) => code,
    }
  }
}

impl From<String> for InterestType {
  fn from(s: String) -> Self { Self::from_code(&s) }
}

impl From<InterestType> for String {
  fn from(t: InterestType) -> Self { t.as_code().to_string() }
}

impl fmt::Display for InterestType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_code())
  }
}

/// A `D` line attached to its sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestRecord {
  pub interest_type: InterestType,
  /// Remaining fields of the line, rejoined with `;` and trimmed.
  pub detail:        Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sale() -> SaleRecord {
    SaleRecord {
      district_code: "214".into(),
      property_id: "2876965".into(),
      sale_sequence: 1,
      house_number: Some("84".into()),
      street_name: Some("MERRIVILLE RD".into()),
      ..Default::default()
    }
  }

  #[test]
  fn area_in_hectares_is_converted() {
    let mut s = sale();
    s.area = Some(1.5);
    s.area_unit = Some("H".into());
    assert_eq!(s.area_sqm(), Some(15_000.0));

    s.area_unit = Some("M".into());
    assert_eq!(s.area_sqm(), Some(1.5));

    s.area_unit = Some("X".into());
    assert_eq!(s.area_sqm(), None);
  }

  #[test]
  fn street_address_includes_unit() {
    let mut s = sale();
    assert_eq!(s.street_address().as_deref(), Some("84 MERRIVILLE RD"));
    s.unit_number = Some("3".into());
    assert_eq!(s.street_address().as_deref(), Some("3/84 MERRIVILLE RD"));
  }

  #[test]
  fn natural_key_ignores_provenance() {
    let a = sale();
    let mut b = sale();
    b.source_file = "other.DAT".into();
    b.purchase_price = Some(1);
    assert_eq!(a.natural_key(), b.natural_key());
  }

  #[test]
  fn interest_type_codes() {
    assert_eq!(InterestType::from_code("P"), InterestType::Purchaser);
    assert_eq!(InterestType::from_code("V"), InterestType::Vendor);
    assert_eq!(InterestType::from_code("X").as_code(), "X");
  }
}
