//! Flat JSON rows for downstream analysis.

use std::io::Write;

use serde::Serialize;
use vgsales_core::{import::FileType, sale::InterestType, store::StoredSale};

/// One exported sale. Children are collapsed into lists of strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportedSale {
  pub id:                 i64,
  pub district_code:      String,
  pub property_id:        String,
  pub sale_sequence:      u32,
  pub address:            Option<String>,
  pub suburb:             Option<String>,
  pub postcode:           Option<String>,
  pub contract_date:      Option<String>,
  pub settlement_date:    Option<String>,
  pub purchase_price:     Option<i64>,
  pub area_sqm:           Option<f64>,
  pub zone_code:          Option<String>,
  pub nature_of_property: Option<String>,
  pub property_type:      Option<String>,
  pub legal_descriptions: Vec<String>,
  pub purchasers:         usize,
  pub vendors:            usize,
  pub file_type:          FileType,
  pub source_file:        String,
}

impl From<StoredSale> for ExportedSale {
  fn from(sale: StoredSale) -> Self {
    let r = sale.record;
    let address = r.street_address();
    let area_sqm = r.area_sqm();
    let purchasers = r
      .interests
      .iter()
      .filter(|i| i.interest_type == InterestType::Purchaser)
      .count();
    let vendors = r
      .interests
      .iter()
      .filter(|i| i.interest_type == InterestType::Vendor)
      .count();

    Self {
      id: sale.id,
      district_code: r.district_code,
      property_id: r.property_id,
      sale_sequence: r.sale_sequence,
      address,
      suburb: r.suburb,
      postcode: r.postcode,
      contract_date: r.contract_date,
      settlement_date: r.settlement_date,
      purchase_price: r.purchase_price,
      area_sqm,
      zone_code: r.zone_code,
      nature_of_property: r.nature_of_property,
      property_type: r.property_type,
      legal_descriptions: r.legal_descriptions.into_iter().map(|l| l.raw).collect(),
      purchasers,
      vendors,
      file_type: sale.file_type,
      source_file: r.source_file,
    }
  }
}

/// Write `sales` as a pretty-printed JSON array.
pub fn write_json<W: Write>(
  writer: W,
  sales: impl IntoIterator<Item = StoredSale>,
) -> serde_json::Result<()> {
  let rows: Vec<ExportedSale> = sales.into_iter().map(ExportedSale::from).collect();
  serde_json::to_writer_pretty(writer, &rows)
}

#[cfg(test)]
mod tests {
  use vgsales_core::sale::{InterestRecord, LegalDescription, PlanType, SaleRecord};

  use super::*;

  #[test]
  fn children_are_flattened() {
    let stored = StoredSale {
      id:        7,
      file_type: FileType::Weekly,
      record:    SaleRecord {
        district_code: "214".into(),
        property_id: "2876965".into(),
        sale_sequence: 1,
        house_number: Some("84".into()),
        street_name: Some("MERRIVILLE RD".into()),
        area: Some(1.5),
        area_unit: Some("H".into()),
        legal_descriptions: vec![LegalDescription {
          raw:         "13/1032686".into(),
          lot_number:  Some("13".into()),
          plan_number: Some("1032686".into()),
          plan_type:   Some(PlanType::Deposited),
        }],
        interests: vec![
          InterestRecord { interest_type: InterestType::Purchaser, detail: None },
          InterestRecord { interest_type: InterestType::Purchaser, detail: None },
          InterestRecord { interest_type: InterestType::Vendor, detail: None },
        ],
        ..Default::default()
      },
    };

    let row = ExportedSale::from(stored);
    assert_eq!(row.address.as_deref(), Some("84 MERRIVILLE RD"));
    assert_eq!(row.area_sqm, Some(15_000.0));
    assert_eq!(row.legal_descriptions, ["13/1032686"]);
    assert_eq!((row.purchasers, row.vendors), (2, 1));

    let mut out = Vec::new();
    write_json(&mut out, Vec::new()).unwrap();
    assert_eq!(out, b"[]");
  }
}
