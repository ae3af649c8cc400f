//! Positional field layout of each record type.
//!
//! Lines are split on `;` and fields are addressed by index. Any revision of
//! the source format should only need changes here.

/// Field positions of a `B` (sale) line.
#[derive(Debug, Clone, Copy)]
pub struct SaleFields {
  pub district:             usize,
  pub property_id:          usize,
  pub sale_sequence:        usize,
  pub record_timestamp:     usize,
  pub unit_number:          usize,
  /// Always empty in the source; never read.
  pub reserved:             usize,
  pub house_number:         usize,
  pub street_name:          usize,
  pub suburb:               usize,
  pub postcode:             usize,
  pub area:                 usize,
  pub area_unit:            usize,
  pub contract_date:        usize,
  pub settlement_date:      usize,
  pub purchase_price:       usize,
  pub zone_code:            usize,
  pub zone_category:        usize,
  pub property_type:        usize,
  pub property_description: usize,
  pub nature_of_property:   usize,
  pub strata_lot_number:    usize,
  pub component_code:       usize,
  pub sale_code:            usize,
  pub dealing_number:       usize,
}

pub const SALE: SaleFields = SaleFields {
  district:             1,
  property_id:          2,
  sale_sequence:        3,
  record_timestamp:     4,
  unit_number:          5,
  reserved:             6,
  house_number:         7,
  street_name:          8,
  suburb:               9,
  postcode:             10,
  area:                 11,
  area_unit:            12,
  contract_date:        13,
  settlement_date:      14,
  purchase_price:       15,
  zone_code:            16,
  zone_category:        17,
  property_type:        18,
  property_description: 19,
  nature_of_property:   20,
  strata_lot_number:    21,
  component_code:       22,
  sale_code:            23,
  dealing_number:       24,
};

/// Field positions of an `A` (header) line.
#[derive(Debug, Clone, Copy)]
pub struct HeaderFields {
  pub data_type:     usize,
  pub district:      usize,
  pub timestamp:     usize,
  pub source_system: usize,
}

pub const HEADER: HeaderFields = HeaderFields {
  data_type:     1,
  district:      2,
  timestamp:     3,
  source_system: 4,
};

/// `C` line: the raw legal description.
pub const LEGAL_DESCRIPTION: usize = 5;

/// `D` line: the interest type tag.
pub const INTEREST_TYPE: usize = 5;

/// `D` line: first field of the free-text detail; everything after is
/// rejoined.
pub const INTEREST_DETAIL_START: usize = 6;
