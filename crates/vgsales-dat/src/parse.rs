//! Sales extract line parser.
//!
//! Pipeline:
//!   raw &str
//!     └─ non-empty lines        → (line number, &str)
//!          └─ split on `;`      → Fields
//!               └─ dispatch on tag (A / B / C / D)
//!                    └─ RecordState transitions → Vec<SaleRecord>
//!
//! The format has no end-of-record marker: a `B` line closes the previous
//! sale, and end of input closes the last one.

use vgsales_core::sale::{
  InterestRecord, InterestType, LegalDescription, PlanType, SaleRecord,
};

use crate::{
  Header, LineError, ParsedFile, PREVIEW_CHARS,
  filename::file_meta,
  layout::{HEADER, INTEREST_DETAIL_START, INTEREST_TYPE, LEGAL_DESCRIPTION, SALE},
};

// ─── Field access ────────────────────────────────────────────────────────────

struct Fields<'a>(Vec<&'a str>);

impl<'a> Fields<'a> {
  fn split(line: &'a str) -> Self { Self(line.split(';').collect()) }

  fn tag(&self) -> &'a str { self.0.first().copied().map_or("", str::trim) }

  /// Trimmed field, `None` when absent or blank.
  fn text(&self, index: usize) -> Option<String> {
    self
      .0
      .get(index)
      .map(|f| f.trim())
      .filter(|f| !f.is_empty())
      .map(str::to_string)
  }

  fn raw(&self, index: usize) -> &'a str { self.0.get(index).copied().unwrap_or("") }

  /// All fields from `start` onward, rejoined with `;`.
  fn rest(&self, start: usize) -> String {
    self.0.get(start..).map(|s| s.join(";")).unwrap_or_default()
  }
}

// ─── Coercions ───────────────────────────────────────────────────────────────

/// Strip thousands separators and whitespace.
fn strip_number(s: &str) -> String {
  s.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect()
}

pub(crate) fn parse_price(s: &str) -> Option<i64> { strip_number(s).parse().ok() }

pub(crate) fn parse_area(s: &str) -> Option<f64> {
  strip_number(s).parse::<f64>().ok().filter(|a| a.is_finite())
}

/// `YYYYMMDD` → `YYYY-MM-DD`. Anything other than eight digits is `None`.
pub(crate) fn format_date(s: &str) -> Option<String> {
  let s = s.trim();
  if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
    return None;
  }
  Some(format!("{}-{}-{}", &s[..4], &s[4..6], &s[6..]))
}

/// Missing or non-numeric sequences default to 1.
fn parse_sequence(s: &str) -> u32 { s.trim().parse().unwrap_or(1) }

fn preview(line: &str) -> String {
  let mut chars = line.chars();
  let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
  if chars.next().is_some() { format!("{head}…") } else { head }
}

// ─── Legal description ───────────────────────────────────────────────────────

fn all_digits(s: &str) -> bool { !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) }

/// Decode a `C` line's legal description.
///
/// Recognised shapes:
/// - `13/1032686` → lot 13, deposited plan 1032686
/// - `SP12345` (any case, not inside a word) → strata plan 12345; a
///   leading `5/` supplies the lot number
///
/// Anything else keeps only the raw string.
pub fn parse_legal_description(raw: &str) -> LegalDescription {
  let trimmed = raw.trim();
  let mut legal = LegalDescription {
    raw:         trimmed.to_string(),
    lot_number:  None,
    plan_number: None,
    plan_type:   None,
  };

  if let Some((lot, plan)) = trimmed.split_once('/')
    && all_digits(lot)
    && all_digits(plan)
  {
    legal.lot_number = Some(lot.to_string());
    legal.plan_number = Some(plan.to_string());
    legal.plan_type = Some(PlanType::Deposited);
    return legal;
  }

  if let Some((start, plan)) = find_strata_plan(trimmed) {
    legal.plan_number = Some(plan.to_string());
    legal.plan_type = Some(PlanType::Strata);
    legal.lot_number = trimmed[..start]
      .strip_suffix('/')
      .filter(|lot| all_digits(lot))
      .map(str::to_string);
  }

  legal
}

/// Position of the first `SP<digits>` that does not continue a word, and the
/// digits themselves.
fn find_strata_plan(s: &str) -> Option<(usize, &str)> {
  let bytes = s.as_bytes();
  (0..bytes.len().saturating_sub(2)).find_map(|i| {
    if !bytes[i].eq_ignore_ascii_case(&b'S') || !bytes[i + 1].eq_ignore_ascii_case(&b'P') {
      return None;
    }
    if i > 0 && bytes[i - 1].is_ascii_alphabetic() {
      return None;
    }
    let digits_start = i + 2;
    let len = bytes[digits_start..]
      .iter()
      .take_while(|b| b.is_ascii_digit())
      .count();
    (len > 0).then(|| (i, &s[digits_start..digits_start + len]))
  })
}

// ─── Record-boundary state machine ───────────────────────────────────────────

/// Whether a sale is currently being assembled.
#[derive(Debug, Default)]
pub(crate) enum RecordState {
  #[default]
  NoCurrentRecord,
  BuildingRecord(SaleRecord),
}

impl RecordState {
  /// Begin assembling `next`, yielding the record it replaces.
  pub(crate) fn start(&mut self, next: SaleRecord) -> Option<SaleRecord> {
    match std::mem::replace(self, Self::BuildingRecord(next)) {
      Self::BuildingRecord(done) => Some(done),
      Self::NoCurrentRecord => None,
    }
  }

  /// Close the current record, if any.
  pub(crate) fn close(&mut self) -> Option<SaleRecord> {
    match std::mem::take(self) {
      Self::BuildingRecord(done) => Some(done),
      Self::NoCurrentRecord => None,
    }
  }

  pub(crate) fn current_mut(&mut self) -> Option<&mut SaleRecord> {
    match self {
      Self::BuildingRecord(record) => Some(record),
      Self::NoCurrentRecord => None,
    }
  }
}

// ─── Line handlers ───────────────────────────────────────────────────────────

fn parse_header(fields: &Fields<'_>) -> Result<Header, String> {
  let data_type = fields
    .text(HEADER.data_type)
    .ok_or_else(|| "header record has no data type".to_string())?;
  Ok(Header {
    data_type,
    district_code: fields.text(HEADER.district),
    timestamp:     fields.text(HEADER.timestamp),
    source_system: fields.text(HEADER.source_system),
  })
}

fn parse_sale(
  fields: &Fields<'_>,
  source_file: &str,
  file_date: Option<&str>,
) -> Result<SaleRecord, String> {
  let f = SALE;
  let district_code = fields
    .text(f.district)
    .ok_or_else(|| "sale record has no district code".to_string())?;
  let property_id = fields
    .text(f.property_id)
    .ok_or_else(|| "sale record has no property id".to_string())?;

  Ok(SaleRecord {
    district_code,
    property_id,
    sale_sequence:        parse_sequence(fields.raw(f.sale_sequence)),
    record_timestamp:     fields.text(f.record_timestamp),
    unit_number:          fields.text(f.unit_number),
    house_number:         fields.text(f.house_number),
    street_name:          fields.text(f.street_name),
    suburb:               fields.text(f.suburb),
    postcode:             fields.text(f.postcode),
    area:                 parse_area(fields.raw(f.area)),
    area_unit:            fields.text(f.area_unit),
    contract_date:        format_date(fields.raw(f.contract_date)),
    settlement_date:      format_date(fields.raw(f.settlement_date)),
    purchase_price:       parse_price(fields.raw(f.purchase_price)),
    zone_code:            fields.text(f.zone_code),
    zone_category:        fields.text(f.zone_category),
    property_type:        fields.text(f.property_type),
    property_description: fields.text(f.property_description),
    nature_of_property:   fields.text(f.nature_of_property),
    strata_lot_number:    fields.text(f.strata_lot_number),
    component_code:       fields.text(f.component_code),
    sale_code:            fields.text(f.sale_code),
    dealing_number:       fields.text(f.dealing_number),
    source_file:          source_file.to_string(),
    file_date:            file_date.map(str::to_string),
    legal_descriptions:   Vec::new(),
    interests:            Vec::new(),
  })
}

fn parse_interest(fields: &Fields<'_>) -> Result<InterestRecord, String> {
  let tag = fields
    .text(INTEREST_TYPE)
    .ok_or_else(|| "interest record has no interest type".to_string())?;
  let detail = fields.rest(INTEREST_DETAIL_START).trim().to_string();
  Ok(InterestRecord {
    interest_type: InterestType::from_code(&tag),
    detail:        (!detail.is_empty()).then_some(detail),
  })
}

// ─── File parser ─────────────────────────────────────────────────────────────

struct Parser<'a> {
  filename:  &'a str,
  file_date: Option<String>,
  header:    Option<Header>,
  state:     RecordState,
  sales:     Vec<SaleRecord>,
}

impl Parser<'_> {
  fn handle_line(&mut self, line: &str) -> Result<(), String> {
    let fields = Fields::split(line);
    match fields.tag() {
      "A" => {
        if self.header.is_some() {
          return Err("duplicate header record".to_string());
        }
        self.header = Some(parse_header(&fields)?);
      }
      "B" => {
        // A new B closes the previous sale even if this one is malformed.
        if let Some(done) = self.state.close() {
          self.sales.push(done);
        }
        let sale = parse_sale(&fields, self.filename, self.file_date.as_deref())?;
        self.state.start(sale);
      }
      "C" => {
        if let Some(sale) = self.state.current_mut() {
          let raw = fields.raw(LEGAL_DESCRIPTION);
          if !raw.trim().is_empty() {
            sale.legal_descriptions.push(parse_legal_description(raw));
          }
        }
      }
      "D" => {
        if let Some(sale) = self.state.current_mut() {
          sale.interests.push(parse_interest(&fields)?);
        }
      }
      "" => return Err("missing record type".to_string()),
      other => return Err(format!("unknown record type {other:?}")),
    }
    Ok(())
  }
}

/// Parse one extract. Never fails: bad lines become [`LineError`]s.
pub(crate) fn parse_content(content: &str, filename: &str) -> ParsedFile {
  let meta = file_meta(filename);
  let mut parser = Parser {
    filename,
    file_date: meta.file_date.clone(),
    header: None,
    state: RecordState::NoCurrentRecord,
    sales: Vec::new(),
  };
  let mut parse_errors = Vec::new();

  for (index, line) in content.lines().enumerate() {
    if line.trim().is_empty() {
      continue;
    }
    if let Err(message) = parser.handle_line(line) {
      parse_errors.push(LineError {
        line_number: index + 1,
        content:     preview(line),
        message,
      });
    }
  }

  if let Some(done) = parser.state.close() {
    parser.sales.push(done);
  }

  ParsedFile {
    filename: filename.to_string(),
    file_date: meta.file_date,
    district_code: meta.district_code,
    header: parser.header,
    sales: parser.sales,
    parse_errors,
  }
}
