//! Sale row statements: the per-file insert transaction and read queries.

use rusqlite::{Connection, ErrorCode, ffi, params};
use vgsales_core::{
  import::{FileType, InsertCounts},
  sale::{InterestRecord, InterestType, SaleRecord},
  store::SaleQuery,
};

use crate::{
  encode::{RawLegal, RawSale},
  schema::ZONES,
};

// ─── Reference data ──────────────────────────────────────────────────────────

pub fn seed_zones(conn: &Connection) -> rusqlite::Result<()> {
  let mut stmt = conn.prepare(
    "INSERT OR IGNORE INTO zones (code, category, description) VALUES (?1, ?2, ?3)",
  )?;
  for (code, category, description) in ZONES {
    stmt.execute(params![code, category, description])?;
  }
  Ok(())
}

pub fn seed_districts<C, N>(conn: &Connection, districts: &[(C, N)]) -> rusqlite::Result<usize>
where
  C: AsRef<str>,
  N: AsRef<str>,
{
  let mut stmt = conn.prepare("INSERT OR IGNORE INTO districts (code, name) VALUES (?1, ?2)")?;
  let mut added = 0;
  for (code, name) in districts {
    added += stmt.execute(params![code.as_ref(), name.as_ref()])?;
  }
  Ok(added)
}

// ─── Insert ──────────────────────────────────────────────────────────────────

/// A unique-index violation; the only unique index on `sales` is the
/// natural key.
fn is_duplicate(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(err, _) if err.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

/// A failure of the database as a whole rather than of one row. Every later
/// record would hit it too.
fn is_storage_fault(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(err, _) if matches!(
      err.code,
      ErrorCode::ReadOnly
        | ErrorCode::DiskFull
        | ErrorCode::SystemIoFailure
        | ErrorCode::DatabaseBusy
        | ErrorCode::DatabaseLocked
        | ErrorCode::DatabaseCorrupt
        | ErrorCode::NotADatabase
        | ErrorCode::CannotOpen
        | ErrorCode::OutOfMemory
    )
  )
}

/// Insert one sale and its children.
fn insert_one(
  conn: &Connection,
  file_type: FileType,
  sale: &SaleRecord,
  imported_at: &str,
) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO sales (
       district_code, property_id, sale_sequence, record_timestamp,
       unit_number, house_number, street_name, suburb, postcode,
       area, area_unit, contract_date, settlement_date, purchase_price,
       zone_code, zone_category, property_type, property_description,
       nature_of_property, strata_lot_number, component_code, sale_code,
       dealing_number, source_file, file_date, file_type, imported_at
     ) VALUES (
       ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
       ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27
     )",
    params![
      sale.district_code,
      sale.property_id,
      sale.sale_sequence,
      sale.record_timestamp,
      sale.unit_number,
      sale.house_number,
      sale.street_name,
      sale.suburb,
      sale.postcode,
      sale.area,
      sale.area_unit,
      sale.contract_date,
      sale.settlement_date,
      sale.purchase_price,
      sale.zone_code,
      sale.zone_category,
      sale.property_type,
      sale.property_description,
      sale.nature_of_property,
      sale.strata_lot_number,
      sale.component_code,
      sale.sale_code,
      sale.dealing_number,
      sale.source_file,
      sale.file_date,
      file_type.as_str(),
      imported_at,
    ],
  )?;
  let sale_id = conn.last_insert_rowid();

  let mut legal_stmt = conn.prepare_cached(
    "INSERT INTO legal_descriptions (sale_id, raw, lot_number, plan_number, plan_type)
     VALUES (?1, ?2, ?3, ?4, ?5)",
  )?;
  for legal in &sale.legal_descriptions {
    legal_stmt.execute(params![
      sale_id,
      legal.raw,
      legal.lot_number,
      legal.plan_number,
      legal.plan_type.map(|t| t.as_code()),
    ])?;
  }

  let mut interest_stmt = conn.prepare_cached(
    "INSERT INTO interests (sale_id, interest_type, detail) VALUES (?1, ?2, ?3)",
  )?;
  for interest in &sale.interests {
    interest_stmt.execute(params![
      sale_id,
      interest.interest_type.as_code(),
      interest.detail,
    ])?;
  }

  Ok(())
}

/// Insert a whole file's records in one transaction.
///
/// Each record runs under its own savepoint, so a record that fails part way
/// through leaves none of its rows behind. Row-level failures become
/// counters. `Err` is returned when the transaction itself cannot proceed:
/// a savepoint or commit fails, or the database reports a storage fault. In
/// that case nothing from this batch is kept.
pub fn insert_batch(
  conn: &mut Connection,
  file_type: FileType,
  sales: &[SaleRecord],
  imported_at: &str,
) -> rusqlite::Result<InsertCounts> {
  let mut tx = conn.transaction()?;
  let mut counts = InsertCounts::default();

  for sale in sales {
    counts.processed += 1;
    let sp = tx.savepoint()?;
    match insert_one(&sp, file_type, sale, imported_at) {
      Ok(()) => {
        sp.commit()?;
        counts.inserted += 1;
      }
      Err(e) if is_duplicate(&e) => {
        counts.skipped += 1;
        tracing::debug!(
          district = %sale.district_code,
          property_id = %sale.property_id,
          sequence = sale.sale_sequence,
          "duplicate sale skipped"
        );
      }
      Err(e) if is_storage_fault(&e) => {
        tracing::error!(
          source_file = %sale.source_file,
          error = %e,
          "storage failure, abandoning batch"
        );
        return Err(e);
      }
      Err(e) => {
        counts.errors += 1;
        tracing::warn!(
          district = %sale.district_code,
          property_id = %sale.property_id,
          source_file = %sale.source_file,
          error = %e,
          "failed to insert sale"
        );
      }
    }
  }

  tx.commit()?;
  Ok(counts)
}

// ─── Reads ───────────────────────────────────────────────────────────────────

pub fn count(conn: &Connection) -> rusqlite::Result<i64> {
  conn.query_row("SELECT COUNT(*) FROM sales", [], |row| row.get(0))
}

pub fn query(conn: &Connection, q: &SaleQuery) -> rusqlite::Result<Vec<RawSale>> {
  // SQLite treats a negative LIMIT as "no limit".
  let limit = q.limit.map_or(-1, |l| l as i64);
  let offset = q.offset.unwrap_or(0) as i64;

  let mut stmt = conn.prepare(
    "SELECT
       id, file_type, district_code, property_id, sale_sequence, record_timestamp,
       unit_number, house_number, street_name, suburb, postcode, area, area_unit,
       contract_date, settlement_date, purchase_price, zone_code, zone_category,
       property_type, property_description, nature_of_property, strata_lot_number,
       component_code, sale_code, dealing_number, source_file, file_date
     FROM sales
     WHERE (?1 IS NULL OR suburb = ?1 COLLATE NOCASE)
       AND (?2 IS NULL OR postcode = ?2)
       AND (?3 IS NULL OR contract_date >= ?3)
       AND (?4 IS NULL OR contract_date <= ?4)
       AND (?5 IS NULL OR purchase_price >= ?5)
       AND (?6 IS NULL OR purchase_price <= ?6)
     ORDER BY contract_date, id
     LIMIT ?7 OFFSET ?8",
  )?;

  let mut sales = stmt
    .query_map(
      params![
        q.suburb,
        q.postcode,
        q.contract_from,
        q.contract_to,
        q.min_price,
        q.max_price,
        limit,
        offset,
      ],
      |row| {
        Ok(RawSale {
          id:        row.get(0)?,
          file_type: row.get(1)?,
          record:    SaleRecord {
            district_code:        row.get(2)?,
            property_id:          row.get(3)?,
            sale_sequence:        row.get(4)?,
            record_timestamp:     row.get(5)?,
            unit_number:          row.get(6)?,
            house_number:         row.get(7)?,
            street_name:          row.get(8)?,
            suburb:               row.get(9)?,
            postcode:             row.get(10)?,
            area:                 row.get(11)?,
            area_unit:            row.get(12)?,
            contract_date:        row.get(13)?,
            settlement_date:      row.get(14)?,
            purchase_price:       row.get(15)?,
            zone_code:            row.get(16)?,
            zone_category:        row.get(17)?,
            property_type:        row.get(18)?,
            property_description: row.get(19)?,
            nature_of_property:   row.get(20)?,
            strata_lot_number:    row.get(21)?,
            component_code:       row.get(22)?,
            sale_code:            row.get(23)?,
            dealing_number:       row.get(24)?,
            source_file:          row.get(25)?,
            file_date:            row.get(26)?,
            legal_descriptions:   Vec::new(),
            interests:            Vec::new(),
          },
          legal:     Vec::new(),
        })
      },
    )?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let mut legal_stmt = conn.prepare(
    "SELECT raw, lot_number, plan_number, plan_type
     FROM legal_descriptions WHERE sale_id = ?1 ORDER BY id",
  )?;
  let mut interest_stmt = conn.prepare(
    "SELECT interest_type, detail FROM interests WHERE sale_id = ?1 ORDER BY id",
  )?;

  for sale in &mut sales {
    sale.legal = legal_stmt
      .query_map(params![sale.id], |row| {
        Ok(RawLegal {
          raw:         row.get(0)?,
          lot_number:  row.get(1)?,
          plan_number: row.get(2)?,
          plan_type:   row.get(3)?,
        })
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?;

    sale.record.interests = interest_stmt
      .query_map(params![sale.id], |row| {
        Ok(InterestRecord {
          interest_type: InterestType::from_code(&row.get::<_, String>(0)?),
          detail:        row.get(1)?,
        })
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?;
  }

  Ok(sales)
}
