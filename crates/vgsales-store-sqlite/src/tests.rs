//! Integration tests for `SqliteStore` against an in-memory database.

use vgsales_core::{
  import::{FileType, ImportStatus, InsertCounts, NewImport},
  sale::{InterestRecord, InterestType, LegalDescription, PlanType, SaleRecord},
  store::{SaleQuery, SalesStore},
};

use crate::{DISTRICTS, ReferenceTable, SqliteStore, ZONES, sales, schema::SCHEMA};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn sale(property_id: &str, contract_date: Option<&str>) -> SaleRecord {
  SaleRecord {
    district_code: "214".into(),
    property_id: property_id.into(),
    sale_sequence: 1,
    house_number: Some("84".into()),
    street_name: Some("MERRIVILLE RD".into()),
    suburb: Some("KELLYVILLE RIDGE".into()),
    postcode: Some("2155".into()),
    area: Some(456.1),
    area_unit: Some("M".into()),
    contract_date: contract_date.map(str::to_string),
    purchase_price: Some(1_565_000),
    zone_code: Some("R2".into()),
    source_file: "214_SALES_DATA_15122025.DAT".into(),
    file_date: Some("20251215".into()),
    legal_descriptions: vec![LegalDescription {
      raw:         "13/1032686".into(),
      lot_number:  Some("13".into()),
      plan_number: Some("1032686".into()),
      plan_type:   Some(PlanType::Deposited),
    }],
    interests: vec![InterestRecord {
      interest_type: InterestType::Purchaser,
      detail:        Some("SMITH;JANE".into()),
    }],
    ..Default::default()
  }
}

fn new_import(filename: &str) -> NewImport {
  NewImport {
    filename:       filename.into(),
    file_path:      format!("/data/{filename}"),
    file_type:      FileType::Weekly,
    file_date:      Some("20251215".into()),
    district_code:  "214".into(),
    content_sha256: Some("abc123".into()),
  }
}

// ─── Initialisation ──────────────────────────────────────────────────────────

#[tokio::test]
async fn reference_tables_are_seeded_on_open() {
  let s = store().await;
  assert_eq!(s.reference_count(ReferenceTable::Zones).await.unwrap(), ZONES.len() as u64);
  assert_eq!(
    s.reference_count(ReferenceTable::Districts).await.unwrap(),
    DISTRICTS.len() as u64
  );
}

#[tokio::test]
async fn reopening_a_file_store_is_harmless() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("sales.db");

  let s = SqliteStore::open(&path).await.unwrap();
  s.insert_sales(FileType::Weekly, vec![sale("1", Some("2025-10-25"))])
    .await
    .unwrap();
  drop(s);

  let s = SqliteStore::open(&path).await.unwrap();
  assert_eq!(s.count_sales().await.unwrap(), 1);
  assert_eq!(s.reference_count(ReferenceTable::Zones).await.unwrap(), ZONES.len() as u64);
  assert_eq!(
    s.reference_count(ReferenceTable::Districts).await.unwrap(),
    DISTRICTS.len() as u64
  );
}

#[tokio::test]
async fn configured_districts_only_add() {
  let s = store().await;
  let districts = vec![
    ("214".to_string(), "Renamed".to_string()),
    ("999".to_string(), "Lord Howe Island".to_string()),
  ];
  assert_eq!(s.seed_districts(districts.clone()).await.unwrap(), 1);
  assert_eq!(s.seed_districts(districts).await.unwrap(), 0);
  assert_eq!(
    s.reference_count(ReferenceTable::Districts).await.unwrap(),
    DISTRICTS.len() as u64 + 1
  );
}

// ─── Import ledger ───────────────────────────────────────────────────────────

#[tokio::test]
async fn begin_then_complete() {
  let s = store().await;
  assert!(!s.is_completed("a.DAT", "214").await.unwrap());

  let id = s.begin_import(new_import("a.DAT")).await.unwrap();
  let attempt = s.get_attempt(id).await.unwrap().unwrap();
  assert_eq!(attempt.status, ImportStatus::Processing);
  assert!(attempt.started_at.is_some());
  assert!(attempt.completed_at.is_none());
  assert!(!s.is_completed("a.DAT", "214").await.unwrap());

  let counts = InsertCounts { processed: 3, inserted: 2, skipped: 1, errors: 0 };
  s.complete_import(id, counts).await.unwrap();

  let attempt = s.get_attempt(id).await.unwrap().unwrap();
  assert_eq!(attempt.status, ImportStatus::Completed);
  assert_eq!(attempt.counts, counts);
  assert!(attempt.completed_at.is_some());
  assert!(s.is_completed("a.DAT", "214").await.unwrap());
  assert!(!s.is_completed("a.DAT", "215").await.unwrap());
}

#[tokio::test]
async fn fail_records_message() {
  let s = store().await;
  let id = s.begin_import(new_import("a.DAT")).await.unwrap();
  s.fail_import(id, "disk full".into()).await.unwrap();

  let attempt = s.find_attempt("a.DAT", "214").await.unwrap().unwrap();
  assert_eq!(attempt.id, id);
  assert_eq!(attempt.status, ImportStatus::Failed);
  assert_eq!(attempt.error_message.as_deref(), Some("disk full"));
  assert!(!s.is_completed("a.DAT", "214").await.unwrap());
}

#[tokio::test]
async fn begin_resets_an_existing_attempt() {
  let s = store().await;
  let id = s.begin_import(new_import("a.DAT")).await.unwrap();
  s.fail_import(id, "boom".into()).await.unwrap();

  let mut again = new_import("a.DAT");
  again.content_sha256 = Some("def456".into());
  let second = s.begin_import(again).await.unwrap();
  assert_eq!(second, id);

  let attempt = s.get_attempt(id).await.unwrap().unwrap();
  assert_eq!(attempt.status, ImportStatus::Processing);
  assert_eq!(attempt.error_message, None);
  assert_eq!(attempt.completed_at, None);
  assert_eq!(attempt.counts, InsertCounts::default());
  assert_eq!(attempt.content_sha256.as_deref(), Some("def456"));
  assert_eq!(s.list_attempts().await.unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_attempt_id_errors() {
  let s = store().await;
  let err = s
    .complete_import(42, InsertCounts::default())
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::AttemptNotFound(42)));
  let err = s.fail_import(42, "x".into()).await.unwrap_err();
  assert!(matches!(err, crate::Error::AttemptNotFound(42)));
}

#[tokio::test]
async fn attempts_listed_by_filename() {
  let s = store().await;
  s.begin_import(new_import("b.DAT")).await.unwrap();
  s.begin_import(new_import("a.DAT")).await.unwrap();
  let names: Vec<_> = s
    .list_attempts()
    .await
    .unwrap()
    .into_iter()
    .map(|a| a.filename)
    .collect();
  assert_eq!(names, ["a.DAT", "b.DAT"]);
}

// ─── Insert ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_read_back_with_children() {
  let s = store().await;
  let counts = s
    .insert_sales(FileType::Annual, vec![sale("1", Some("2025-10-25"))])
    .await
    .unwrap();
  assert_eq!(counts, InsertCounts { processed: 1, inserted: 1, skipped: 0, errors: 0 });

  let rows = s.query_sales(&SaleQuery::default()).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].file_type, FileType::Annual);
  assert_eq!(rows[0].record, sale("1", Some("2025-10-25")));
}

#[tokio::test]
async fn natural_key_duplicates_are_skipped() {
  let s = store().await;
  let first = s
    .insert_sales(
      FileType::Weekly,
      vec![sale("1", Some("2025-10-25")), sale("1", Some("2025-10-25"))],
    )
    .await
    .unwrap();
  assert_eq!(first, InsertCounts { processed: 2, inserted: 1, skipped: 1, errors: 0 });

  // Same key, different provenance and price: still a duplicate.
  let mut resent = sale("1", Some("2025-10-25"));
  resent.source_file = "other.DAT".into();
  resent.purchase_price = Some(1);
  let second = s.insert_sales(FileType::Weekly, vec![resent]).await.unwrap();
  assert_eq!(second.skipped, 1);

  // A different sequence or contract date is a different sale.
  let mut next_sale = sale("1", Some("2025-10-25"));
  next_sale.sale_sequence = 2;
  let third = s
    .insert_sales(FileType::Weekly, vec![next_sale, sale("1", Some("2025-11-01"))])
    .await
    .unwrap();
  assert_eq!(third.inserted, 2);
  assert_eq!(s.count_sales().await.unwrap(), 3);
}

#[tokio::test]
async fn missing_contract_date_still_deduplicates() {
  let s = store().await;
  let counts = s
    .insert_sales(FileType::Weekly, vec![sale("9", None), sale("9", None)])
    .await
    .unwrap();
  assert_eq!(counts.inserted, 1);
  assert_eq!(counts.skipped, 1);
}

#[test]
fn failing_record_does_not_roll_back_siblings() {
  let mut conn = rusqlite::Connection::open_in_memory().unwrap();
  conn.execute_batch(SCHEMA).unwrap();
  conn
    .execute_batch(
      "CREATE TRIGGER reject_interest BEFORE INSERT ON interests
       WHEN NEW.detail = 'REJECT'
       BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
    )
    .unwrap();

  let mut bad = sale("2", Some("2025-10-25"));
  bad.interests[0].detail = Some("REJECT".into());
  let batch = [sale("1", Some("2025-10-25")), bad, sale("3", Some("2025-10-25"))];

  let counts = sales::insert_batch(&mut conn, FileType::Weekly, &batch, "2025-12-15T00:00:00Z")
    .unwrap();
  assert_eq!(counts, InsertCounts { processed: 3, inserted: 2, skipped: 0, errors: 1 });

  // The failed record's sale row and legal description were rolled back.
  let sales_left: i64 = conn
    .query_row("SELECT COUNT(*) FROM sales WHERE property_id = '2'", [], |r| r.get(0))
    .unwrap();
  let legal_rows: i64 = conn
    .query_row("SELECT COUNT(*) FROM legal_descriptions", [], |r| r.get(0))
    .unwrap();
  assert_eq!(sales_left, 0);
  assert_eq!(legal_rows, 2);
}

#[test]
fn storage_fault_aborts_the_batch() {
  let mut conn = rusqlite::Connection::open_in_memory().unwrap();
  conn.execute_batch(SCHEMA).unwrap();
  conn.execute_batch("PRAGMA query_only = 1;").unwrap();

  let batch = [sale("1", Some("2025-10-25")), sale("2", Some("2025-10-25"))];
  let err = sales::insert_batch(&mut conn, FileType::Weekly, &batch, "2025-12-15T00:00:00Z")
    .unwrap_err();
  assert!(matches!(
    err,
    rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ReadOnly
  ));

  conn.execute_batch("PRAGMA query_only = 0;").unwrap();
  let rows: i64 = conn
    .query_row("SELECT COUNT(*) FROM sales", [], |r| r.get(0))
    .unwrap();
  assert_eq!(rows, 0);
}

// ─── Queries ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn query_filters() {
  let s = store().await;
  let mut cheap = sale("1", Some("2024-03-01"));
  cheap.purchase_price = Some(500_000);
  cheap.suburb = Some("ROUSE HILL".into());
  cheap.postcode = Some("2155".into());
  let mut dear = sale("2", Some("2025-06-01"));
  dear.purchase_price = Some(2_000_000);
  let mut other = sale("3", Some("2025-07-01"));
  other.postcode = Some("2000".into());
  other.suburb = Some("SYDNEY".into());
  s.insert_sales(FileType::Weekly, vec![cheap, dear, other]).await.unwrap();

  let by_suburb = s
    .query_sales(&SaleQuery { suburb: Some("rouse hill".into()), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(by_suburb.len(), 1);
  assert_eq!(by_suburb[0].record.property_id, "1");

  let by_postcode = s
    .query_sales(&SaleQuery { postcode: Some("2155".into()), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(by_postcode.len(), 2);

  let by_date = s
    .query_sales(&SaleQuery {
      contract_from: Some("2025-01-01".into()),
      contract_to: Some("2025-06-30".into()),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(by_date.len(), 1);
  assert_eq!(by_date[0].record.property_id, "2");

  let by_price = s
    .query_sales(&SaleQuery { min_price: Some(1_000_000), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(by_price.len(), 2);

  let page = s
    .query_sales(&SaleQuery { limit: Some(1), offset: Some(1), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(page.len(), 1);
  assert_eq!(page[0].record.property_id, "2");
}
