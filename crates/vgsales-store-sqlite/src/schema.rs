//! SQL schema and static reference data for the sales store.
//!
//! Executed at connection startup. Every statement is idempotent, so opening
//! an existing database is harmless. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS districts (
    code TEXT PRIMARY KEY,
    name TEXT
);

CREATE TABLE IF NOT EXISTS zones (
    code        TEXT PRIMARY KEY,
    category    TEXT NOT NULL,
    description TEXT NOT NULL
);

-- Sales are insert-only. Corrections arrive as new extract files.
CREATE TABLE IF NOT EXISTS sales (
    id                   INTEGER PRIMARY KEY AUTOINCREMENT,
    district_code        TEXT    NOT NULL,
    property_id          TEXT    NOT NULL,
    sale_sequence        INTEGER NOT NULL DEFAULT 1,
    record_timestamp     TEXT,
    unit_number          TEXT,
    house_number         TEXT,
    street_name          TEXT,
    suburb               TEXT,
    postcode             TEXT,
    area                 REAL,
    area_unit            TEXT,             -- 'M' square metres | 'H' hectares
    contract_date        TEXT,             -- YYYY-MM-DD
    settlement_date      TEXT,             -- YYYY-MM-DD
    purchase_price       INTEGER,
    zone_code            TEXT,
    zone_category        TEXT,
    property_type        TEXT,
    property_description TEXT,
    nature_of_property   TEXT,
    strata_lot_number    TEXT,
    component_code       TEXT,
    sale_code            TEXT,
    dealing_number       TEXT,
    source_file          TEXT    NOT NULL,
    file_date            TEXT,             -- YYYYMMDD
    file_type            TEXT    NOT NULL CHECK (file_type IN ('weekly', 'annual')),
    imported_at          TEXT    NOT NULL  -- RFC 3339 UTC
);

-- Natural key. A missing contract date still takes part in the comparison.
CREATE UNIQUE INDEX IF NOT EXISTS sales_natural_key ON sales (
    district_code, property_id, sale_sequence, IFNULL(contract_date, '')
);

CREATE INDEX IF NOT EXISTS sales_suburb_idx   ON sales(suburb);
CREATE INDEX IF NOT EXISTS sales_postcode_idx ON sales(postcode);
CREATE INDEX IF NOT EXISTS sales_contract_idx ON sales(contract_date);
CREATE INDEX IF NOT EXISTS sales_price_idx    ON sales(purchase_price);

CREATE TABLE IF NOT EXISTS legal_descriptions (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    sale_id     INTEGER NOT NULL REFERENCES sales(id) ON DELETE CASCADE,
    raw         TEXT    NOT NULL,
    lot_number  TEXT,
    plan_number TEXT,
    plan_type   TEXT CHECK (plan_type IN ('DP', 'SP'))
);

CREATE TABLE IF NOT EXISTS interests (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    sale_id       INTEGER NOT NULL REFERENCES sales(id) ON DELETE CASCADE,
    interest_type TEXT    NOT NULL,  -- 'P' purchaser | 'V' vendor
    detail        TEXT
);

CREATE INDEX IF NOT EXISTS legal_sale_idx    ON legal_descriptions(sale_id);
CREATE INDEX IF NOT EXISTS interest_sale_idx ON interests(sale_id);

-- One row per (filename, district_code); updated in place on re-runs.
CREATE TABLE IF NOT EXISTS import_attempts (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    filename          TEXT    NOT NULL,
    district_code     TEXT    NOT NULL,
    file_path         TEXT    NOT NULL,
    file_type         TEXT    NOT NULL,
    file_date         TEXT,
    content_sha256    TEXT,
    status            TEXT    NOT NULL DEFAULT 'pending'
        CHECK (status IN ('pending', 'processing', 'completed', 'failed')),
    records_processed INTEGER NOT NULL DEFAULT 0,
    records_inserted  INTEGER NOT NULL DEFAULT 0,
    records_skipped   INTEGER NOT NULL DEFAULT 0,
    records_errored   INTEGER NOT NULL DEFAULT 0,
    started_at        TEXT,
    completed_at      TEXT,
    error_message     TEXT,
    UNIQUE (filename, district_code)
);

PRAGMA user_version = 1;
";

/// NSW planning zones: `(code, category, description)`.
///
/// Seeded with `INSERT OR IGNORE`, so rows edited by hand survive re-runs.
pub const ZONES: &[(&str, &str, &str)] = &[
  ("R1", "Residential", "General Residential"),
  ("R2", "Residential", "Low Density Residential"),
  ("R3", "Residential", "Medium Density Residential"),
  ("R4", "Residential", "High Density Residential"),
  ("R5", "Residential", "Large Lot Residential"),
  ("B1", "Business", "Neighbourhood Centre"),
  ("B2", "Business", "Local Centre"),
  ("B3", "Business", "Commercial Core"),
  ("B4", "Business", "Mixed Use"),
  ("B5", "Business", "Business Development"),
  ("B6", "Business", "Enterprise Corridor"),
  ("B7", "Business", "Business Park"),
  ("B8", "Business", "Metropolitan Centre"),
  ("E1", "Employment", "Local Centre"),
  ("E2", "Employment", "Commercial Centre"),
  ("E3", "Employment", "Productivity Support"),
  ("E4", "Employment", "General Industrial"),
  ("E5", "Employment", "Heavy Industrial"),
  ("MU1", "Employment", "Mixed Use"),
  ("IN1", "Industrial", "General Industrial"),
  ("IN2", "Industrial", "Light Industrial"),
  ("IN3", "Industrial", "Heavy Industrial"),
  ("IN4", "Industrial", "Working Waterfront"),
  ("RU1", "Rural", "Primary Production"),
  ("RU2", "Rural", "Rural Landscape"),
  ("RU3", "Rural", "Forestry"),
  ("RU4", "Rural", "Primary Production Small Lots"),
  ("RU5", "Rural", "Village"),
  ("RU6", "Rural", "Transition"),
  ("C1", "Conservation", "National Parks and Nature Reserves"),
  ("C2", "Conservation", "Environmental Conservation"),
  ("C3", "Conservation", "Environmental Management"),
  ("C4", "Conservation", "Environmental Living"),
  ("SP1", "Special Purpose", "Special Activities"),
  ("SP2", "Special Purpose", "Infrastructure"),
  ("SP3", "Special Purpose", "Tourist"),
  ("SP4", "Special Purpose", "Enterprise"),
  ("SP5", "Special Purpose", "Metropolitan Centre"),
  ("RE1", "Recreation", "Public Recreation"),
  ("RE2", "Recreation", "Private Recreation"),
  ("W1", "Waterway", "Natural Waterways"),
  ("W2", "Waterway", "Recreational Waterways"),
  ("W3", "Waterway", "Working Waterways"),
  ("W4", "Waterway", "Working Waterfront"),
];

/// Valuation districts: `(code, name)`.
///
/// Seeded with `INSERT OR IGNORE` alongside [`ZONES`]. Configured districts
/// are added on top; they never rename a code listed here.
pub const DISTRICTS: &[(&str, &str)] = &[
  ("001", "Albury"),
  ("002", "Armidale Regional"),
  ("003", "Ballina"),
  ("004", "Balranald"),
  ("005", "Bathurst Regional"),
  ("006", "Bega Valley"),
  ("007", "Bellingen"),
  ("008", "Berrigan"),
  ("009", "Bland"),
  ("010", "Blayney"),
  ("200", "Bayside"),
  ("201", "Burwood"),
  ("202", "Canada Bay"),
  ("203", "Canterbury-Bankstown"),
  ("204", "Cumberland"),
  ("205", "Georges River"),
  ("206", "Hornsby"),
  ("207", "Hunters Hill"),
  ("208", "Inner West"),
  ("209", "Ku-ring-gai"),
  ("210", "Lane Cove"),
  ("211", "Mosman"),
  ("212", "North Sydney"),
  ("213", "Northern Beaches"),
  ("214", "Blacktown"),
  ("215", "Camden"),
  ("216", "Campbelltown"),
  ("217", "Fairfield"),
  ("218", "Hawkesbury"),
  ("219", "Liverpool"),
  ("220", "Parramatta"),
  ("221", "Penrith"),
  ("222", "Randwick"),
  ("223", "Ryde"),
  ("224", "Strathfield"),
  ("225", "Sutherland Shire"),
  ("226", "Sydney"),
  ("227", "The Hills Shire"),
  ("228", "Waverley"),
  ("229", "Willoughby"),
  ("230", "Woollahra"),
  ("231", "Wollondilly"),
  ("232", "Blue Mountains"),
];
