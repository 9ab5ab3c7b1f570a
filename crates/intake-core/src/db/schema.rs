//! SQLite schema definition.

/// Complete database schema for the intake service.
pub const SCHEMA: &str = r#"
-- Enable foreign keys (triages cascade with their patient)
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Patients
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    name_search TEXT NOT NULL,                   -- Unicode-lowercased name
    birth_date TEXT,                             -- YYYY-MM-DD
    email TEXT NOT NULL UNIQUE,                  -- lower-cased before insert
    phone TEXT NOT NULL UNIQUE,                  -- +55 followed by 10/11 digits
    created_at TEXT NOT NULL                     -- RFC 3339, UTC, microseconds
);

CREATE INDEX IF NOT EXISTS idx_patients_name ON patients(name);
CREATE INDEX IF NOT EXISTS idx_patients_name_search ON patients(name_search);

-- ============================================================================
-- Triages (Immutable - insert and delete only)
-- ============================================================================

CREATE TABLE IF NOT EXISTS triages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    patient_id INTEGER NOT NULL REFERENCES patients(id) ON DELETE CASCADE,
    triage_date TEXT NOT NULL,                   -- YYYY-MM-DD
    triage_time TEXT NOT NULL CHECK (length(triage_time) = 5),  -- HH:MM
    weight_kg REAL NOT NULL CHECK (weight_kg > 0 AND weight_kg <= 500),
    height_cm REAL NOT NULL CHECK (height_cm > 20 AND height_cm <= 300),
    glucose_mg_dl REAL NOT NULL CHECK (glucose_mg_dl >= 0 AND glucose_mg_dl <= 1000),
    heart_rate_bpm INTEGER NOT NULL CHECK (heart_rate_bpm > 20 AND heart_rate_bpm <= 250),
    pressure TEXT NOT NULL,                      -- canonical systolic/diastolic
    systolic_mmhg INTEGER,
    diastolic_mmhg INTEGER,
    fasting INTEGER NOT NULL CHECK (fasting IN (0, 1)),
    notes TEXT CHECK (notes IS NULL OR length(notes) <= 2000),
    created_at TEXT,                             -- NULL only for imported rows
    CHECK ((systolic_mmhg IS NULL) = (diastolic_mmhg IS NULL)),
    CHECK (systolic_mmhg IS NULL OR pressure = systolic_mmhg || '/' || diastolic_mmhg)
);

CREATE INDEX IF NOT EXISTS idx_triages_patient_recency
    ON triages(patient_id, created_at DESC, triage_date DESC, triage_time DESC, id DESC);
CREATE INDEX IF NOT EXISTS idx_triages_chronology
    ON triages(triage_date DESC, triage_time DESC);

-- Triages are never updated in place
CREATE TRIGGER IF NOT EXISTS triages_immutable BEFORE UPDATE ON triages
BEGIN
    SELECT RAISE(ABORT, 'Triage records are immutable');
END;

-- ============================================================================
-- Staff Users
-- ============================================================================

CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL COLLATE NOCASE UNIQUE,
    phone TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL
);
"#;
