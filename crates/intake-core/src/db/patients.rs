//! Patient database operations.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use super::{
    decode_date, decode_timestamp, encode_date, encode_timestamp, stored_precision, Database,
    DbError, DbResult,
};
use crate::models::{NewPatient, Patient};

const PATIENT_COLUMNS: &str = "id, name, birth_date, email, phone, created_at";

impl Database {
    /// Insert a new patient, stamping its creation time.
    pub fn insert_patient(&self, patient: &NewPatient, created_at: DateTime<Utc>) -> DbResult<Patient> {
        let created_at = stored_precision(created_at);
        self.conn.execute(
            r#"
            INSERT INTO patients (name, name_search, birth_date, email, phone, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                patient.name,
                search_key(&patient.name),
                patient.birth_date.as_ref().map(encode_date),
                patient.email,
                patient.phone,
                encode_timestamp(&created_at),
            ],
        )?;

        Ok(Patient {
            id: self.conn.last_insert_rowid(),
            name: patient.name.clone(),
            birth_date: patient.birth_date,
            email: patient.email.clone(),
            phone: patient.phone.clone(),
            created_at,
        })
    }

    /// Update the mutable fields of an existing patient.
    pub fn update_patient(&self, patient: &Patient) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE patients SET
                name = ?2,
                name_search = ?3,
                birth_date = ?4,
                email = ?5,
                phone = ?6
            WHERE id = ?1
            "#,
            params![
                patient.id,
                patient.name,
                search_key(&patient.name),
                patient.birth_date.as_ref().map(encode_date),
                patient.email,
                patient.phone,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, id: i64) -> DbResult<Option<Patient>> {
        self.conn
            .query_row(
                &format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE id = ?"),
                [id],
                PatientRow::read,
            )
            .optional()?
            .map(Patient::try_from)
            .transpose()
    }

    /// List patients by ascending ID.
    pub fn list_patients(&self, limit: i64, offset: i64) -> DbResult<Vec<Patient>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PATIENT_COLUMNS} FROM patients ORDER BY id ASC LIMIT ?1 OFFSET ?2"
        ))?;

        let rows = stmt.query_map(params![limit, offset], PatientRow::read)?;
        collect_patients(rows)
    }

    /// Search patients by name (case-insensitive substring match, accents included).
    pub fn search_patients_by_name(&self, query: &str) -> DbResult<Vec<Patient>> {
        let pattern = format!("%{}%", escape_like(&search_key(query)));
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {PATIENT_COLUMNS}
            FROM patients
            WHERE name_search LIKE ?1 ESCAPE '\'
            ORDER BY name ASC
            "#
        ))?;

        let rows = stmt.query_map([pattern], PatientRow::read)?;
        collect_patients(rows)
    }

    /// Delete a patient; its triages go with it.
    pub fn delete_patient(&self, id: i64) -> DbResult<bool> {
        let rows_affected = self.conn.execute("DELETE FROM patients WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}

/// Lowercased name used for searching; SQLite's `lower()` only folds ASCII.
fn search_key(name: &str) -> String {
    name.to_lowercase()
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn collect_patients(
    rows: impl Iterator<Item = rusqlite::Result<PatientRow>>,
) -> DbResult<Vec<Patient>> {
    let mut patients = Vec::new();
    for row in rows {
        patients.push(row?.try_into()?);
    }
    Ok(patients)
}

/// Intermediate row struct for database mapping.
struct PatientRow {
    id: i64,
    name: String,
    birth_date: Option<String>,
    email: String,
    phone: String,
    created_at: String,
}

impl PatientRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            birth_date: row.get(2)?,
            email: row.get(3)?,
            phone: row.get(4)?,
            created_at: row.get(5)?,
        })
    }
}

impl TryFrom<PatientRow> for Patient {
    type Error = DbError;

    fn try_from(row: PatientRow) -> Result<Self, Self::Error> {
        Ok(Patient {
            id: row.id,
            name: row.name,
            birth_date: row.birth_date.as_deref().map(decode_date).transpose()?,
            email: row.email,
            phone: row.phone,
            created_at: decode_timestamp(&row.created_at)?,
        })
    }
}
