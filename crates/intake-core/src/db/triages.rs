//! Triage database operations.
//!
//! Triages are insert-and-delete only; there is no update path.

use rusqlite::{params, OptionalExtension, Row};

use super::{
    decode_date, decode_timestamp, encode_date, encode_timestamp, stored_precision, Database,
    DbError, DbResult, CHRONOLOGY_ORDER_BY, RECENCY_ORDER_BY,
};
use crate::models::{NewTriage, Triage};

const TRIAGE_COLUMNS: &str = "id, patient_id, triage_date, triage_time, weight_kg, height_cm, \
     glucose_mg_dl, heart_rate_bpm, pressure, systolic_mmhg, diastolic_mmhg, fasting, notes, \
     created_at";

impl Database {
    /// Insert an assembled triage and return the stored record.
    pub fn insert_triage(&self, triage: &NewTriage) -> DbResult<Triage> {
        let created_at = stored_precision(triage.created_at);
        self.conn.execute(
            r#"
            INSERT INTO triages (
                patient_id, triage_date, triage_time, weight_kg, height_cm,
                glucose_mg_dl, heart_rate_bpm, pressure, systolic_mmhg,
                diastolic_mmhg, fasting, notes, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
            params![
                triage.patient_id,
                encode_date(&triage.triage_date),
                triage.triage_time,
                triage.weight_kg,
                triage.height_cm,
                triage.glucose_mg_dl,
                triage.heart_rate_bpm,
                triage.pressure,
                triage.systolic_mmhg,
                triage.diastolic_mmhg,
                triage.fasting,
                triage.notes,
                encode_timestamp(&created_at),
            ],
        )?;

        Ok(Triage {
            id: self.conn.last_insert_rowid(),
            patient_id: triage.patient_id,
            triage_date: triage.triage_date,
            triage_time: triage.triage_time.clone(),
            weight_kg: triage.weight_kg,
            height_cm: triage.height_cm,
            glucose_mg_dl: triage.glucose_mg_dl,
            heart_rate_bpm: triage.heart_rate_bpm,
            pressure: triage.pressure.clone(),
            systolic_mmhg: triage.systolic_mmhg,
            diastolic_mmhg: triage.diastolic_mmhg,
            fasting: triage.fasting,
            notes: triage.notes.clone(),
            created_at: Some(created_at),
        })
    }

    /// Get a triage by ID.
    pub fn get_triage(&self, id: i64) -> DbResult<Option<Triage>> {
        self.conn
            .query_row(
                &format!("SELECT {TRIAGE_COLUMNS} FROM triages WHERE id = ?"),
                [id],
                TriageRow::read,
            )
            .optional()?
            .map(Triage::try_from)
            .transpose()
    }

    /// Get the patient's most recent triage (creation time, then recorded
    /// date and time, then ID).
    pub fn get_most_recent_triage(&self, patient_id: i64) -> DbResult<Option<Triage>> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {TRIAGE_COLUMNS} FROM triages WHERE patient_id = ? ORDER BY {} LIMIT 1",
                    RECENCY_ORDER_BY.as_str()
                ),
                [patient_id],
                TriageRow::read,
            )
            .optional()?
            .map(Triage::try_from)
            .transpose()
    }

    /// List triages, latest recorded measurement first.
    pub fn list_triages(
        &self,
        patient_id: Option<i64>,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<Triage>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {TRIAGE_COLUMNS}
            FROM triages
            WHERE ?1 IS NULL OR patient_id = ?1
            ORDER BY {}
            LIMIT ?2 OFFSET ?3
            "#,
            CHRONOLOGY_ORDER_BY.as_str()
        ))?;

        let rows = stmt.query_map(params![patient_id, limit, offset], TriageRow::read)?;

        let mut triages = Vec::new();
        for row in rows {
            triages.push(row?.try_into()?);
        }
        Ok(triages)
    }

    /// Delete a triage.
    pub fn delete_triage(&self, id: i64) -> DbResult<bool> {
        let rows_affected = self.conn.execute("DELETE FROM triages WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}

/// Intermediate row struct for database mapping.
struct TriageRow {
    id: i64,
    patient_id: i64,
    triage_date: String,
    triage_time: String,
    weight_kg: f64,
    height_cm: f64,
    glucose_mg_dl: f64,
    heart_rate_bpm: i64,
    pressure: String,
    systolic_mmhg: Option<i64>,
    diastolic_mmhg: Option<i64>,
    fasting: bool,
    notes: Option<String>,
    created_at: Option<String>,
}

impl TriageRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            patient_id: row.get(1)?,
            triage_date: row.get(2)?,
            triage_time: row.get(3)?,
            weight_kg: row.get(4)?,
            height_cm: row.get(5)?,
            glucose_mg_dl: row.get(6)?,
            heart_rate_bpm: row.get(7)?,
            pressure: row.get(8)?,
            systolic_mmhg: row.get(9)?,
            diastolic_mmhg: row.get(10)?,
            fasting: row.get(11)?,
            notes: row.get(12)?,
            created_at: row.get(13)?,
        })
    }
}

impl TryFrom<TriageRow> for Triage {
    type Error = DbError;

    fn try_from(row: TriageRow) -> Result<Self, Self::Error> {
        Ok(Triage {
            id: row.id,
            patient_id: row.patient_id,
            triage_date: decode_date(&row.triage_date)?,
            triage_time: row.triage_time,
            weight_kg: row.weight_kg,
            height_cm: row.height_cm,
            glucose_mg_dl: row.glucose_mg_dl,
            heart_rate_bpm: row.heart_rate_bpm,
            pressure: row.pressure,
            systolic_mmhg: row.systolic_mmhg,
            diastolic_mmhg: row.diastolic_mmhg,
            fasting: row.fasting,
            notes: row.notes,
            created_at: row.created_at.as_deref().map(decode_timestamp).transpose()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewPatient;
    use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

    fn setup_db() -> (Database, i64) {
        let db = Database::open_in_memory().unwrap();
        let patient = db
            .insert_patient(
                &NewPatient {
                    name: "Maria Silva".into(),
                    birth_date: None,
                    email: "maria@example.com".into(),
                    phone: "+5592984244668".into(),
                },
                Utc::now(),
            )
            .unwrap();
        (db, patient.id)
    }

    fn make_triage(patient_id: i64, date: (i32, u32, u32), time: &str, created_at: DateTime<Utc>) -> NewTriage {
        NewTriage {
            patient_id,
            triage_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            triage_time: time.into(),
            weight_kg: 70.0,
            height_cm: 170.0,
            glucose_mg_dl: 90.0,
            heart_rate_bpm: 72,
            pressure: "120/80".into(),
            systolic_mmhg: Some(120),
            diastolic_mmhg: Some(80),
            fasting: false,
            notes: Some("sem queixas".into()),
            created_at,
        }
    }

    /// Insert a row with no creation timestamp, as legacy imports do.
    fn insert_legacy(db: &Database, patient_id: i64, date: &str, time: &str) -> i64 {
        db.conn()
            .execute(
                r#"INSERT INTO triages (patient_id, triage_date, triage_time, weight_kg, height_cm,
                       glucose_mg_dl, heart_rate_bpm, pressure, fasting)
                   VALUES (?1, ?2, ?3, 70, 170, 90, 72, '120/80', 0)"#,
                params![patient_id, date, time],
            )
            .unwrap();
        db.conn().last_insert_rowid()
    }

    #[test]
    fn test_insert_and_get() {
        let (db, patient_id) = setup_db();
        let created = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();

        let stored = db
            .insert_triage(&make_triage(patient_id, (2024, 5, 10), "08:30", created))
            .unwrap();

        let retrieved = db.get_triage(stored.id).unwrap().unwrap();
        assert_eq!(retrieved, stored);
        assert_eq!(retrieved.created_at, Some(created));
        assert_eq!(retrieved.notes.as_deref(), Some("sem queixas"));
    }

    #[test]
    fn test_unknown_patient_rejected() {
        let (db, _) = setup_db();
        let result = db.insert_triage(&make_triage(999, (2024, 5, 10), "08:30", Utc::now()));
        assert!(result.is_err());
    }

    #[test]
    fn test_most_recent_by_created_at() {
        let (db, patient_id) = setup_db();
        let base = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();

        // Recorded date/time disagree with creation order on purpose
        db.insert_triage(&make_triage(patient_id, (2024, 5, 11), "23:00", base)).unwrap();
        let newest = db
            .insert_triage(&make_triage(patient_id, (2024, 5, 1), "06:00", base + Duration::minutes(10)))
            .unwrap();
        db.insert_triage(&make_triage(patient_id, (2024, 5, 9), "12:00", base - Duration::minutes(10)))
            .unwrap();

        let recent = db.get_most_recent_triage(patient_id).unwrap().unwrap();
        assert_eq!(recent.id, newest.id);
    }

    #[test]
    fn test_most_recent_falls_back_to_date_time_then_id() {
        let (db, patient_id) = setup_db();

        insert_legacy(&db, patient_id, "2024-05-10", "09:00");
        let latest = insert_legacy(&db, patient_id, "2024-05-10", "10:30");
        insert_legacy(&db, patient_id, "2024-05-09", "23:59");

        let recent = db.get_most_recent_triage(patient_id).unwrap().unwrap();
        assert_eq!(recent.id, latest);
        assert_eq!(recent.created_at, None);

        let tie = insert_legacy(&db, patient_id, "2024-05-10", "10:30");
        let recent = db.get_most_recent_triage(patient_id).unwrap().unwrap();
        assert_eq!(recent.id, tie);
    }

    #[test]
    fn test_timestamped_rows_outrank_legacy_rows() {
        let (db, patient_id) = setup_db();
        let stamped = db
            .insert_triage(&make_triage(
                patient_id,
                (2020, 1, 1),
                "00:00",
                Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            ))
            .unwrap();
        insert_legacy(&db, patient_id, "2024-05-10", "10:30");

        let recent = db.get_most_recent_triage(patient_id).unwrap().unwrap();
        assert_eq!(recent.id, stamped.id);
    }

    #[test]
    fn test_most_recent_none() {
        let (db, patient_id) = setup_db();
        assert!(db.get_most_recent_triage(patient_id).unwrap().is_none());
    }

    #[test]
    fn test_list_by_recorded_date_time() {
        let (db, patient_id) = setup_db();
        let now = Utc::now();
        let a = db.insert_triage(&make_triage(patient_id, (2024, 5, 10), "08:30", now)).unwrap();
        let b = db.insert_triage(&make_triage(patient_id, (2024, 5, 12), "07:00", now)).unwrap();
        let c = db.insert_triage(&make_triage(patient_id, (2024, 5, 10), "17:45", now)).unwrap();

        let listed = db.list_triages(Some(patient_id), 50, 0).unwrap();
        let ids: Vec<i64> = listed.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![b.id, c.id, a.id]);

        let all = db.list_triages(None, 2, 0).unwrap();
        assert_eq!(all.len(), 2);
        assert!(db.list_triages(Some(patient_id + 1), 50, 0).unwrap().is_empty());
    }

    #[test]
    fn test_delete_triage() {
        let (db, patient_id) = setup_db();
        let stored = db
            .insert_triage(&make_triage(patient_id, (2024, 5, 10), "08:30", Utc::now()))
            .unwrap();

        assert!(db.delete_triage(stored.id).unwrap());
        assert!(!db.delete_triage(stored.id).unwrap());
        assert!(db.get_triage(stored.id).unwrap().is_none());
    }
}
