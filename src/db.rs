// 🗄️ Storage - intermediate archive + dwelling document store
// One SQLite file (WAL mode) holds both:
//   extracted_rows  stage 1 output keyed by file name, re-read in insertion order
//   dwellings       stage 2 output keyed by house id, upserted by content hash

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::path::Path;

use crate::attributes::{FILE_NAME, HOUSE_ID};
use crate::dwelling::Dwelling;
use crate::schema::RawRow;

pub fn open_database(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database: {}", path.display()))?;
    setup_database(&conn)?;
    Ok(conn)
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    // ==========================================================================
    // Archive of extracted rows
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS extracted_rows (
            file_name TEXT PRIMARY KEY,
            house_id TEXT,
            position INTEGER NOT NULL,
            data TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Dwelling documents
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS dwellings (
            house_id INTEGER PRIMARY KEY,
            document TEXT NOT NULL,
            document_hash TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_extracted_position ON extracted_rows(position)",
        [],
    )?;

    Ok(())
}

// ============================================================================
// ARCHIVE
// ============================================================================

pub fn clear_archive(conn: &Connection) -> Result<usize> {
    Ok(conn.execute("DELETE FROM extracted_rows", [])?)
}

/// Store one extracted row; an existing row with the same file name is
/// overwritten in place and keeps its position
pub fn archive_row(conn: &Connection, row: &RawRow) -> Result<()> {
    let file_name = row
        .get(FILE_NAME)
        .and_then(Value::as_str)
        .context("Extracted row has no file name")?;
    let house_id = row.get(HOUSE_ID).and_then(Value::as_str);
    let data = serde_json::to_string(row)?;

    conn.execute(
        "INSERT INTO extracted_rows (file_name, house_id, position, data)
         VALUES (?1, ?2, (SELECT COALESCE(MAX(position), 0) + 1 FROM extracted_rows), ?3)
         ON CONFLICT(file_name) DO UPDATE SET
             house_id = excluded.house_id,
             data = excluded.data",
        params![file_name, house_id, data],
    )
    .with_context(|| format!("Failed to archive row {}", file_name))?;

    Ok(())
}

/// Archived rows in the order they were archived
pub const ARCHIVE_QUERY: &str = "SELECT file_name, data FROM extracted_rows ORDER BY position";

/// Row mapper for `ARCHIVE_QUERY`
pub fn archived_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<(String, String)> {
    Ok((row.get(0)?, row.get(1)?))
}

pub fn decode_archived(entry: rusqlite::Result<(String, String)>) -> Result<RawRow> {
    let (file_name, data) = entry?;
    serde_json::from_str(&data).with_context(|| format!("Corrupt archived row {}", file_name))
}

/// Every archived row, collected
pub fn load_archive(conn: &Connection) -> Result<Vec<RawRow>> {
    let mut stmt = conn.prepare(ARCHIVE_QUERY)?;
    let rows = stmt.query_map([], archived_entry)?;
    rows.map(decode_archived).collect()
}

pub fn archive_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM extracted_rows", [], |row| row.get(0))?;
    Ok(count)
}

// ============================================================================
// DOCUMENT STORE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
    Unchanged,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
}

impl StoreStats {
    pub fn record(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Inserted => self.inserted += 1,
            UpsertOutcome::Updated => self.updated += 1,
            UpsertOutcome::Unchanged => self.unchanged += 1,
        }
    }

    pub fn written(&self) -> usize {
        self.inserted + self.updated
    }
}

pub fn compute_document_hash(document: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(document.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Insert or replace a dwelling document; identical content is left alone
pub fn upsert_dwelling(conn: &Connection, dwelling: &Dwelling) -> Result<UpsertOutcome> {
    let document = serde_json::to_string(&dwelling.to_json())?;
    let hash = compute_document_hash(&document);

    let existing: Option<String> = conn
        .query_row(
            "SELECT document_hash FROM dwellings WHERE house_id = ?1",
            params![dwelling.house_id],
            |row| row.get(0),
        )
        .optional()?;

    let outcome = match existing {
        Some(existing) if existing == hash => return Ok(UpsertOutcome::Unchanged),
        Some(_) => UpsertOutcome::Updated,
        None => UpsertOutcome::Inserted,
    };

    conn.execute(
        "INSERT OR REPLACE INTO dwellings (house_id, document, document_hash, updated_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![dwelling.house_id, document, hash, Utc::now().to_rfc3339()],
    )
    .with_context(|| format!("Failed to store dwelling {}", dwelling.house_id))?;

    Ok(outcome)
}

pub fn get_dwelling(conn: &Connection, house_id: i64) -> Result<Option<Value>> {
    let document: Option<String> = conn
        .query_row(
            "SELECT document FROM dwellings WHERE house_id = ?1",
            params![house_id],
            |row| row.get(0),
        )
        .optional()?;

    document
        .map(|document| serde_json::from_str(&document).context("Corrupt dwelling document"))
        .transpose()
}

pub fn dwelling_count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM dwellings", [], |row| row.get(0))?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dwelling::Region;
    use serde_json::json;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        conn
    }

    fn row(file_name: &str, house_id: &str) -> RawRow {
        match json!({"fileName": file_name, "HOUSE_ID": house_id, "ceilings": []}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn dwelling(house_id: i64, city: &str) -> Dwelling {
        Dwelling {
            house_id,
            year_built: 1979,
            city: city.to_string(),
            region: Region::Ontario,
            forward_sortation_area: "K1P".to_string(),
            evaluations: Vec::new(),
        }
    }

    #[test]
    fn test_archive_keeps_insertion_order() {
        let conn = setup();
        archive_row(&conn, &row("3-9", "9")).unwrap();
        archive_row(&conn, &row("1-2", "2")).unwrap();
        archive_row(&conn, &row("2-9", "9")).unwrap();

        let archived = load_archive(&conn).unwrap();
        let names: Vec<&str> = archived.iter().map(|r| r["fileName"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["3-9", "1-2", "2-9"]);
    }

    #[test]
    fn test_archive_replaces_same_file_name() {
        let conn = setup();
        archive_row(&conn, &row("1-2", "2")).unwrap();
        archive_row(&conn, &row("1-2", "2")).unwrap();
        assert_eq!(archive_count(&conn).unwrap(), 1);

        assert_eq!(clear_archive(&conn).unwrap(), 1);
        assert_eq!(archive_count(&conn).unwrap(), 0);
    }

    #[test]
    fn test_archive_rewrite_keeps_position() {
        let conn = setup();
        archive_row(&conn, &row("1-7", "7")).unwrap();
        archive_row(&conn, &row("2-7", "7")).unwrap();
        archive_row(&conn, &row("3-8", "8")).unwrap();

        let mut rewritten = row("1-7", "7");
        rewritten.insert("ceilings".to_string(), json!(["<Ceiling />"]));
        archive_row(&conn, &rewritten).unwrap();

        let archived = load_archive(&conn).unwrap();
        let names: Vec<&str> = archived.iter().map(|r| r["fileName"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["1-7", "2-7", "3-8"]);
        assert_eq!(archived[0]["ceilings"], json!(["<Ceiling />"]));
    }

    #[test]
    fn test_archive_requires_file_name() {
        let conn = setup();
        let mut nameless = row("1-2", "2");
        nameless.remove("fileName");
        assert!(archive_row(&conn, &nameless).is_err());
    }

    #[test]
    fn test_upsert_skips_unchanged_documents() {
        let conn = setup();
        assert_eq!(upsert_dwelling(&conn, &dwelling(7, "Ottawa")).unwrap(), UpsertOutcome::Inserted);
        assert_eq!(upsert_dwelling(&conn, &dwelling(7, "Ottawa")).unwrap(), UpsertOutcome::Unchanged);
        assert_eq!(upsert_dwelling(&conn, &dwelling(7, "Gatineau")).unwrap(), UpsertOutcome::Updated);

        assert_eq!(dwelling_count(&conn).unwrap(), 1);
        let document = get_dwelling(&conn, 7).unwrap().unwrap();
        assert_eq!(document["city"], "Gatineau");
        assert!(get_dwelling(&conn, 8).unwrap().is_none());
    }

    #[test]
    fn test_compute_document_hash() {
        let hash = compute_document_hash("{}");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, compute_document_hash("{}"));
        assert_ne!(hash, compute_document_hash("[]"));
    }
}
