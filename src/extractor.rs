// 📤 Stage 1 - Extractor
// raw row → input schema → snippets of RAW_XML → flat extracted row.
// A bad row is logged by file name and skipped; the stream keeps going.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::attributes::{RowSchema, EVAL_ID, FILE_NAME, HOUSE_ID, RAW_XML};
use crate::error::Result;
use crate::schema::{RawRow, SchemaValidator};
use crate::snippets::Snippets;

/// Archive name of one evaluation row: `{EVAL_ID}-{HOUSE_ID}`
pub fn file_name(eval_id: impl std::fmt::Display, house_id: impl std::fmt::Display) -> String {
    format!("{}-{}", eval_id, house_id)
}

/// Best-effort file name for log lines about rows that may not have validated
pub fn describe_row(row: &RawRow) -> String {
    if let Some(Value::String(name)) = row.get(FILE_NAME) {
        return name.clone();
    }
    let part = |field: &str| match row.get(field) {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Null) | None => "?".to_string(),
        Some(other) => other.to_string(),
    };
    file_name(part(EVAL_ID), part(HOUSE_ID))
}

/// Extract one raw row against an input-row validator
pub fn extract_row(validator: &SchemaValidator, row: &RawRow) -> Result<RawRow> {
    let validated = validator.validate(row)?;
    let document = validated.markup(RAW_XML)?;

    let mut extracted = RawRow::new();
    for rule in validator.schema().fields() {
        if rule.name == RAW_XML {
            continue;
        }
        if let Some(value) = row.get(&rule.name) {
            extracted.insert(rule.name.clone(), value.clone());
        }
    }

    extracted.insert(
        FILE_NAME.to_string(),
        Value::String(file_name(validated.integer(EVAL_ID)?, validated.integer(HOUSE_ID)?)),
    );
    extracted.extend(Snippets::from_document(document).to_fields());

    Ok(extracted)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExtractStats {
    pub rows_read: usize,
    pub rows_extracted: usize,
    pub rows_skipped: usize,
}

pub struct Extractor {
    validator: SchemaValidator,
    stats: ExtractStats,
}

impl Extractor {
    pub fn new() -> std::result::Result<Self, regex::Error> {
        Ok(Extractor {
            validator: SchemaValidator::new(RowSchema::input_rows())?,
            stats: ExtractStats::default(),
        })
    }

    pub fn stats(&self) -> ExtractStats {
        self.stats
    }

    /// Extract one row, logging and counting a failure instead of returning it
    pub fn process(&mut self, row: &RawRow) -> Option<RawRow> {
        self.stats.rows_read += 1;
        match extract_row(&self.validator, row) {
            Ok(extracted) => {
                self.stats.rows_extracted += 1;
                debug!(file = %describe_row(&extracted), "extracted row");
                Some(extracted)
            }
            Err(err) => {
                self.stats.rows_skipped += 1;
                warn!(file = %describe_row(row), error = %err, "skipping row");
                None
            }
        }
    }

    /// Lazily extract every row, dropping the ones that fail
    pub fn extract<'a, I>(&'a mut self, rows: I) -> impl Iterator<Item = RawRow> + 'a
    where
        I: IntoIterator<Item = RawRow>,
        I::IntoIter: 'a,
    {
        rows.into_iter().filter_map(move |row| self.process(&row))
    }
}
