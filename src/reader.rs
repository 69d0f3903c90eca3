// 📂 Row Reader - CSV evaluation exports
// Each record becomes a flat RawRow keyed by header; empty cells are null.

use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecordsIntoIter, WriterBuilder};
use serde_json::Value;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::schema::RawRow;

pub struct RowReader<R: Read> {
    source: String,
    headers: Vec<String>,
    records: StringRecordsIntoIter<R>,
    line: usize,
}

impl RowReader<File> {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open file: {}", path.display()))?;
        let source = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown.csv")
            .to_string();
        RowReader::from_reader(file, source)
    }
}

impl<R: Read> RowReader<R> {
    pub fn from_reader(reader: R, source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(reader);
        let headers = reader
            .headers()
            .with_context(|| format!("Failed to read CSV header in {}", source))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        Ok(RowReader {
            source,
            headers,
            records: reader.into_records(),
            line: 1,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }
}

impl<R: Read> Iterator for RowReader<R> {
    type Item = Result<RawRow>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.next()?;
        self.line += 1;

        let line = self.line;
        let source = &self.source;
        Some(
            record
                .with_context(|| format!("Failed to parse CSV line {} in {}", line, source))
                .map(|record| {
                    self.headers
                        .iter()
                        .zip(record.iter())
                        .map(|(header, cell)| {
                            let value = if cell.is_empty() {
                                Value::Null
                            } else {
                                Value::String(cell.to_string())
                            };
                            (header.clone(), value)
                        })
                        .collect()
                }),
        )
    }
}

/// Write rows as CSV under `headers`; null or missing cells are written empty
pub fn write_rows<W: Write>(writer: W, headers: &[&str], rows: &[RawRow]) -> Result<()> {
    let mut writer = WriterBuilder::new().from_writer(writer);
    writer.write_record(headers)?;

    for row in rows {
        let cells = headers.iter().map(|header| match row.get(*header) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
        });
        writer.write_record(cells)?;
    }

    writer.flush().context("Failed to flush CSV output")?;
    Ok(())
}
