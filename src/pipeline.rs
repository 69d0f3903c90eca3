// 🚰 Pipeline - wires the two stages to the reader and the store
//   extract:   CSV rows → Extractor → archive (replaced wholesale)
//   transform: archive → Transformer → dwelling store (+ optional JSONL)

use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;
use std::io::{Read, Write};
use tracing::info;

use crate::db::{
    archive_row, archived_entry, clear_archive, decode_archived, upsert_dwelling, StoreStats,
    ARCHIVE_QUERY,
};
use crate::dwelling::GroupSizePolicy;
use crate::extractor::{ExtractStats, Extractor};
use crate::reader::RowReader;
use crate::transform::{TransformStats, Transformer};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TransformSummary {
    pub transform: TransformStats,
    pub store: StoreStats,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub extract: ExtractStats,
    pub transform: TransformStats,
    pub store: StoreStats,
}

/// Stage 1: replace the archive with the rows extracted from `rows`
pub fn extract_into_archive<R: Read>(conn: &mut Connection, rows: RowReader<R>) -> Result<ExtractStats> {
    let mut extractor = Extractor::new()?;
    let tx = conn.transaction()?;
    clear_archive(&tx)?;

    for row in rows {
        let row = row?;
        if let Some(extracted) = extractor.process(&row) {
            archive_row(&tx, &extracted)?;
        }
    }
    tx.commit()?;

    let stats = extractor.stats();
    info!(
        rows_read = stats.rows_read,
        rows_extracted = stats.rows_extracted,
        rows_skipped = stats.rows_skipped,
        "extraction finished"
    );
    Ok(stats)
}

/// Stage 2: assemble archived rows into dwellings, store them and optionally
/// write one JSON document per line to `output`
pub fn transform_archive(
    conn: &mut Connection,
    policy: GroupSizePolicy,
    mut output: Option<&mut dyn Write>,
) -> Result<TransformSummary> {
    let mut transformer = Transformer::new(policy)?;
    let mut store = StoreStats::default();

    let tx = conn.transaction()?;
    {
        // Rows stream straight off the cursor; the first read error stops the stream
        let mut stmt = tx.prepare(ARCHIVE_QUERY)?;
        let mut read_error = None;
        let rows = stmt
            .query_map([], archived_entry)?
            .map(decode_archived)
            .map_while(|row| match row {
                Ok(row) => Some(row),
                Err(err) => {
                    read_error = Some(err);
                    None
                }
            });

        for dwelling in transformer.transform(rows) {
            if let Some(out) = output.as_mut() {
                serde_json::to_writer(&mut **out, &dwelling.to_json())?;
                writeln!(out)?;
            }
            store.record(upsert_dwelling(&tx, &dwelling)?);
        }

        if let Some(err) = read_error {
            return Err(err);
        }
    }
    tx.commit()?;

    let transform = transformer.stats();
    info!(
        policy = %policy,
        groups = transform.groups,
        dwellings = transform.dwellings,
        groups_dropped = transform.groups_dropped,
        inserted = store.inserted,
        updated = store.updated,
        unchanged = store.unchanged,
        "transform finished"
    );
    Ok(TransformSummary { transform, store })
}

/// Both stages back to back
pub fn run<R: Read>(
    conn: &mut Connection,
    rows: RowReader<R>,
    policy: GroupSizePolicy,
    output: Option<&mut dyn Write>,
) -> Result<RunSummary> {
    let extract = extract_into_archive(conn, rows)?;
    let TransformSummary { transform, store } = transform_archive(conn, policy, output)?;
    Ok(RunSummary {
        extract,
        transform,
        store,
    })
}
