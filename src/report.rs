//! Merge cached per-user tallies into one CSV report.

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::cache::TallyStore;
use crate::error::Result;

/// One line of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub name: String,
    pub emoji: String,
    pub count: u64,
    pub count_first: u64,
}

/// Flatten every cached tally into rows, ordered by name then emoji.
pub fn merge<S: TallyStore + ?Sized>(store: &S) -> Result<Vec<ReportRow>> {
    let mut rows = Vec::new();
    for key in store.keys()? {
        let entry = store.load(&key)?;
        rows.extend(entry.tally.to_sequence().into_iter().map(|row| ReportRow {
            name: entry.display_name.clone(),
            emoji: row.emoji,
            count: row.total,
            count_first: row.first,
        }));
    }
    rows.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.emoji.cmp(&b.emoji)));
    Ok(rows)
}

/// Write rows as CSV with a header line.
pub fn write_csv<W: Write>(rows: &[ReportRow], writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    if rows.is_empty() {
        csv.write_record(["name", "emoji", "count", "count_first"])?;
    }
    for row in rows {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}

/// Merge the store and write the report to `path`. Returns the row count.
pub fn write_report<S: TallyStore + ?Sized>(store: &S, path: impl AsRef<Path>) -> Result<usize> {
    let path = path.as_ref();
    let rows = merge(store)?;
    let file = std::fs::File::create(path)?;
    write_csv(&rows, std::io::BufWriter::new(file))?;
    tracing::info!(rows = rows.len(), path = %path.display(), "wrote report");
    Ok(rows.len())
}
