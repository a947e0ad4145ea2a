use crate::error::ScrapeError;
use crate::models::Record;
use std::path::Path;
use tracing::info;

// ── Record sink ───────────────────────────────────────────────────────────────

/// Write `header` then every record, in order, to a fresh CSV file at `path`.
///
/// The file is created or truncated. Each record is echoed to stdout as it is
/// written. The writer is flushed before returning and dropped on every path,
/// so a failed run never leaves the handle open.
pub fn write_all(path: &Path, header: &[&str], records: &[Record]) -> Result<usize, ScrapeError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| ScrapeError::sink(path, e))?;

    writer.write_record(header).map_err(|e| ScrapeError::sink(path, e))?;

    for record in records {
        writer
            .write_record(record.to_row())
            .map_err(|e| ScrapeError::sink(path, e))?;
        println!("{}", record.summary_line());
    }

    writer.flush().map_err(|e| ScrapeError::sink(path, e))?;

    info!("Wrote {} records to {:?}", records.len(), path);
    Ok(records.len())
}
