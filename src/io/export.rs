//! CSV export for stored consumption history.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::store::ConsumptionRow;

/// Column header of the downloadable usage report.
pub const HEADER: [&str; 3] = ["Appliance", "Quantity", "Power (Wh)"];

/// Suggested file name for browser downloads.
pub const REPORT_FILE_NAME: &str = "usage_report.csv";

/// Exports consumption rows to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(rows: &[ConsumptionRow], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(rows, buf)
}

/// Writes consumption rows as CSV to any writer.
///
/// One header row, then one row per record in the given order. Energy values
/// are written with four decimals so output is deterministic.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(rows: &[ConsumptionRow], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER)?;
    for r in rows {
        wtr.write_record(&[
            r.appliance.clone(),
            r.quantity.to_string(),
            format!("{:.4}", r.share_kwh),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Renders consumption rows as an in-memory CSV document.
///
/// # Errors
///
/// Returns an `io::Error` if the CSV writer fails.
pub fn to_csv_string(rows: &[ConsumptionRow]) -> io::Result<String> {
    let mut buf = Vec::new();
    write_csv(rows, &mut buf)?;
    String::from_utf8(buf).map_err(io::Error::other)
}
