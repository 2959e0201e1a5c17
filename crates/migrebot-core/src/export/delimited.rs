//! Comma-separated export.

use super::{entry_row, ExportError, ExportResult, EXPORT_HEADERS};
use crate::models::Entry;

/// Encode entries as UTF-8 CSV with a header row.
///
/// Records end with CRLF. Fields are quoted only when they contain a comma,
/// a quote or a line break.
pub fn build_csv(entries: &[Entry]) -> ExportResult<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(Vec::new());

    writer.write_record(EXPORT_HEADERS)?;
    for entry in entries {
        writer.write_record(entry_row(entry))?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))
}
