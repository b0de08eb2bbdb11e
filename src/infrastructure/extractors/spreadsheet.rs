use super::TextExtractor;
use crate::domain::document::{DocumentFormat, ExtractedText, ExtractionError};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;

/// Excel and OpenDocument spreadsheets, read cell by cell with one line per row
pub struct SpreadsheetExtractor;

impl TextExtractor for SpreadsheetExtractor {
    fn formats(&self) -> &'static [DocumentFormat] {
        &[DocumentFormat::Spreadsheet]
    }

    fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, ExtractionError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
            .map_err(|e| ExtractionError::failed("spreadsheet", e))?;

        let sheet_names = workbook.sheet_names();
        let mut sheets = Vec::with_capacity(sheet_names.len());
        let mut failures = 0;
        let mut degraded = 0;

        for name in &sheet_names {
            let range = match workbook.worksheet_range(name) {
                Ok(range) => range,
                Err(e) => {
                    tracing::warn!(sheet = %name, error = %e, "Skipping unreadable sheet");
                    failures += 1;
                    degraded += 1;
                    continue;
                }
            };

            let rows: Vec<String> = range
                .rows()
                .map(|row| {
                    row.iter()
                        .filter(|cell| !matches!(cell, Data::Empty))
                        .map(|cell| cell.to_string().trim().to_string())
                        .filter(|cell| !cell.is_empty())
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .filter(|row| !row.is_empty())
                .collect();

            if rows.is_empty() {
                degraded += 1;
            } else {
                sheets.push(rows.join("\n"));
            }
        }

        if sheets.is_empty() && failures > 0 {
            return Err(ExtractionError::failed(
                "spreadsheet",
                format!("none of the {} sheets could be read", sheet_names.len()),
            ));
        }

        ExtractedText::new(sheets.join("\n\n"), degraded)
    }
}
