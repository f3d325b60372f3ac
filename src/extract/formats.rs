// Per-format parsers. Each returns the body text without the type heading.

use std::fs;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use docx_rust::document::BodyContent;
use docx_rust::DocxFile;
use lopdf::Document;

use super::table::TextTable;
use super::{ExtractionError, FileKind};

/// Parse `path` as `kind`. Archives are handled by the walker, not here.
pub fn parse(kind: FileKind, path: &Path) -> Result<String, ExtractionError> {
    match kind {
        FileKind::Csv => csv_table(path),
        FileKind::Text | FileKind::Markdown | FileKind::Unknown => read_text(path),
        FileKind::Docx => docx_paragraphs(path),
        FileKind::Spreadsheet => spreadsheet_sheets(path),
        FileKind::Pdf => pdf_pages(path),
        FileKind::Json => json_pretty(path),
        FileKind::Archive => Err(ExtractionError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "archives must be expanded before parsing",
        ))),
    }
}

/// Keep only the valid UTF-8 runs of `bytes`
pub fn decode_utf8_dropping_invalid(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}

pub fn read_text(path: &Path) -> Result<String, ExtractionError> {
    let bytes = fs::read(path)?;
    Ok(decode_utf8_dropping_invalid(&bytes))
}

/// First record is the header, rows get a 0-based index column
pub fn csv_table(path: &Path) -> Result<String, ExtractionError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
    if headers.is_empty() {
        return Err(ExtractionError::EmptyCsv);
    }

    let width = headers.len();
    let mut rows: Vec<Vec<Option<String>>> = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let mut row: Vec<Option<String>> = record
            .iter()
            .map(|v| (!v.is_empty()).then(|| v.to_string()))
            .collect();
        if row.len() < width {
            row.resize(width, None);
        }
        rows.push(row);
    }

    for col in 0..width {
        if is_float_column(&rows, col) {
            for cell in rows.iter_mut().filter_map(|row| row.get_mut(col)).flatten() {
                if cell.parse::<i64>().is_ok() {
                    cell.push_str(".0");
                }
            }
        }
    }

    let mut table = TextTable::new().with_header(headers).with_index();
    for row in rows {
        table.push_row(
            row.into_iter()
                .map(|cell| cell.unwrap_or_else(|| "NaN".to_string()))
                .collect(),
        );
    }
    Ok(table.render())
}

/// A numeric column is read as floats once it has a gap or a fractional
/// value, so its whole numbers print as "91.0"
fn is_float_column(rows: &[Vec<Option<String>>], col: usize) -> bool {
    let cells: Vec<Option<&str>> = rows
        .iter()
        .map(|row| row.get(col).and_then(|cell| cell.as_deref()))
        .collect();
    let present: Vec<&str> = cells.iter().flatten().copied().collect();

    let numeric = !present.is_empty() && present.iter().all(|v| v.parse::<f64>().is_ok());
    let has_gap = present.len() < cells.len();
    let has_fraction = present.iter().any(|v| v.parse::<i64>().is_err());
    numeric && (has_gap || has_fraction)
}

/// Body paragraphs in document order, one per line
pub fn docx_paragraphs(path: &Path) -> Result<String, ExtractionError> {
    let file = DocxFile::from_file(path).map_err(|e| ExtractionError::Docx(e.to_string()))?;
    let docx = file.parse().map_err(|e| ExtractionError::Docx(e.to_string()))?;

    let paragraphs: Vec<String> = docx
        .document
        .body
        .content
        .iter()
        .filter_map(|content| match content {
            BodyContent::Paragraph(paragraph) => {
                let mut text = String::new();
                for run in paragraph.iter_text() {
                    text.push_str(run);
                }
                Some(text)
            }
            _ => None,
        })
        .collect();

    Ok(paragraphs.join("\n"))
}

/// "Sheet: <name>" followed by every cell from A1, no header and no index
pub fn spreadsheet_sheets(path: &Path) -> Result<String, ExtractionError> {
    let mut workbook = open_workbook_auto(path)?;
    let mut sheets = Vec::new();

    for name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&name)?;
        let mut table = TextTable::new().with_missing("None");

        // The range begins at the first used cell, pad back to A1
        if let Some((first_row, first_col)) = range.start() {
            let first_col = first_col as usize;
            let full_width = first_col + range.width();
            for _ in 0..first_row {
                table.push_row(vec!["None".to_string(); full_width]);
            }
            for row in range.rows() {
                let mut cells = vec!["None".to_string(); first_col];
                cells.extend(row.iter().map(cell_text));
                table.push_row(cells);
            }
        }
        let body = if table.is_empty() {
            "Empty DataFrame\nColumns: []\nIndex: []".to_string()
        } else {
            table.render()
        };
        sheets.push(format!("Sheet: {}\n{}", name, body));
    }

    Ok(sheets.join("\n\n"))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => "None".to_string(),
        other => other.to_string(),
    }
}

/// "Page <n>:" followed by the page text, pages numbered from 1
pub fn pdf_pages(path: &Path) -> Result<String, ExtractionError> {
    let doc = Document::load(path)?;
    let mut pages = Vec::new();

    for number in doc.get_pages().keys() {
        let text = doc.extract_text(&[*number])?;
        pages.push(format!("Page {}:\n{}", number, text));
    }

    Ok(pages.join("\n\n"))
}

/// Re-serialise with 2-space indentation, keeping key order
pub fn json_pretty(path: &Path) -> Result<String, ExtractionError> {
    let text = read_text(path)?;
    let value: serde_json::Value = serde_json::from_str(&text)?;
    Ok(serde_json::to_string_pretty(&value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::fixtures;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, data: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, data).unwrap();
        path
    }

    #[test]
    fn test_decode_drops_invalid_sequences() {
        assert_eq!(decode_utf8_dropping_invalid(b"caf\xc3\xa9"), "café");
        assert_eq!(decode_utf8_dropping_invalid(b"\x80ok\xc3"), "ok");
    }

    #[test]
    fn test_csv_table_layout() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "scores.csv", b"name,score\nalice,91\nbob,\n");
        assert_eq!(
            csv_table(&path).unwrap(),
            "    name  score\n0  alice   91.0\n1    bob    NaN"
        );
    }

    #[test]
    fn test_csv_numeric_columns() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "mixed.csv", b"id,ratio,tag\n1,1.5,a\n2,2,\n3,0.25\n");
        assert_eq!(
            csv_table(&path).unwrap(),
            "   id  ratio  tag\n0   1    1.5    a\n1   2    2.0  NaN\n2   3   0.25  NaN"
        );
    }

    #[test]
    fn test_csv_header_only() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "empty.csv", b"a,b\n");
        assert_eq!(
            csv_table(&path).unwrap(),
            "Empty DataFrame\nColumns: [a, b]\nIndex: []"
        );
    }

    #[test]
    fn test_csv_without_columns_fails() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "blank.csv", b"");
        assert!(matches!(csv_table(&path), Err(ExtractionError::EmptyCsv)));
    }

    #[test]
    fn test_json_pretty_keeps_key_order() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "data.json", br#"{"z":1,"a":{"k":[true]}}"#);
        assert_eq!(
            json_pretty(&path).unwrap(),
            "{\n  \"z\": 1,\n  \"a\": {\n    \"k\": [\n      true\n    ]\n  }\n}"
        );
    }

    #[test]
    fn test_json_keeps_large_integers_exact() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "ids.json",
            br#"{"id": 123456789012345678901234567890, "small": 7}"#,
        );
        assert_eq!(
            json_pretty(&path).unwrap(),
            "{\n  \"id\": 123456789012345678901234567890,\n  \"small\": 7\n}"
        );
    }

    #[test]
    fn test_json_invalid_is_error() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "data.json", b"{oops");
        assert!(matches!(json_pretty(&path), Err(ExtractionError::Json(_))));
    }

    #[test]
    fn test_pdf_pages_are_numbered() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "doc.pdf", &fixtures::pdf_bytes(&["alpha", "beta", "gamma"]));
        let out = pdf_pages(&path).unwrap();
        assert!(out.starts_with("Page 1:\n"));
        assert!(out.contains("\n\nPage 2:\n"));
        assert!(out.contains("\n\nPage 3:\n"));
        assert!(!out.contains("Page 4:"));
    }

    #[test]
    fn test_spreadsheet_renders_every_sheet() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "book.xlsx", &fixtures::xlsx_bytes(dir.path()));
        let out = spreadsheet_sheets(&path).unwrap();
        assert_eq!(out, "Sheet: Scores\nalice  91\n  bob  78\n\nSheet: Notes\ncurved");
    }

    #[test]
    fn test_spreadsheet_pads_back_to_a1() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "offset.xlsx", &fixtures::xlsx_offset_bytes(dir.path()));
        let out = spreadsheet_sheets(&path).unwrap();
        assert_eq!(
            out,
            "Sheet: Offset\nNone  None  None\nNone     x  None\nNone  None     y"
        );
    }

    #[test]
    fn test_corrupt_docx_is_error() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "bad.docx", b"not a zip container");
        assert!(matches!(docx_paragraphs(&path), Err(ExtractionError::Docx(_))));
    }

    #[test]
    fn test_archive_kind_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "a.zip", b"");
        assert!(parse(FileKind::Archive, &path).is_err());
    }
}
