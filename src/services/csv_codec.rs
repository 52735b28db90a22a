//! CSV rows keyed by header.
//!
//! Quoting follows RFC 4180: fields holding a comma, a quote or a line break
//! are wrapped in double quotes and inner quotes are doubled.

use csv::{ReaderBuilder, Terminator, Trim, WriterBuilder};
use indexmap::IndexMap;
use tracing::{debug, warn};

/// One data row keyed by header, in header order.
pub type CsvRow = IndexMap<String, String>;

const BOM: char = '\u{feff}';

/// Serialize rows under `headers`, one line each, joined with `\n`.
///
/// Missing cells are written empty. No rows gives an empty string.
pub fn write_csv(headers: &[String], rows: &[CsvRow]) -> csv::Result<String> {
    if rows.is_empty() {
        return Ok(String::new());
    }

    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(
            headers
                .iter()
                .map(|header| row.get(header).map(String::as_str).unwrap_or_default()),
        )?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))?;
    let mut text = String::from_utf8(bytes)
        .map_err(|err| csv::Error::from(std::io::Error::new(std::io::ErrorKind::InvalidData, err)))?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

/// Parse CSV text into rows keyed by the header cells.
///
/// Headers and cells are trimmed, blank lines and a leading BOM are ignored.
/// Rows whose field count differs from the header are skipped.
pub fn parse_csv(text: &str) -> Vec<CsvRow> {
    let text = text.strip_prefix(BOM).unwrap_or(text);
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = match reader.headers() {
        Ok(record) => record.iter().map(str::to_string).collect(),
        Err(err) => {
            warn!(error = %err, "unreadable CSV header");
            return Vec::new();
        }
    };
    if headers.is_empty() {
        return Vec::new();
    }

    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                warn!(record = index + 1, error = %err, "skipping malformed CSV record");
                continue;
            }
        };

        if record.len() != headers.len() {
            debug!(
                record = index + 1,
                expected = headers.len(),
                found = record.len(),
                "skipping CSV record with mismatched field count"
            );
            continue;
        }

        rows.push(
            headers
                .iter()
                .cloned()
                .zip(record.iter().map(str::to_string))
                .collect(),
        );
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn fields_are_quoted_only_when_needed() {
        let mut row = CsvRow::new();
        row.insert("Name".into(), "The \"Best\"".into());
        row.insert("Tags".into(), "Action, RPG".into());
        row.insert("Notes".into(), "plain".into());

        let text = write_csv(&headers(&["Name", "Tags", "Notes"]), &[row]).unwrap();
        assert_eq!(
            text,
            "Name,Tags,Notes\n\"The \"\"Best\"\"\",\"Action, RPG\",plain"
        );
    }

    #[test]
    fn quoted_cells_keep_commas_quotes_and_newlines() {
        let text = "Name,Tags\n\"Zelda, BOTW\",\"a \"\"b\"\"\nc\"\n";
        let rows = parse_csv(text);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["Name"], "Zelda, BOTW");
        assert_eq!(rows[0]["Tags"], "a \"b\"\nc");
    }

    #[test]
    fn crlf_bom_and_blank_lines_are_tolerated() {
        let text = "\u{feff}Name , Rating\r\n\r\n  Halo , 8 \r\n\r\nPortal,9.5\r\n";
        let rows = parse_csv(text);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Name"], "Halo");
        assert_eq!(rows[0]["Rating"], "8");
        assert_eq!(rows[1]["Name"], "Portal");
    }

    #[test]
    fn rows_with_wrong_field_count_are_skipped() {
        let rows = parse_csv("Name,Rating\nHalo\nPortal,9,extra\nDoom,7");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["Name"], "Doom");
    }

    #[test]
    fn header_only_or_empty_input_has_no_rows() {
        assert!(parse_csv("").is_empty());
        assert!(parse_csv("Name,Rating\n").is_empty());
    }

    #[test]
    fn written_csv_parses_back() {
        let columns = headers(&["Name", "Tags"]);
        let mut row = CsvRow::new();
        row.insert("Name".into(), "Zelda, \"BOTW\"".into());
        row.insert("Tags".into(), "Favorite, Nostalgia".into());

        let text = write_csv(&columns, &[row.clone()]).unwrap();
        assert_eq!(parse_csv(&text), vec![row]);
        assert_eq!(write_csv(&columns, &[]).unwrap(), "");
    }
}
