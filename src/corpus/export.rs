//! CSV export of the grouped corpus

use crate::corpus::store::ExportTable;
use crate::error::{BenchError, BenchResult};
use rusqlite::types::Value;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Normalize a document: lowercase, keep ASCII alphabetic runs, drop short
/// tokens and stopwords.
pub fn clean(text: &str, stopwords: &BTreeSet<String>, min_length: usize) -> String {
    let lowered = text.to_lowercase();
    lowered
        .split(|c: char| !c.is_ascii_alphabetic())
        .filter(|token| !token.is_empty())
        .filter(|token| token.len() >= min_length)
        .filter(|token| !stopwords.contains(*token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Quote a CSV field when it contains a separator, quote or line break
pub fn csv_field(raw: &str) -> String {
    if raw.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => f.to_string(),
        Value::Text(s) => s.clone(),
        Value::Blob(b) => String::from_utf8_lossy(b).into_owned(),
    }
}

/// Write `table` as CSV to `path`, cleaning the `document` column.
///
/// Fails if `path` already exists.
pub fn write_csv(
    table: &ExportTable,
    path: &Path,
    stopwords: &BTreeSet<String>,
    min_length: usize,
) -> BenchResult<usize> {
    let document_index = table.columns.iter().position(|c| c == "document");

    let file = File::options()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| BenchError::io(format!("creating {}", path.display()), e))?;
    let mut out = BufWriter::new(file);
    let write_err = |e: std::io::Error| BenchError::io(format!("writing {}", path.display()), e);

    let header: Vec<String> = table.columns.iter().map(|c| csv_field(c)).collect();
    writeln!(out, "{}", header.join(",")).map_err(write_err)?;

    for row in &table.rows {
        let fields: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, value)| {
                let text = render(value);
                if Some(i) == document_index {
                    csv_field(&clean(&text, stopwords, min_length))
                } else {
                    csv_field(&text)
                }
            })
            .collect();
        writeln!(out, "{}", fields.join(",")).map_err(write_err)?;
    }

    out.flush().map_err(write_err)?;
    Ok(table.rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn words(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn clean_lowercases_and_splits() {
        let cleaned = clean("Quae cum ita sint, Lucili! 42x", &BTreeSet::new(), 1);
        assert_eq!(cleaned, "quae cum ita sint lucili x");
    }

    #[test]
    fn clean_drops_stopwords_and_short_tokens() {
        let cleaned = clean("Et in Arcadia ego unk", &words(&["et", "unk"]), 3);
        assert_eq!(cleaned, "arcadia ego");
    }

    #[test]
    fn clean_empty() {
        assert_eq!(clean("", &BTreeSet::new(), 1), "");
        assert_eq!(clean("12, 34.", &BTreeSet::new(), 1), "");
    }

    #[test]
    fn csv_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn writes_header_and_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("corpus.csv");
        let table = ExportTable {
            columns: vec![
                "document".to_string(),
                "wrk_Epistulae".to_string(),
                "letter".to_string(),
                "row".to_string(),
            ],
            rows: vec![
                vec![
                    Value::Text("Ita fac, mi Lucili".to_string()),
                    Value::Integer(1),
                    Value::Integer(1),
                    Value::Integer(3),
                ],
                vec![Value::Null, Value::Integer(0), Value::Null, Value::Integer(4)],
            ],
        };

        let written = write_csv(&table, &path, &words(&["mi"]), 1).unwrap();

        assert_eq!(written, 2);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "document,wrk_Epistulae,letter,row\nita fac lucili,1,1,3\n,0,,4\n"
        );
    }

    #[test]
    fn refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("corpus.csv");
        std::fs::write(&path, "existing").unwrap();

        let err = write_csv(&ExportTable::default(), &path, &BTreeSet::new(), 1).unwrap_err();
        assert!(matches!(err, BenchError::Io { .. }));
    }
}
