//! Read-only access to the paragraph store
//!
//! The store is a SQLite file with one row per paragraph. Authors and works
//! found in it become 0/1 dummy columns of the exported corpus.

use crate::config::Grouping;
use crate::error::{BenchError, BenchResult};
use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::debug;

/// One dummy column: rows whose `column` equals `value` get a 1
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub value: String,
    pub header: String,
}

/// Author and work dummies discovered in the store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Categories {
    pub authors: Vec<Category>,
    pub works: Vec<Category>,
}

impl Categories {
    /// Build headers from distinct author and work values.
    ///
    /// Authors are labelled by the part before the first `-`, works by their
    /// name with spaces replaced. Colliding headers get a numeric suffix.
    pub fn from_values(authors: &[String], works: &[String]) -> Self {
        let mut taken = HashSet::new();

        let authors = authors
            .iter()
            .map(|author| {
                let short = author.split('-').next().unwrap_or(author);
                Category {
                    value: author.clone(),
                    header: unique_header(&mut taken, &format!("auth_{}", short)),
                }
            })
            .collect();

        let works = works
            .iter()
            .map(|work| Category {
                value: work.clone(),
                header: unique_header(&mut taken, &format!("wrk_{}", work.replace(' ', "_"))),
            })
            .collect();

        Self { authors, works }
    }

    pub fn author_headers(&self) -> impl Iterator<Item = &str> {
        self.authors.iter().map(|c| c.header.as_str())
    }

    pub fn work_headers(&self) -> impl Iterator<Item = &str> {
        self.works.iter().map(|c| c.header.as_str())
    }
}

fn unique_header(taken: &mut HashSet<String>, raw: &str) -> String {
    let base = raw.replace('-', "_");
    let mut header = base.clone();
    let mut n = 2;
    while !taken.insert(header.clone()) {
        header = format!("{}_{}", base, n);
        n += 1;
    }
    header
}

/// Rows produced by the export query
#[derive(Debug, Clone, Default)]
pub struct ExportTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// Handle on the SQLite paragraph store
#[derive(Debug, Clone)]
pub struct CorpusStore {
    path: PathBuf,
    table: String,
}

impl CorpusStore {
    /// Point at a database file; fails if the table name is not a plain identifier
    pub fn new(path: impl Into<PathBuf>, table: impl Into<String>) -> BenchResult<Self> {
        let table = table.into();
        if table.is_empty() || !table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(BenchError::ConfigInvalid {
                path: PathBuf::from("[data] table"),
                reason: format!("'{}' is not a plain table name", table),
            });
        }
        Ok(Self {
            path: path.into(),
            table,
        })
    }

    fn open(&self) -> BenchResult<Connection> {
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(conn)
    }

    /// Discover author and work categories
    pub fn categories(&self) -> BenchResult<Categories> {
        let conn = self.open()?;
        let authors = self.distinct(&conn, "author")?;
        let works = self.distinct(&conn, "source")?;
        debug!(
            "Store has {} authors and {} works",
            authors.len(),
            works.len()
        );
        Ok(Categories::from_values(&authors, &works))
    }

    fn distinct(&self, conn: &Connection, column: &str) -> BenchResult<Vec<String>> {
        let sql = format!(
            "SELECT DISTINCT \"{column}\" FROM \"{table}\" WHERE \"{column}\" IS NOT NULL ORDER BY \"{column}\"",
            column = column,
            table = self.table
        );
        let mut stmt = conn.prepare(&sql)?;
        let values = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(values)
    }

    /// Run the export query for a grouping and text variant
    pub fn export_rows(
        &self,
        grouping: Grouping,
        lemmatize: bool,
        categories: &Categories,
    ) -> BenchResult<ExportTable> {
        let (sql, params) = build_query(&self.table, grouping, lemmatize, categories);
        debug!("Export query: {}", sql);

        let conn = self.open()?;
        let mut stmt = conn.prepare(&sql)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let width = columns.len();

        let rows = stmt
            .query_map(rusqlite::params_from_iter(params.iter()), |row| {
                (0..width).map(|i| row.get::<_, Value>(i)).collect()
            })?
            .collect::<Result<Vec<Vec<Value>>, _>>()?;

        Ok(ExportTable { columns, rows })
    }
}

/// Build the grouped export query and its bound parameters.
///
/// Category values are bound, never interpolated; headers are quoted
/// identifiers.
pub fn build_query(
    table: &str,
    grouping: Grouping,
    lemmatize: bool,
    categories: &Categories,
) -> (String, Vec<String>) {
    let text_column = if lemmatize { "par_lem" } else { "par_raw" };

    let mut select = vec![format!(
        "group_concat(\"{}\", ' ') AS document",
        text_column
    )];
    let mut params = Vec::new();

    for (column, entries) in [("author", &categories.authors), ("source", &categories.works)] {
        for category in entries {
            params.push(category.value.clone());
            select.push(format!(
                "CASE WHEN \"{}\" = ?{} THEN 1 ELSE 0 END AS \"{}\"",
                column,
                params.len(),
                category.header
            ));
        }
    }

    select.push("\"letter\"".to_string());
    select.push("\"row\"".to_string());

    let sql = format!(
        "SELECT {} FROM \"{}\" GROUP BY \"{}\"",
        select.join(", "),
        table,
        grouping.group_field()
    );
    (sql, params)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    /// Create a small paragraph store for tests
    pub(crate) fn sample_store(dir: &Path) -> PathBuf {
        let path = dir.join("corpus.sqlite3");
        if path.exists() {
            return path;
        }
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE corpus_raw (
                par_id INTEGER, source TEXT, author TEXT, title TEXT,
                letter INTEGER, row INTEGER, par_raw TEXT, par_lem TEXT
            );
            INSERT INTO corpus_raw VALUES
                (1, 'De Officiis', 'cicero-m', 'Off 1', 0, 1, 'Quae cum ita sint', 'qui cum ita sum'),
                (2, 'De Officiis', 'cicero-m', 'Off 1', 0, 2, 'Et in Arcadia ego', 'et in arcadia ego'),
                (3, 'Epistulae', 'seneca', 'Ep 1', 1, 3, 'Ita fac, mi Lucili', 'ita facio meus lucilius'),
                (4, 'Epistulae', NULL, 'Ep 2', 1, 4, 'Vale 42', 'valeo num');",
        )
        .unwrap();
        path
    }

    #[test]
    fn headers_from_values() {
        let cats = Categories::from_values(
            &["cicero-m".to_string(), "seneca".to_string()],
            &["De Officiis".to_string()],
        );

        assert_eq!(cats.authors[0].header, "auth_cicero");
        assert_eq!(cats.authors[1].header, "auth_seneca");
        assert_eq!(cats.works[0].header, "wrk_De_Officiis");
        assert_eq!(cats.works[0].value, "De Officiis");
    }

    #[test]
    fn colliding_headers_are_suffixed() {
        let cats = Categories::from_values(
            &["cicero-m".to_string(), "cicero-q".to_string()],
            &["a-b".to_string()],
        );

        assert_eq!(cats.authors[0].header, "auth_cicero");
        assert_eq!(cats.authors[1].header, "auth_cicero_2");
        assert_eq!(cats.works[0].header, "wrk_a_b");
    }

    #[test]
    fn query_binds_values() {
        let cats = Categories::from_values(&["x\"; DROP".to_string()], &["w".to_string()]);
        let (sql, params) = build_query("corpus_raw", Grouping::Author, false, &cats);

        assert!(sql.starts_with("SELECT group_concat(\"par_raw\", ' ') AS document"));
        assert!(sql.contains("CASE WHEN \"author\" = ?1 THEN 1 ELSE 0 END"));
        assert!(sql.contains("CASE WHEN \"source\" = ?2 THEN 1 ELSE 0 END AS \"wrk_w\""));
        assert!(sql.ends_with("GROUP BY \"author\""));
        assert_eq!(params, vec!["x\"; DROP".to_string(), "w".to_string()]);
    }

    #[test]
    fn rejects_odd_table_names() {
        assert!(CorpusStore::new("/tmp/x.sqlite3", "corpus_raw; --").is_err());
        assert!(CorpusStore::new("/tmp/x.sqlite3", "").is_err());
    }

    #[test]
    fn discovers_categories() {
        let dir = TempDir::new().unwrap();
        let store = CorpusStore::new(sample_store(dir.path()), "corpus_raw").unwrap();

        let cats = store.categories().unwrap();

        assert_eq!(cats.author_headers().collect::<Vec<_>>(), vec!["auth_cicero", "auth_seneca"]);
        assert_eq!(
            cats.work_headers().collect::<Vec<_>>(),
            vec!["wrk_De_Officiis", "wrk_Epistulae"]
        );
    }

    #[test]
    fn exports_one_row_per_group() {
        let dir = TempDir::new().unwrap();
        let store = CorpusStore::new(sample_store(dir.path()), "corpus_raw").unwrap();
        let cats = store.categories().unwrap();

        let table = store.export_rows(Grouping::Work, true, &cats).unwrap();

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.columns[0], "document");
        assert_eq!(table.columns.last().unwrap(), "row");
        assert_eq!(table.columns.len(), 1 + 2 + 2 + 2);

        let paragraphs = store.export_rows(Grouping::Paragraph, false, &cats).unwrap();
        assert_eq!(paragraphs.rows.len(), 4);
    }

    #[test]
    fn missing_database_is_error() {
        let dir = TempDir::new().unwrap();
        let store = CorpusStore::new(dir.path().join("absent.sqlite3"), "corpus_raw").unwrap();
        assert!(matches!(store.categories(), Err(BenchError::Database(_))));
    }
}
