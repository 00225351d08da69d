//! Cache directory entries
//!
//! Walks the `corpora` tree and describes every `<unit>_<fp>` directory
//! found in it. Read-only: nothing here creates or removes directories.

use crate::error::{BenchError, BenchResult};
use crate::settings::SETTINGS_RECORD;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Unit names that own cache directories, outermost first
pub const UNIT_NAMES: [&str; 3] = ["corpus", "stm", "plot"];

/// Format bytes as human-readable size (e.g., "1.5 MB")
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Split a directory name into unit name and 64-char hex fingerprint
pub fn parse_dir_name(name: &str) -> Option<(&'static str, &str)> {
    let (unit, hex) = name.rsplit_once('_')?;
    let unit = UNIT_NAMES.iter().find(|u| **u == unit)?;
    let valid = hex.len() == 64 && hex.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
    valid.then_some((*unit, hex))
}

/// Whether a cache directory carries its settings record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryState {
    Recorded,
    /// Directory created but never recorded (interrupted first use)
    Incomplete,
}

impl fmt::Display for EntryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recorded => write!(f, "recorded"),
            Self::Incomplete => write!(f, "incomplete"),
        }
    }
}

/// One unit cache directory
#[derive(Debug, Clone, Serialize)]
pub struct CacheEntry {
    pub unit: &'static str,
    pub fingerprint: String,
    pub path: PathBuf,
    /// Nesting level: 0 for corpus, 1 for stm, 2 for plot
    pub depth: usize,
    pub state: EntryState,
    pub created_at: Option<DateTime<Utc>>,
    /// Artifact file names, sorted
    pub artifacts: Vec<String>,
    /// Total size of the artifacts in this directory
    pub size_bytes: u64,
}

impl CacheEntry {
    /// Fingerprint prefix for display
    pub fn short_fingerprint(&self) -> &str {
        &self.fingerprint[..12.min(self.fingerprint.len())]
    }
}

/// Scan a cache root for unit directories, depth first in name order
pub async fn scan(root: &Path) -> BenchResult<Vec<CacheEntry>> {
    let mut entries = Vec::new();
    if !fs::try_exists(root)
        .await
        .map_err(|e| BenchError::io(format!("checking {}", root.display()), e))?
    {
        return Ok(entries);
    }

    let mut stack: Vec<(PathBuf, usize)> = vec![(root.to_path_buf(), 0)];
    while let Some((dir, depth)) = stack.pop() {
        for (name, path) in unit_directories(&dir).await? {
            let Some((unit, hex)) = parse_dir_name(&name) else {
                continue;
            };
            let entry = describe(unit, hex, &path, depth).await?;
            stack.push((path, depth + 1));
            entries.push(entry);
        }
    }

    entries.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(entries)
}

async fn unit_directories(dir: &Path) -> BenchResult<Vec<(String, PathBuf)>> {
    let read_err = |e: std::io::Error| BenchError::io(format!("reading {}", dir.display()), e);
    let mut reader = fs::read_dir(dir).await.map_err(read_err)?;
    let mut found = Vec::new();
    while let Some(entry) = reader.next_entry().await.map_err(read_err)? {
        let file_type = entry.file_type().await.map_err(read_err)?;
        if file_type.is_dir() {
            found.push((entry.file_name().to_string_lossy().into_owned(), entry.path()));
        }
    }
    Ok(found)
}

async fn describe(unit: &'static str, hex: &str, path: &Path, depth: usize) -> BenchResult<CacheEntry> {
    let read_err = |e: std::io::Error| BenchError::io(format!("reading {}", path.display()), e);

    let metadata = fs::metadata(path).await.map_err(read_err)?;
    let created_at = metadata
        .created()
        .or_else(|_| metadata.modified())
        .ok()
        .map(DateTime::<Utc>::from);

    let mut state = EntryState::Incomplete;
    let mut artifacts = Vec::new();
    let mut size_bytes = 0;

    let mut reader = fs::read_dir(path).await.map_err(read_err)?;
    while let Some(entry) = reader.next_entry().await.map_err(read_err)? {
        let name = entry.file_name().to_string_lossy().into_owned();
        let meta = entry.metadata().await.map_err(read_err)?;
        if !meta.is_file() {
            continue;
        }
        if name == SETTINGS_RECORD {
            state = EntryState::Recorded;
        } else if !name.starts_with('.') {
            size_bytes += meta.len();
            artifacts.push(name);
        }
    }
    artifacts.sort();

    Ok(CacheEntry {
        unit,
        fingerprint: hex.to_string(),
        path: path.to_path_buf(),
        depth,
        state,
        created_at,
        artifacts,
        size_bytes,
    })
}
