//! Stopword lists
//!
//! The effective stopword set is the base list plus user directives: a plain
//! word adds, a word prefixed with `-` removes. Directive order does not
//! matter; removals always win over additions of the same word.

use crate::error::{BenchError, BenchResult};
use std::collections::BTreeSet;
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Placeholders the lemmatizer emits for unknown words and numbers
pub const PLACEHOLDERS: [&str; 2] = ["unk", "num"];

/// Parse a stopword file: one word per line, `#` starts a comment line
pub fn parse_list(content: &str) -> BTreeSet<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Load the base stopword set.
///
/// Without a configured file only the placeholders are used; a configured
/// file that does not exist is a missing configuration source.
pub async fn load_base(path: Option<&Path>) -> BenchResult<BTreeSet<String>> {
    let mut base: BTreeSet<String> = PLACEHOLDERS.iter().map(|s| s.to_string()).collect();

    let Some(path) = path else {
        return Ok(base);
    };

    if !path.is_file() {
        return Err(BenchError::source_missing("stopword list", path));
    }

    let content = fs::read_to_string(path)
        .await
        .map_err(|e| BenchError::io(format!("reading stopwords from {}", path.display()), e))?;
    base.extend(parse_list(&content));

    debug!("Loaded {} base stopwords from {}", base.len(), path.display());
    Ok(base)
}

/// Apply add/remove directives to a base set
pub fn normalize<S: AsRef<str>>(base: &BTreeSet<String>, directives: &[S]) -> BTreeSet<String> {
    let mut add = BTreeSet::new();
    let mut remove = BTreeSet::new();

    for directive in directives {
        let directive = directive.as_ref().trim();
        if let Some(word) = directive.strip_prefix('-') {
            let word = word.trim();
            if !word.is_empty() {
                remove.insert(word.to_string());
            }
        } else if !directive.is_empty() {
            add.insert(directive.to_string());
        }
    }

    base.union(&add)
        .filter(|word| !remove.contains(*word))
        .cloned()
        .collect()
}
