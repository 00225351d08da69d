//! Cache command - inspect the settings-addressed cache tree

use crate::cache::{format_bytes, scan, CacheEntry, EntryState};
use crate::cli::args::{CacheAction, CacheArgs, OutputFormat};
use crate::config::Config;
use crate::error::BenchResult;
use console::style;

/// Execute the cache command
pub async fn execute(args: CacheArgs, config: &Config) -> BenchResult<()> {
    match args.action {
        CacheAction::List { format } => list_entries(config, format).await,
    }
}

/// List every unit directory under the cache root
async fn list_entries(config: &Config, format: OutputFormat) -> BenchResult<()> {
    let root = config.data.corpora_dir();
    let entries = scan(&root).await?;

    if entries.is_empty() && !matches!(format, OutputFormat::Json) {
        println!("No cache directories found under {}.", root.display());
        return Ok(());
    }

    match format {
        OutputFormat::Table => print_table(&entries),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Plain => print_plain(&entries),
    }

    Ok(())
}

fn print_table(entries: &[CacheEntry]) {
    println!(
        "{:<22} {:<12} {:<10} {:<17} {:>9}  {}",
        "UNIT", "FINGERPRINT", "STATE", "CREATED", "SIZE", "ARTIFACTS"
    );
    println!("{}", "-".repeat(90));

    for entry in entries {
        let unit = format!("{}{}", "  ".repeat(entry.depth), entry.unit);
        // pad before styling so escape codes don't break alignment
        let state = format!("{:<10}", entry.state.to_string());
        let state = match entry.state {
            EntryState::Recorded => style(state).green().to_string(),
            EntryState::Incomplete => style(state).yellow().to_string(),
        };
        let created = entry
            .created_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        let artifacts = if entry.artifacts.is_empty() {
            "-".to_string()
        } else {
            entry.artifacts.join(", ")
        };

        println!(
            "{:<22} {:<12} {} {:<17} {:>9}  {}",
            unit,
            entry.short_fingerprint(),
            state,
            created,
            format_bytes(entry.size_bytes),
            artifacts
        );
    }

    let total: u64 = entries.iter().map(|e| e.size_bytes).sum();
    println!();
    println!(
        "Total: {} director{}, {}",
        entries.len(),
        if entries.len() == 1 { "y" } else { "ies" },
        format_bytes(total)
    );
}

fn print_plain(entries: &[CacheEntry]) {
    for entry in entries {
        println!("{}", entry.path.display());
    }
}
