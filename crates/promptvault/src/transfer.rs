//! JSON export and import of the prompt library.
//!
//! Export writes a pretty-printed array of all persisted fields. Import
//! accepts the same shape and inserts every record as a new row with a
//! fresh id and fresh timestamps; there is no deduplication.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Deserialize;

use promptvault_db::{Database, NewPrompt, PromptFilter};

/// A prompt as read from an import file.
///
/// id, timestamps, usage_count, and rating are ignored if present; they
/// are reassigned on insert.
#[derive(Debug, Deserialize)]
pub struct ImportedPrompt {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub content: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default, deserialize_with = "tags_compat")]
    pub tags: Vec<String>,
}

fn default_category() -> String {
    "General".to_string()
}

/// Accept tags either as an array of strings or as the legacy
/// string-encoded JSON array that raw column exports produced.
fn tags_compat<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TagsRepr {
        List(Vec<String>),
        Encoded(String),
    }

    match Option::<TagsRepr>::deserialize(deserializer)? {
        None => Ok(Vec::new()),
        Some(TagsRepr::List(tags)) => Ok(tags),
        Some(TagsRepr::Encoded(raw)) if raw.trim().is_empty() => Ok(Vec::new()),
        Some(TagsRepr::Encoded(raw)) => {
            serde_json::from_str(&raw).map_err(serde::de::Error::custom)
        }
    }
}

/// Default export filename, stamped with the current local time.
pub fn default_export_path() -> PathBuf {
    PathBuf::from(format!(
        "prompts_export_{}.json",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    ))
}

/// Export every prompt to `path` as a pretty-printed JSON array.
pub fn export_to_file(db: &Database, path: &Path) -> Result<usize> {
    let prompts = db.prompts().list(&PromptFilter::default())?;
    let json = serde_json::to_string_pretty(&prompts)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(prompts.len())
}

/// Parse an import file into prompt records.
pub fn read_import_file(path: &Path) -> Result<Vec<ImportedPrompt>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let prompts: Vec<ImportedPrompt> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(prompts)
}

/// Insert every imported record as a new prompt. Returns the number inserted.
pub fn import_records(db: &Database, records: Vec<ImportedPrompt>) -> Result<usize> {
    let store = db.prompts();
    let mut inserted = 0;
    for record in records {
        store.add(&NewPrompt {
            title: record.title,
            description: record.description,
            content: record.content,
            category: record.category,
            tags: record.tags,
        })?;
        inserted += 1;
    }
    Ok(inserted)
}

pub fn handle_export(db: &Database, out: Option<PathBuf>) -> Result<()> {
    let path = out.unwrap_or_else(default_export_path);
    let count = export_to_file(db, &path)?;
    println!(
        "{} Exported {} prompts to {}",
        "✓".bright_green(),
        count,
        path.display().to_string().bold()
    );
    Ok(())
}

pub fn handle_import(db: &Database, file: PathBuf, dry_run: bool) -> Result<()> {
    let records = read_import_file(&file)?;

    if dry_run {
        println!("Ready to import {} prompts", records.len());
        return Ok(());
    }

    let inserted = import_records(db, records)?;
    println!(
        "{} Imported {} prompts from {}",
        "✓".bright_green(),
        inserted,
        file.display().to_string().bold()
    );
    Ok(())
}
