use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use promptvault_db::Database;

/// A category joined with its prompt count, as rendered by the CLI.
#[derive(Debug, Serialize)]
pub struct CategoryView {
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub prompt_count: usize,
}

/// All categories with their prompt counts, alphabetically sorted.
pub fn category_views(db: &Database) -> Result<Vec<CategoryView>> {
    let categories = db.categories().all()?;
    let stats = db.prompts().stats()?;

    Ok(categories
        .into_iter()
        .map(|c| {
            let prompt_count = stats.category_counts.get(&c.name).copied().unwrap_or(0);
            CategoryView {
                name: c.name,
                description: c.description,
                color: c.color,
                prompt_count,
            }
        })
        .collect())
}

pub fn handle_categories(db: &Database, json: bool) -> Result<()> {
    let views = category_views(db)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    for view in &views {
        let label = match view.prompt_count {
            1 => "1 prompt".to_string(),
            n => format!("{} prompts", n),
        };
        println!(
            "{:<18} {:<12} {}",
            view.name.bright_cyan().bold(),
            label,
            view.description.as_deref().unwrap_or("").dimmed()
        );
    }

    Ok(())
}
