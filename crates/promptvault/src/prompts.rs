use anyhow::Result;
use colored::Colorize;

use promptvault_db::{Database, NewPrompt, PromptChanges, PromptFilter, PromptRecord};

/// Split a comma-separated tag list, trimming whitespace and dropping empties.
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn handle_add(
    db: &Database,
    title: String,
    description: Option<String>,
    content: String,
    category: String,
    tags: Option<String>,
) -> Result<()> {
    // Required-field validation happens here, not in the store
    if title.trim().is_empty() || content.trim().is_empty() {
        anyhow::bail!("Title and content are required");
    }

    let prompt = NewPrompt {
        title,
        description,
        content,
        category,
        tags: tags.as_deref().map(parse_tags).unwrap_or_default(),
    };

    let id = db.prompts().add(&prompt)?;
    tracing::debug!(id, "prompt added");

    println!(
        "{} Added prompt {} ({})",
        "✓".bright_green(),
        format!("#{}", id).bold(),
        prompt.category
    );
    Ok(())
}

pub fn handle_list(
    db: &Database,
    category: Option<String>,
    search: Option<String>,
    json: bool,
) -> Result<()> {
    let filter = PromptFilter { category, search };
    let prompts = db.prompts().list(&filter)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&prompts)?);
    } else if prompts.is_empty() {
        println!("{}", "No prompts found.".dimmed());
    } else {
        print_prompts_table(&prompts);
    }

    Ok(())
}

pub fn handle_show(db: &Database, id: i64, json: bool) -> Result<()> {
    let Some(prompt) = db.prompts().get(id)? else {
        anyhow::bail!("No prompt with id {}", id);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&prompt)?);
    } else {
        print_prompt_detail(&prompt);
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn handle_update(
    db: &Database,
    id: i64,
    title: Option<String>,
    description: Option<String>,
    content: Option<String>,
    category: Option<String>,
    tags: Option<String>,
) -> Result<()> {
    let changes = PromptChanges {
        title,
        description,
        content,
        category,
        tags: tags.as_deref().map(parse_tags),
    };

    let matched = db.prompts().update(id, &changes)?;
    if !matched {
        anyhow::bail!("No prompt with id {}", id);
    }

    println!("{} Updated prompt {}", "✓".bright_green(), format!("#{}", id).bold());
    Ok(())
}

pub fn handle_delete(db: &Database, id: i64, yes: bool) -> Result<()> {
    if !yes {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(format!("Delete prompt #{}?", id))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("{}", "Aborted.".dimmed());
            return Ok(());
        }
    }

    // Deleting a missing id is not an error
    let existed = db.prompts().delete(id)?;
    if existed {
        println!("{} Deleted prompt {}", "✓".bright_green(), format!("#{}", id).bold());
    } else {
        println!("{}", format!("No prompt with id {}.", id).dimmed());
    }

    Ok(())
}

fn print_prompts_table(prompts: &[PromptRecord]) {
    println!(
        "{:<6} {:<12} {:<18} {:<24} {}",
        "ID".dimmed(),
        "CREATED".dimmed(),
        "CATEGORY".dimmed(),
        "TAGS".dimmed(),
        "TITLE".dimmed(),
    );

    for p in prompts {
        let created = p.created_at.format("%Y-%m-%d").to_string();
        let tags = if p.tags.is_empty() {
            "-".to_string()
        } else {
            p.tags.join(", ")
        };
        let tags = truncate(&tags, 22);
        let title = truncate(&p.title, 50);

        println!(
            "{:<6} {:<12} {:<18} {:<24} {}",
            p.id,
            created,
            p.category.bright_cyan(),
            tags,
            title
        );
    }
}

fn print_prompt_detail(prompt: &PromptRecord) {
    println!("{}", format!("=== {} ===", prompt.title).bright_blue().bold());
    println!("{}  {}", "ID:".dimmed(), prompt.id);
    println!("{}  {}", "Category:".dimmed(), prompt.category.bright_cyan());
    if let Some(ref description) = prompt.description {
        if !description.is_empty() {
            println!("{}  {}", "Description:".dimmed(), description);
        }
    }
    if !prompt.tags.is_empty() {
        println!("{}  {}", "Tags:".dimmed(), prompt.tags.join(", "));
    }
    println!(
        "{}  {}",
        "Created:".dimmed(),
        prompt.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!(
        "{}  {}",
        "Updated:".dimmed(),
        prompt.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!();
    println!("{}", prompt.content);
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let prefix: String = text.chars().take(max).collect();
        format!("{}...", prefix)
    } else {
        text.to_string()
    }
}
