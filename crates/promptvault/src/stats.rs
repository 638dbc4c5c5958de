use anyhow::Result;
use colored::Colorize;

use promptvault_db::Database;

pub fn handle_stats(db: &Database, json: bool) -> Result<()> {
    let stats = db.prompts().stats()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("{}", "=== Prompt Library ===".bright_blue().bold());
    println!("{}  {}", "Total prompts:".dimmed(), stats.total_prompts);
    println!("{}  {}", "Added this week:".dimmed(), stats.recent_prompts);

    if !stats.category_counts.is_empty() {
        println!();
        println!("{}", "By category:".dimmed());
        for (category, count) in &stats.category_counts {
            println!("  {:<18} {}", category.bright_cyan(), count);
        }
    }

    Ok(())
}
