//! Prompts store for persistent prompt storage.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::MutexGuard;

use crate::error::{Result, StoreError};

/// A stored prompt record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptRecord {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Reserved column, never mutated by any operation.
    pub usage_count: i64,
    /// Reserved column, never mutated by any operation.
    pub rating: f64,
}

/// Data provided when creating a new prompt.
///
/// Emptiness of `title` and `content` is the caller's responsibility;
/// the store inserts whatever it is given.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPrompt {
    pub title: String,
    pub description: Option<String>,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
}

/// Filter options for listing prompts.
#[derive(Debug, Default, Clone)]
pub struct PromptFilter {
    /// Exact category match. `None` or the sentinel `"All"` disables the filter.
    pub category: Option<String>,
    /// Substring match against title, description, or content.
    pub search: Option<String>,
}

/// A set of optional field changes for a partial update.
///
/// A field that is `None`, an empty string, or an empty tag list is left
/// unchanged. There is deliberately no way to clear a field to empty.
#[derive(Debug, Default, Clone)]
pub struct PromptChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl PromptChanges {
    fn is_empty(&self) -> bool {
        fn blank(field: &Option<String>) -> bool {
            field.as_deref().map_or(true, str::is_empty)
        }
        blank(&self.title)
            && blank(&self.description)
            && blank(&self.content)
            && blank(&self.category)
            && self.tags.as_deref().map_or(true, |t| t.is_empty())
    }
}

/// Aggregate statistics over the prompts table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stats {
    pub total_prompts: usize,
    pub category_counts: BTreeMap<String, usize>,
    /// Prompts created within the last 7 days.
    pub recent_prompts: usize,
}

/// Prompts store with a borrowed connection.
pub struct Prompts<'db> {
    conn: MutexGuard<'db, Connection>,
}

impl<'db> Prompts<'db> {
    pub(crate) fn new(conn: MutexGuard<'db, Connection>) -> Self {
        Self { conn }
    }

    /// Insert a new prompt. The id and both timestamps are assigned by SQLite.
    pub fn add(&self, prompt: &NewPrompt) -> Result<i64> {
        let tags_json = serde_json::to_string(&prompt.tags)
            .unwrap_or_else(|_| "[]".to_string());

        self.conn.execute(
            r#"
            INSERT INTO prompts (title, description, content, category, tags)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                prompt.title,
                prompt.description,
                prompt.content,
                prompt.category,
                tags_json,
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    /// Get a prompt by id.
    pub fn get(&self, id: i64) -> Result<Option<PromptRecord>> {
        let raw = self
            .conn
            .query_row(
                "SELECT id, title, description, content, category, tags, created_at, updated_at, usage_count, rating FROM prompts WHERE id = ?1",
                params![id],
                Self::row_to_raw,
            )
            .optional()?;

        raw.map(decode_record).transpose()
    }

    /// List prompts with optional filtering, newest first.
    pub fn list(&self, filter: &PromptFilter) -> Result<Vec<PromptRecord>> {
        let mut sql = String::from(
            "SELECT id, title, description, content, category, tags, created_at, updated_at, usage_count, rating FROM prompts WHERE 1=1",
        );
        let mut param_values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref category) = filter.category {
            if category != "All" {
                sql.push_str(" AND category = ?");
                param_values.push(Box::new(category.clone()));
            }
        }

        if let Some(ref search) = filter.search {
            sql.push_str(" AND (title LIKE ? OR description LIKE ? OR content LIKE ?)");
            let pattern = format!("%{}%", search);
            param_values.push(Box::new(pattern.clone()));
            param_values.push(Box::new(pattern.clone()));
            param_values.push(Box::new(pattern));
        }

        sql.push_str(" ORDER BY created_at DESC");

        let params: Vec<&dyn rusqlite::ToSql> = param_values.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params.as_slice(), Self::row_to_raw)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(decode_record(row?)?);
        }

        Ok(records)
    }

    /// Apply a partial update. Returns whether a row matched the id.
    ///
    /// `updated_at` is refreshed whenever at least one field changes; an
    /// update with no effective changes is a no-op reporting success.
    pub fn update(&self, id: i64, changes: &PromptChanges) -> Result<bool> {
        if changes.is_empty() {
            return Ok(true);
        }

        let mut sets: Vec<&'static str> = Vec::new();
        let mut param_values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        let mut set_text = |column: &'static str, value: &Option<String>| {
            if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
                sets.push(column);
                param_values.push(Box::new(v.to_string()));
            }
        };

        set_text("title = ?", &changes.title);
        set_text("description = ?", &changes.description);
        set_text("content = ?", &changes.content);
        set_text("category = ?", &changes.category);

        if let Some(tags) = changes.tags.as_deref().filter(|t| !t.is_empty()) {
            sets.push("tags = ?");
            let tags_json =
                serde_json::to_string(tags).unwrap_or_else(|_| "[]".to_string());
            param_values.push(Box::new(tags_json));
        }

        sets.push("updated_at = CURRENT_TIMESTAMP");
        let sql = format!("UPDATE prompts SET {} WHERE id = ?", sets.join(", "));
        param_values.push(Box::new(id));

        let params: Vec<&dyn rusqlite::ToSql> = param_values.iter().map(|p| p.as_ref()).collect();
        let rows_affected = self.conn.execute(&sql, params.as_slice())?;

        Ok(rows_affected > 0)
    }

    /// Delete a prompt by id. Returns whether a row existed; deleting a
    /// missing id is not an error.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM prompts WHERE id = ?1", params![id])?;
        Ok(rows_affected > 0)
    }

    /// Aggregate counts over the whole table.
    pub fn stats(&self) -> Result<Stats> {
        let total_prompts: usize =
            self.conn
                .query_row("SELECT COUNT(*) FROM prompts", [], |row| row.get(0))?;

        let mut stmt = self
            .conn
            .prepare("SELECT category, COUNT(*) FROM prompts GROUP BY category")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, usize>(1)?))
        })?;

        let mut category_counts = BTreeMap::new();
        for row in rows {
            let (category, count) = row?;
            category_counts.insert(category, count);
        }

        let recent_prompts: usize = self.conn.query_row(
            "SELECT COUNT(*) FROM prompts WHERE created_at >= datetime('now', '-7 days')",
            [],
            |row| row.get(0),
        )?;

        Ok(Stats {
            total_prompts,
            category_counts,
            recent_prompts,
        })
    }

    fn row_to_raw(row: &rusqlite::Row) -> rusqlite::Result<RawPrompt> {
        Ok(RawPrompt {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            content: row.get(3)?,
            category: row.get(4)?,
            tags: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
            usage_count: row.get(8)?,
            rating: row.get(9)?,
        })
    }
}

/// A row as stored, before the tags and timestamp columns are decoded.
struct RawPrompt {
    id: i64,
    title: String,
    description: Option<String>,
    content: String,
    category: String,
    tags: Option<String>,
    created_at: String,
    updated_at: String,
    usage_count: i64,
    rating: f64,
}

/// Decode the serialized tags and timestamp columns.
///
/// Malformed stored data surfaces as an error at read time instead of
/// silently corrupting the record.
fn decode_record(raw: RawPrompt) -> Result<PromptRecord> {
    let tags = match raw.tags.as_deref() {
        None | Some("") => Vec::new(),
        Some(json) => serde_json::from_str(json).map_err(|source| StoreError::TagData {
            id: raw.id,
            source,
        })?,
    };

    Ok(PromptRecord {
        id: raw.id,
        title: raw.title,
        description: raw.description,
        content: raw.content,
        category: raw.category,
        tags,
        created_at: parse_timestamp(raw.id, &raw.created_at)?,
        updated_at: parse_timestamp(raw.id, &raw.updated_at)?,
        usage_count: raw.usage_count,
        rating: raw.rating,
    })
}

/// Parse SQLite's `CURRENT_TIMESTAMP` text form (UTC), with RFC 3339 as a
/// fallback for rows written by other tools.
fn parse_timestamp(id: i64, value: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .map(|dt| Utc.from_utc_datetime(&dt))
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|dt| dt.with_timezone(&Utc)))
        .map_err(|_| StoreError::Timestamp {
            id,
            value: value.to_string(),
        })
}
