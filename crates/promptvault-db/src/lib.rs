//! Storage layer for promptvault.
//!
//! Provides a unified `Database` struct that owns the SQLite connection
//! and provides access to domain-specific stores.

mod categories;
mod error;
mod prompts;

pub use categories::{Categories, CategoryRecord};
pub use error::{Result, StoreError};
pub use prompts::{NewPrompt, PromptChanges, PromptFilter, PromptRecord, Prompts, Stats};

use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;

/// Default database file name, kept for compatibility with existing data files.
pub const DEFAULT_DB_FILE: &str = "prompts.db";

/// The six categories seeded at first initialization.
const DEFAULT_CATEGORIES: &[(&str, &str, &str)] = &[
    ("General", "General purpose prompts", "#6366f1"),
    ("Creative Writing", "Creative and storytelling prompts", "#8b5cf6"),
    ("Code Generation", "Programming and development prompts", "#10b981"),
    ("Analysis", "Data analysis and research prompts", "#f59e0b"),
    (
        "Security",
        "Cybersecurity and penetration testing prompts",
        "#ef4444",
    ),
    ("Business", "Business and professional prompts", "#06b6d4"),
];

/// The main database struct that owns the SQLite connection.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create the database at the default location (`./prompts.db`).
    pub fn open() -> Result<Self> {
        Self::open_at(Path::new(DEFAULT_DB_FILE))
    }

    /// Open or create a database at a specific path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (useful for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Access the prompts store.
    pub fn prompts(&self) -> Prompts<'_> {
        let conn = self.conn.lock().expect("Database lock poisoned");
        Prompts::new(conn)
    }

    /// Access the categories store.
    pub fn categories(&self) -> Categories<'_> {
        let conn = self.conn.lock().expect("Database lock poisoned");
        Categories::new(conn)
    }

    /// Initialize the database schema and seed the default categories.
    ///
    /// Idempotent: tables are created if missing and seeding never
    /// overwrites an existing category's description or color.
    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS prompts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT,
                content TEXT NOT NULL,
                category TEXT NOT NULL,
                tags TEXT,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                usage_count INTEGER DEFAULT 0,
                rating REAL DEFAULT 0.0
            );

            CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT UNIQUE NOT NULL,
                description TEXT,
                color TEXT DEFAULT '#6366f1'
            );
            "#,
        )?;

        let mut stmt = conn.prepare(
            "INSERT OR IGNORE INTO categories (name, description, color) VALUES (?1, ?2, ?3)",
        )?;
        for (name, description, color) in DEFAULT_CATEGORIES {
            stmt.execute(rusqlite::params![name, description, color])?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(title: &str, content: &str, category: &str) -> NewPrompt {
        NewPrompt {
            title: title.to_string(),
            description: Some(format!("{} description", title)),
            content: content.to_string(),
            category: category.to_string(),
            tags: vec!["alpha".to_string(), "beta".to_string()],
        }
    }

    #[test]
    fn test_add_and_list() {
        let db = Database::open_in_memory().unwrap();

        let id1 = db
            .prompts()
            .add(&sample("Summarizer", "Summarize this text", "General"))
            .unwrap();
        let id2 = db
            .prompts()
            .add(&sample("Refactorer", "Refactor this code", "Code Generation"))
            .unwrap();
        assert_ne!(id1, id2);

        let all = db.prompts().list(&PromptFilter::default()).unwrap();
        assert_eq!(all.len(), 2);

        let rec = all.iter().find(|p| p.id == id1).unwrap();
        assert_eq!(rec.title, "Summarizer");
        assert_eq!(rec.description.as_deref(), Some("Summarizer description"));
        assert_eq!(rec.content, "Summarize this text");
        assert_eq!(rec.category, "General");
        assert_eq!(rec.tags, vec!["alpha", "beta"]);
        assert_eq!(rec.usage_count, 0);
        assert_eq!(rec.rating, 0.0);
        assert!(rec.updated_at >= rec.created_at);
    }

    #[test]
    fn test_category_filter_and_all_sentinel() {
        let db = Database::open_in_memory().unwrap();
        db.prompts()
            .add(&sample("One", "first", "General"))
            .unwrap();
        db.prompts()
            .add(&sample("Two", "second", "Analysis"))
            .unwrap();

        let filtered = db
            .prompts()
            .list(&PromptFilter {
                category: Some("Analysis".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].title, "Two");

        // "All" behaves the same as no category filter
        let all_sentinel = db
            .prompts()
            .list(&PromptFilter {
                category: Some("All".to_string()),
                ..Default::default()
            })
            .unwrap();
        let unfiltered = db.prompts().list(&PromptFilter::default()).unwrap();
        let sentinel_ids: Vec<i64> = all_sentinel.iter().map(|p| p.id).collect();
        let unfiltered_ids: Vec<i64> = unfiltered.iter().map(|p| p.id).collect();
        assert_eq!(sentinel_ids, unfiltered_ids);
        assert_eq!(unfiltered_ids.len(), 2);

        let empty = db
            .prompts()
            .list(&PromptFilter {
                category: Some("Security".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_search_matches_any_text_field() {
        let db = Database::open_in_memory().unwrap();
        db.prompts()
            .add(&NewPrompt {
                title: "foo in title".to_string(),
                description: None,
                content: "body".to_string(),
                category: "General".to_string(),
                tags: Vec::new(),
            })
            .unwrap();
        db.prompts()
            .add(&NewPrompt {
                title: "second".to_string(),
                description: Some("has foo here".to_string()),
                content: "body".to_string(),
                category: "General".to_string(),
                tags: Vec::new(),
            })
            .unwrap();
        db.prompts()
            .add(&NewPrompt {
                title: "third".to_string(),
                description: None,
                content: "content with foo".to_string(),
                category: "General".to_string(),
                tags: Vec::new(),
            })
            .unwrap();
        db.prompts()
            .add(&NewPrompt {
                title: "unrelated".to_string(),
                description: None,
                content: "nothing here".to_string(),
                category: "General".to_string(),
                tags: Vec::new(),
            })
            .unwrap();

        let found = db
            .prompts()
            .list(&PromptFilter {
                search: Some("foo".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(found.len(), 3);
        assert!(found.iter().all(|p| {
            p.title.contains("foo")
                || p.description.as_deref().is_some_and(|d| d.contains("foo"))
                || p.content.contains("foo")
        }));
    }

    #[test]
    fn test_partial_update() {
        let db = Database::open_in_memory().unwrap();
        let id = db
            .prompts()
            .add(&sample("Original", "original content", "General"))
            .unwrap();
        let before = db.prompts().get(id).unwrap().unwrap();

        let matched = db
            .prompts()
            .update(
                id,
                &PromptChanges {
                    title: Some("New Title".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(matched);

        let after = db.prompts().get(id).unwrap().unwrap();
        assert_eq!(after.title, "New Title");
        assert_eq!(after.description, before.description);
        assert_eq!(after.content, before.content);
        assert_eq!(after.category, before.category);
        assert_eq!(after.tags, before.tags);
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at >= after.created_at);
    }

    #[test]
    fn test_empty_string_field_is_no_change() {
        let db = Database::open_in_memory().unwrap();
        let id = db
            .prompts()
            .add(&sample("Keep Me", "keep content", "General"))
            .unwrap();

        let matched = db
            .prompts()
            .update(
                id,
                &PromptChanges {
                    title: Some(String::new()),
                    content: Some("changed".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(matched);

        let after = db.prompts().get(id).unwrap().unwrap();
        assert_eq!(after.title, "Keep Me");
        assert_eq!(after.content, "changed");
    }

    #[test]
    fn test_update_with_no_changes_is_noop_success() {
        let db = Database::open_in_memory().unwrap();
        let id = db
            .prompts()
            .add(&sample("Stable", "stable", "General"))
            .unwrap();
        let before = db.prompts().get(id).unwrap().unwrap();

        let matched = db.prompts().update(id, &PromptChanges::default()).unwrap();
        assert!(matched);

        let after = db.prompts().get(id).unwrap().unwrap();
        assert_eq!(after.updated_at, before.updated_at);
    }

    #[test]
    fn test_update_missing_id_reports_no_match() {
        let db = Database::open_in_memory().unwrap();
        let matched = db
            .prompts()
            .update(
                9999,
                &PromptChanges {
                    title: Some("anything".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(!matched);
    }

    #[test]
    fn test_delete_twice() {
        let db = Database::open_in_memory().unwrap();
        let id = db
            .prompts()
            .add(&sample("Doomed", "bye", "General"))
            .unwrap();

        assert!(db.prompts().delete(id).unwrap());
        let all = db.prompts().list(&PromptFilter::default()).unwrap();
        assert!(all.iter().all(|p| p.id != id));

        // Deleting a missing id is success, not an error
        assert!(!db.prompts().delete(id).unwrap());
    }

    #[test]
    fn test_stats_tracks_adds_and_deletes() {
        let db = Database::open_in_memory().unwrap();
        let id1 = db
            .prompts()
            .add(&sample("A", "a", "General"))
            .unwrap();
        db.prompts().add(&sample("B", "b", "General")).unwrap();
        db.prompts().add(&sample("C", "c", "Analysis")).unwrap();

        let stats = db.prompts().stats().unwrap();
        let all = db.prompts().list(&PromptFilter::default()).unwrap();
        assert_eq!(stats.total_prompts, all.len());
        assert_eq!(stats.category_counts.get("General"), Some(&2));
        assert_eq!(stats.category_counts.get("Analysis"), Some(&1));
        assert_eq!(stats.recent_prompts, 3);

        db.prompts().delete(id1).unwrap();
        let stats = db.prompts().stats().unwrap();
        let all = db.prompts().list(&PromptFilter::default()).unwrap();
        assert_eq!(stats.total_prompts, all.len());
        assert_eq!(stats.category_counts.get("General"), Some(&1));
    }

    #[test]
    fn test_default_categories_seeded() {
        let db = Database::open_in_memory().unwrap();
        let names = db.categories().names().unwrap();
        assert_eq!(
            names,
            vec![
                "Analysis",
                "Business",
                "Code Generation",
                "Creative Writing",
                "General",
                "Security",
            ]
        );

        let all = db.categories().all().unwrap();
        let general = all.iter().find(|c| c.name == "General").unwrap();
        assert_eq!(general.color, "#6366f1");
    }

    #[test]
    fn test_seeding_preserves_customizations_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompts.db");

        {
            let db = Database::open_at(&path).unwrap();
            assert_eq!(db.categories().names().unwrap().len(), 6);
        }

        // Customize a seeded category directly
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute(
                "UPDATE categories SET color = '#000000' WHERE name = 'General'",
                [],
            )
            .unwrap();
        }

        let db = Database::open_at(&path).unwrap();
        let all = db.categories().all().unwrap();
        assert_eq!(all.len(), 6);
        let general = all.iter().find(|c| c.name == "General").unwrap();
        assert_eq!(general.color, "#000000");
    }

    #[test]
    fn test_malformed_tags_surface_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompts.db");

        let db = Database::open_at(&path).unwrap();
        let id = db
            .prompts()
            .add(&sample("Broken", "broken tags", "General"))
            .unwrap();

        {
            let conn = Connection::open(&path).unwrap();
            conn.execute(
                "UPDATE prompts SET tags = 'not json' WHERE id = ?1",
                rusqlite::params![id],
            )
            .unwrap();
        }

        let db = Database::open_at(&path).unwrap();
        let err = db.prompts().get(id).unwrap_err();
        assert!(matches!(err, StoreError::TagData { id: bad, .. } if bad == id));
    }

    #[test]
    fn test_malformed_timestamp_surfaces_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompts.db");

        let db = Database::open_at(&path).unwrap();
        let id = db
            .prompts()
            .add(&sample("Broken", "broken timestamp", "General"))
            .unwrap();

        {
            let conn = Connection::open(&path).unwrap();
            conn.execute(
                "UPDATE prompts SET created_at = 'garbage' WHERE id = ?1",
                rusqlite::params![id],
            )
            .unwrap();
        }

        let db = Database::open_at(&path).unwrap();
        let err = db.prompts().get(id).unwrap_err();
        assert!(matches!(err, StoreError::Timestamp { id: bad, .. } if bad == id));

        let err = db.prompts().list(&PromptFilter::default()).unwrap_err();
        assert!(matches!(err, StoreError::Timestamp { .. }));
    }

    #[test]
    fn test_rfc3339_timestamps_still_decode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompts.db");

        let db = Database::open_at(&path).unwrap();
        let id = db
            .prompts()
            .add(&sample("External", "written by another tool", "General"))
            .unwrap();

        {
            let conn = Connection::open(&path).unwrap();
            conn.execute(
                "UPDATE prompts SET created_at = '2024-03-01T12:00:00+00:00' WHERE id = ?1",
                rusqlite::params![id],
            )
            .unwrap();
        }

        let db = Database::open_at(&path).unwrap();
        let rec = db.prompts().get(id).unwrap().unwrap();
        assert_eq!(
            rec.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            "2024-03-01 12:00:00"
        );
    }
}
