//! Categories store.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::MutexGuard;

use crate::error::Result;

/// A stored category record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub name: String,
    pub description: Option<String>,
    pub color: String,
}

/// Categories store with a borrowed connection.
pub struct Categories<'db> {
    conn: MutexGuard<'db, Connection>,
}

impl<'db> Categories<'db> {
    pub(crate) fn new(conn: MutexGuard<'db, Connection>) -> Self {
        Self { conn }
    }

    /// All category names, alphabetically sorted.
    pub fn names(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM categories ORDER BY name")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut names = Vec::new();
        for row in rows {
            names.push(row?);
        }

        Ok(names)
    }

    /// All category records, alphabetically sorted by name.
    pub fn all(&self) -> Result<Vec<CategoryRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, description, color FROM categories ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            Ok(CategoryRecord {
                name: row.get(0)?,
                description: row.get(1)?,
                color: row.get(2)?,
            })
        })?;

        let mut categories = Vec::new();
        for row in rows {
            categories.push(row?);
        }

        Ok(categories)
    }
}
