use thiserror::Error;

/// Errors surfaced by the storage layer.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Malformed tag data for prompt {id}: {source}")]
    TagData {
        id: i64,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed timestamp for prompt {id}: {value:?}")]
    Timestamp { id: i64, value: String },
}

pub type Result<T> = std::result::Result<T, StoreError>;
