use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("File error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No name specified")]
    NameEmpty,

    #[error("Invalid save name '{name}': only letters, digits, '-' and '_' are allowed")]
    InvalidName { name: String },

    #[error("Another save with the same name already exists")]
    DuplicateName,

    #[error("Save '{name}' not found")]
    SaveNotFound { name: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type EditorResult<T> = Result<T, EditorError>;
