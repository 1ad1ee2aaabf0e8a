//! SQLite persistence layer.
//!
//! RULE: Only store.rs talks to the database.
//! Services call the SaveBackend trait; they never execute SQL directly.

use crate::{
    backend::SaveBackend,
    error::{EditorError, EditorResult},
    save::{SaveDescriptor, SaveDocument},
    types::Timestamp,
};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::{
    borrow::Cow,
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

pub const DEFAULT_SAVE_NAME: &str = "Untitled";

pub struct SaveStore {
    conn:         Connection,
    export_dir:   PathBuf,
    default_name: String,
}

impl SaveStore {
    /// Open (or create) the save database at `path`.
    /// Exports are written under `export_dir`.
    pub fn open(path: &str, export_dir: impl Into<PathBuf>) -> EditorResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode: better concurrent read performance.
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        log::info!("Opened save database at {path}");
        Ok(Self::with_connection(conn, export_dir.into()))
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory(export_dir: impl Into<PathBuf>) -> EditorResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self::with_connection(conn, export_dir.into()))
    }

    fn with_connection(conn: Connection, export_dir: PathBuf) -> Self {
        Self {
            conn,
            export_dir,
            default_name: DEFAULT_SAVE_NAME.to_string(),
        }
    }

    /// Base name for saves made by create_save(). Invalid names are ignored.
    pub fn with_default_name(mut self, name: &str) -> Self {
        match validate_save_name(name) {
            Ok(name) => self.default_name = name.to_string(),
            Err(e) => log::warn!("Keeping default save name '{}': {e}", self.default_name),
        }
        self
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> EditorResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_saves.sql"))?;
        Ok(())
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// Write save `name` to the export directory without overwriting
    /// earlier exports. Returns the file written.
    pub fn export_to_file(&self, name: &str) -> EditorResult<PathBuf> {
        let data = self.raw_data(name)?;
        fs::create_dir_all(&self.export_dir)?;
        let path = available_path(&self.export_dir, name);
        fs::write(&path, data)?;
        log::info!("Exported save '{name}' to {}", path.display());
        Ok(path)
    }

    // ── Test / summary helpers ────────────────────────────────────────

    /// Number of persisted saves.
    pub fn save_count(&self) -> EditorResult<i64> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM save", [], |row| row.get(0))?;
        Ok(count)
    }

    // ── Internals ─────────────────────────────────────────────────────

    fn raw_data(&self, name: &str) -> EditorResult<String> {
        validate_save_name(name)?;
        self.conn
            .query_row(
                "SELECT data FROM save WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| EditorError::SaveNotFound { name: name.to_string() })
    }

    fn taken_names(&self) -> EditorResult<HashSet<String>> {
        let mut stmt = self.conn.prepare("SELECT name FROM save")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<HashSet<String>, _>>()?;
        Ok(names)
    }

    fn exists(&self, name: &str) -> EditorResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM save WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

impl SaveBackend for SaveStore {
    fn fetch_saves(&self) -> EditorResult<Vec<SaveDescriptor>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, created, last_modified FROM save ORDER BY rowid ASC",
        )?;
        let saves = stmt
            .query_map([], |row| {
                Ok(SaveDescriptor {
                    name:     row.get(0)?,
                    created:  row.get(1)?,
                    modified: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(saves)
    }

    fn create_save(&self) -> EditorResult<()> {
        let taken = self.taken_names()?;
        let name = available_name(&self.default_name, |candidate| !taken.contains(candidate))
            .into_owned();
        let data = serde_json::to_string(&SaveDocument::default())?;
        let now = now_millis();
        self.conn.execute(
            "INSERT INTO save (name, created, last_modified, data) VALUES (?1, ?2, ?3, ?4)",
            params![name, now, now, data],
        )?;
        log::info!("Created save '{name}'");
        Ok(())
    }

    fn export_save(&self, name: &str) -> EditorResult<()> {
        self.export_to_file(name).map(|_| ())
    }

    fn delete_save(&self, name: &str) -> EditorResult<()> {
        validate_save_name(name)?;
        let removed = self.conn.execute("DELETE FROM save WHERE name = ?1", params![name])?;
        if removed == 0 {
            return Err(EditorError::SaveNotFound { name: name.to_string() });
        }
        log::info!("Deleted save '{name}'");
        Ok(())
    }

    fn get_save(&self, name: &str) -> EditorResult<SaveDocument> {
        let data = self.raw_data(name)?;
        Ok(serde_json::from_str(&data)?)
    }

    fn update_save(&self, name: &str, document: &SaveDocument) -> EditorResult<()> {
        validate_save_name(name)?;
        let data = serde_json::to_string(document)?;
        let updated = self.conn.execute(
            "UPDATE save SET data = ?2, last_modified = ?3 WHERE name = ?1",
            params![name, data, now_millis()],
        )?;
        if updated == 0 {
            return Err(EditorError::SaveNotFound { name: name.to_string() });
        }
        log::debug!("Updated save '{name}'");
        Ok(())
    }

    fn rename_save(&self, old: &str, new: &str) -> EditorResult<()> {
        validate_save_name(old)?;
        validate_save_name(new)?;
        if old == new {
            return Ok(());
        }
        if self.exists(new)? {
            return Err(EditorError::DuplicateName);
        }
        let renamed = self.conn.execute(
            "UPDATE save SET name = ?2 WHERE name = ?1",
            params![old, new],
        )?;
        if renamed == 0 {
            return Err(EditorError::SaveNotFound { name: old.to_string() });
        }
        log::info!("Renamed save '{old}' to '{new}'");
        Ok(())
    }
}

/// Save names double as export file names: non-empty, ASCII letters,
/// digits, '-' and '_' only.
pub fn validate_save_name(name: &str) -> EditorResult<&str> {
    if name.is_empty() {
        return Err(EditorError::NameEmpty);
    }
    if name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        Ok(name)
    } else {
        Err(EditorError::InvalidName { name: name.to_string() })
    }
}

/// `name` if available, else the first available `name-1`, `name-2`, ...
pub fn available_name<F>(name: &str, is_available: F) -> Cow<'_, str>
where
    F: Fn(&str) -> bool,
{
    if is_available(name) {
        return Cow::Borrowed(name);
    }
    let mut index = 1u32;
    loop {
        let candidate = format!("{name}-{index}");
        if is_available(&candidate) {
            return Cow::Owned(candidate);
        }
        index += 1;
    }
}

fn available_path(dir: &Path, name: &str) -> PathBuf {
    let file_name = available_name(name, |candidate| {
        !dir.join(candidate).with_extension("json").is_file()
    });
    dir.join(file_name.as_ref()).with_extension("json")
}

fn now_millis() -> Timestamp {
    Utc::now().timestamp_millis()
}
