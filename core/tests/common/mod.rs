//! Shared test fixtures.

#![allow(dead_code)]

use planner_core::{
    backend::SaveBackend,
    error::{EditorError, EditorResult},
    save::{SaveDescriptor, SaveDocument},
    store::SaveStore,
};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Every backend call, in the order it was made.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Fetch,
    Create,
    Export(String),
    Delete(String),
    Get(String),
    Update(String, SaveDocument),
    Rename(String, String),
    Window(Option<String>),
}

/// In-memory backend that records calls and can be told to fail.
#[derive(Default)]
pub struct RecordingBackend {
    pub calls:      RefCell<Vec<Call>>,
    pub saves:      RefCell<BTreeMap<String, (SaveDescriptor, SaveDocument)>>,
    pub fail_next:  RefCell<Option<String>>,
    pub fail_fetch: Cell<bool>,
    clock:          Cell<i64>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend pre-populated with `names`, created one millisecond apart.
    pub fn with_saves(names: &[&str]) -> Self {
        let backend = Self::new();
        for name in names {
            backend.insert(name, SaveDocument::default());
        }
        backend
    }

    pub fn insert(&self, name: &str, document: SaveDocument) {
        let now = self.tick();
        let descriptor = SaveDescriptor { name: name.to_string(), created: now, modified: now };
        self.saves.borrow_mut().insert(name.to_string(), (descriptor, document));
    }

    /// Make the next failable call return an error with `message`.
    pub fn fail_with(&self, message: &str) {
        *self.fail_next.borrow_mut() = Some(message.to_string());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn updates(&self) -> Vec<(String, SaveDocument)> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::Update(name, doc) => Some((name.clone(), doc.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    fn tick(&self) -> i64 {
        self.clock.set(self.clock.get() + 1);
        self.clock.get()
    }

    fn record(&self, call: Call) -> EditorResult<()> {
        self.calls.borrow_mut().push(call);
        match self.fail_next.borrow_mut().take() {
            Some(message) => Err(EditorError::Other(anyhow::anyhow!(message))),
            None => Ok(()),
        }
    }

    fn missing(name: &str) -> EditorError {
        EditorError::SaveNotFound { name: name.to_string() }
    }
}

impl SaveBackend for RecordingBackend {
    fn fetch_saves(&self) -> EditorResult<Vec<SaveDescriptor>> {
        self.record(Call::Fetch)?;
        if self.fail_fetch.get() {
            return Err(EditorError::Other(anyhow::anyhow!("backend unavailable")));
        }
        Ok(self.saves.borrow().values().map(|(d, _)| d.clone()).collect())
    }

    fn create_save(&self) -> EditorResult<()> {
        self.record(Call::Create)?;
        let name = format!("Untitled-{}", self.saves.borrow().len());
        self.insert(&name, SaveDocument::default());
        Ok(())
    }

    fn export_save(&self, name: &str) -> EditorResult<()> {
        self.record(Call::Export(name.to_string()))?;
        if !self.saves.borrow().contains_key(name) {
            return Err(Self::missing(name));
        }
        Ok(())
    }

    fn delete_save(&self, name: &str) -> EditorResult<()> {
        self.record(Call::Delete(name.to_string()))?;
        self.saves.borrow_mut().remove(name).map(|_| ()).ok_or_else(|| Self::missing(name))
    }

    fn get_save(&self, name: &str) -> EditorResult<SaveDocument> {
        self.record(Call::Get(name.to_string()))?;
        self.saves
            .borrow()
            .get(name)
            .map(|(_, doc)| doc.clone())
            .ok_or_else(|| Self::missing(name))
    }

    fn update_save(&self, name: &str, document: &SaveDocument) -> EditorResult<()> {
        self.record(Call::Update(name.to_string(), document.clone()))?;
        let now = self.tick();
        let mut saves = self.saves.borrow_mut();
        let (descriptor, stored) = saves.get_mut(name).ok_or_else(|| Self::missing(name))?;
        descriptor.modified = now;
        *stored = document.clone();
        Ok(())
    }

    fn rename_save(&self, old: &str, new: &str) -> EditorResult<()> {
        self.record(Call::Rename(old.to_string(), new.to_string()))?;
        let mut saves = self.saves.borrow_mut();
        if saves.contains_key(new) {
            return Err(EditorError::DuplicateName);
        }
        let (mut descriptor, document) = saves.remove(old).ok_or_else(|| Self::missing(old))?;
        descriptor.name = new.to_string();
        saves.insert(new.to_string(), (descriptor, document));
        Ok(())
    }

    fn rename_window(&self, name: Option<&str>) -> EditorResult<()> {
        self.record(Call::Window(name.map(str::to_string)))
    }
}

/// A unique, not-yet-created export directory for one test.
pub fn export_dir(test: &str) -> PathBuf {
    std::env::temp_dir().join(format!("planner-exports-{}-{test}", std::process::id()))
}

/// Route `log` output through the test harness. Safe to call repeatedly.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn migrated_store(test: &str) -> SaveStore {
    init_logging();
    let store = SaveStore::in_memory(export_dir(test)).expect("in-memory store");
    store.migrate().expect("migration");
    store
}
