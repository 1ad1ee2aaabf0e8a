//! The save list on the main menu.
//!
//! Every operation that changes the set of saves (create, export, delete,
//! rename) re-enumerates on success. Failures are routed to the
//! ErrorChannel and leave the previous list in place.

use crate::{
    backend::SaveBackend,
    error::EditorResult,
    error_channel::ErrorChannel,
    save::SaveDescriptor,
    types::Timestamp,
};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Which timestamp the list is sorted by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    #[default]
    Modified,
    Created,
}

impl SortMode {
    pub fn opposite(self) -> Self {
        match self {
            SortMode::Modified => SortMode::Created,
            SortMode::Created  => SortMode::Modified,
        }
    }

    pub fn key(self, save: &SaveDescriptor) -> Timestamp {
        match self {
            SortMode::Modified => save.modified,
            SortMode::Created  => save.created,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Increasing,
    Decreasing,
}

impl SortOrder {
    pub fn opposite(self) -> Self {
        match self {
            SortOrder::Increasing => SortOrder::Decreasing,
            SortOrder::Decreasing => SortOrder::Increasing,
        }
    }

    /// +1 for increasing, -1 for decreasing.
    pub fn direction(self) -> i64 {
        match self {
            SortOrder::Increasing => 1,
            SortOrder::Decreasing => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub mode:  SortMode,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new(mode: SortMode, order: SortOrder) -> Self {
        Self { mode, order }
    }

    /// Tooltip for the sort-mode toggle: what clicking it will do.
    pub fn next_mode_desc(&self) -> &'static str {
        match self.mode {
            SortMode::Modified => "Sort by time created",
            SortMode::Created  => "Sort by time modified",
        }
    }

    /// Tooltip for the sort-order toggle: what clicking it will do.
    pub fn next_order_desc(&self) -> &'static str {
        match self.order {
            SortOrder::Increasing => "Sort from latest to earliest",
            SortOrder::Decreasing => "Sort from earliest to latest",
        }
    }
}

/// A freshly sorted copy of `saves`. Stable: equal timestamps keep
/// their input order.
pub fn sort_descriptors(saves: &[SaveDescriptor], sort: SortSpec) -> Vec<SaveDescriptor> {
    let mut sorted = saves.to_vec();
    sorted.sort_by(|a, b| {
        let ordering = sort.mode.key(a).cmp(&sort.mode.key(b));
        match sort.order {
            SortOrder::Increasing => ordering,
            SortOrder::Decreasing => ordering.reverse(),
        }
    });
    sorted
}

/// One-shot "export succeeded" flag, shown once and dismissed by the view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportNotice {
    active: bool,
}

impl ExportNotice {
    pub fn activate(&mut self)   { self.active = true;  }
    pub fn dismiss(&mut self)    { self.active = false; }
    pub fn is_active(&self) -> bool { self.active }

    /// Read and dismiss in one step.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.active)
    }
}

pub struct SaveList {
    backend:           Rc<dyn SaveBackend>,
    errors:            Rc<ErrorChannel>,
    saves:             Vec<SaveDescriptor>,
    sort:              SortSpec,
    pub export_notice: ExportNotice,
}

impl SaveList {
    pub fn new(backend: Rc<dyn SaveBackend>, errors: Rc<ErrorChannel>) -> Self {
        Self {
            backend,
            errors,
            saves:         Vec::new(),
            sort:          SortSpec::default(),
            export_notice: ExportNotice::default(),
        }
    }

    // ── Backend operations ─────────────────────────────────────────────

    pub fn load(&mut self) {
        if let Err(e) = self.refresh() {
            self.errors.handle(e);
        }
    }

    pub fn create(&mut self) {
        let result = self.backend.create_save().and_then(|()| self.refresh());
        self.route(result);
    }

    pub fn export(&mut self, name: &str) {
        let result = self.backend.export_save(name).and_then(|()| {
            self.export_notice.activate();
            self.refresh()
        });
        self.route(result);
    }

    /// Returns whether the backend deleted the save. A failed refresh
    /// afterwards is still routed but does not undo the delete.
    pub fn delete(&mut self, name: &str) -> bool {
        if let Err(e) = self.backend.delete_save(name) {
            self.errors.handle(e);
            return false;
        }
        let result = self.refresh();
        self.route(result);
        true
    }

    pub fn rename(&mut self, old: &str, new: &str) {
        let result = self.backend.rename_save(old, new).and_then(|()| self.refresh());
        self.route(result);
    }

    // ── Sort projection ────────────────────────────────────────────────

    /// The working set in display order for the current sort.
    pub fn sorted(&self) -> Vec<SaveDescriptor> {
        sort_descriptors(&self.saves, self.sort)
    }

    /// Presentation only: no backend round-trip.
    pub fn toggle_mode(&mut self) {
        self.sort.mode = self.sort.mode.opposite();
    }

    pub fn toggle_order(&mut self) {
        self.sort.order = self.sort.order.opposite();
    }

    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    pub fn set_sort(&mut self, sort: SortSpec) {
        self.sort = sort;
    }

    /// The working set in backend enumeration order.
    pub fn saves(&self) -> &[SaveDescriptor] {
        &self.saves
    }

    pub fn contains(&self, name: &str) -> bool {
        self.saves.iter().any(|s| s.name == name)
    }

    // ── Internals ──────────────────────────────────────────────────────

    /// Replace the working set wholesale; untouched on failure.
    fn refresh(&mut self) -> EditorResult<()> {
        let saves = self.backend.fetch_saves()?;
        log::debug!("Save list refreshed: {} saves", saves.len());
        self.saves = saves;
        Ok(())
    }

    fn route(&self, result: EditorResult<()>) {
        if let Err(e) = result {
            self.errors.handle(e);
        }
    }
}
