//! The active save session: the document currently open in the editor.
//!
//! STATES:
//!   Empty   → begin_load() → Loading
//!   Loading → complete_load(latest ticket) → Loaded (or back to prior state on failure)
//!   Loaded  → update() / set_document() → write-back → Loaded
//!
//! RULES:
//!   - Writes are driven by the mutation API only. Installing a freshly
//!     loaded document never writes it back.
//!   - While `loading` is latched, mutations are applied locally but never
//!     written, so the outgoing save's modified time is never re-stamped.
//!   - Only the response to the most recent begin_load() is installed.
//!     Older responses are discarded whatever order they arrive in.

use crate::{
    backend::SaveBackend,
    error::EditorResult,
    error_channel::ErrorChannel,
    power::{power_budget, PowerBudget},
    reference::ReferenceData,
    save::SaveDocument,
    types::SaveName,
};
use std::rc::Rc;

/// Issued by begin_load(); hand it back to complete_load() with the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    id:   u64,
    name: SaveName,
}

impl LoadTicket {
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The document is installed; the caller may navigate to the editor.
    Installed,
    /// A newer load was started; the response was dropped.
    Stale,
    /// The fetch failed; the error was routed and the prior state kept.
    Failed,
}

pub struct ActiveSession {
    backend:       Rc<dyn SaveBackend>,
    errors:        Rc<ErrorChannel>,
    name:          Option<SaveName>,
    document:      Option<SaveDocument>,
    loading:       bool,
    latest_ticket: u64,
}

impl ActiveSession {
    pub fn new(backend: Rc<dyn SaveBackend>, errors: Rc<ErrorChannel>) -> Self {
        Self {
            backend,
            errors,
            name:          None,
            document:      None,
            loading:       false,
            latest_ticket: 0,
        }
    }

    // ── Loading ────────────────────────────────────────────────────────

    /// Fetch and install save `name` in one step.
    pub fn load(&mut self, name: &str) -> LoadOutcome {
        let ticket = self.begin_load(name);
        let response = self.backend.get_save(name);
        self.complete_load(ticket, response)
    }

    /// Latch the load guard and issue a ticket for the pending fetch.
    pub fn begin_load(&mut self, name: &str) -> LoadTicket {
        self.latest_ticket += 1;
        self.loading = true;
        log::debug!("Loading save '{name}' (ticket {})", self.latest_ticket);
        LoadTicket { id: self.latest_ticket, name: name.to_string() }
    }

    /// Install the response to `ticket` if it is still the latest request.
    pub fn complete_load(
        &mut self,
        ticket:   LoadTicket,
        response: EditorResult<SaveDocument>,
    ) -> LoadOutcome {
        if ticket.id != self.latest_ticket {
            log::debug!(
                "Discarding stale load of '{}' (ticket {}, latest {})",
                ticket.name, ticket.id, self.latest_ticket
            );
            return LoadOutcome::Stale;
        }

        let document = match response {
            Ok(document) => document,
            Err(e) => {
                self.loading = false;
                self.errors.handle(e);
                return LoadOutcome::Failed;
            }
        };

        self.document = Some(document);
        self.name = Some(ticket.name);
        // Released only once the new document is in place.
        self.loading = false;

        if let Err(e) = self.backend.rename_window(self.name.as_deref()) {
            self.errors.handle(e);
        }
        LoadOutcome::Installed
    }

    /// Back to Empty. Pending loads are invalidated.
    pub fn close(&mut self) {
        self.latest_ticket += 1;
        self.loading = false;
        self.name = None;
        self.document = None;
        if let Err(e) = self.backend.rename_window(None) {
            self.errors.handle(e);
        }
    }

    // ── Mutation ───────────────────────────────────────────────────────

    /// Edit the open document and write it back.
    /// Returns false when no document is loaded.
    pub fn update<F>(&mut self, mutate: F) -> bool
    where
        F: FnOnce(&mut SaveDocument),
    {
        let Some(document) = self.document.as_mut() else {
            return false;
        };
        mutate(document);
        self.write_back();
        true
    }

    /// Replace the open document wholesale and write it back.
    /// Returns false when no save is loaded.
    pub fn set_document(&mut self, document: SaveDocument) -> bool {
        if self.name.is_none() {
            return false;
        }
        self.document = Some(document);
        self.write_back();
        true
    }

    /// Rename the open save, keeping the session pointed at it.
    pub fn rename(&mut self, new_name: &str) -> bool {
        let Some(old_name) = self.name.clone() else {
            return false;
        };
        if let Err(e) = self.backend.rename_save(&old_name, new_name) {
            self.errors.handle(e);
            return false;
        }
        self.name = Some(new_name.to_string());
        if let Err(e) = self.backend.rename_window(Some(new_name)) {
            self.errors.handle(e);
        }
        true
    }

    fn write_back(&self) {
        if self.loading {
            log::debug!("Write-back suppressed while a load is in progress");
            return;
        }
        let (Some(name), Some(document)) = (&self.name, &self.document) else {
            return;
        };
        if let Err(e) = self.backend.update_save(name, document) {
            self.errors.handle(e);
        }
    }

    // ── Queries ────────────────────────────────────────────────────────

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn document(&self) -> Option<&SaveDocument> {
        self.document.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_loaded(&self) -> bool {
        self.document.is_some()
    }

    pub fn power_budget(&self, reference: &ReferenceData) -> Option<PowerBudget> {
        self.document
            .as_ref()
            .map(|doc| power_budget(&doc.layout, reference))
    }
}
