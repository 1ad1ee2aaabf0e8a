//! Application root: builds every service once and wires the shared
//! backend and error channel into them.

use crate::{
    backend::SaveBackend,
    config::EditorConfig,
    error_channel::ErrorChannel,
    power::PowerBudget,
    reference::ReferenceData,
    save::{FacilityKind, Shift},
    save_list::SaveList,
    session::{ActiveSession, LoadOutcome},
    types::Level,
    zoom::ZoomControls,
};
use std::rc::Rc;

pub struct Editor {
    pub errors:  Rc<ErrorChannel>,
    pub saves:   SaveList,
    pub session: ActiveSession,
    pub zoom:    ZoomControls,
    reference:   ReferenceData,
}

impl Editor {
    /// Fails if `config` does not validate.
    pub fn new(
        backend:   Rc<dyn SaveBackend>,
        reference: ReferenceData,
        config:    &EditorConfig,
    ) -> anyhow::Result<Self> {
        config.validate()?;
        let errors = Rc::new(ErrorChannel::new());
        Ok(Self {
            saves:   SaveList::new(Rc::clone(&backend), Rc::clone(&errors)),
            session: ActiveSession::new(backend, Rc::clone(&errors)),
            zoom:    ZoomControls::new(&config.zoom),
            errors,
            reference,
        })
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    /// Open save `name` in the editor.
    pub fn open(&mut self, name: &str) -> LoadOutcome {
        self.session.load(name)
    }

    /// Rename a save, keeping the session attached if it is the open one.
    pub fn rename_save(&mut self, old: &str, new: &str) {
        if self.session.name() == Some(old) {
            if self.session.rename(new) {
                self.saves.load();
            }
        } else {
            self.saves.rename(old, new);
        }
    }

    /// Delete a save. The open save is closed only once the delete succeeds.
    pub fn delete_save(&mut self, name: &str) {
        if self.saves.delete(name) && self.session.name() == Some(name) {
            self.session.close();
        }
    }

    /// Power budget of the open document, if any.
    pub fn power_budget(&self) -> Option<PowerBudget> {
        self.session.power_budget(&self.reference)
    }

    /// Set a facility's level in the open document. Levels beyond the
    /// reference curve are rejected, as are downgrades that would leave
    /// more shifts running at once than the new level holds. Level 0
    /// demolishes the room and drops its shifts.
    pub fn set_level(&mut self, kind: FacilityKind, index: usize, level: Level) -> bool {
        if let Some(max) = self.reference.max_level(kind) {
            if level > max {
                log::debug!("Rejected {} level {level}: maximum is {max}", kind.as_str());
                return false;
            }
        }
        let Some(layout) = self.session.document().map(|doc| &doc.layout) else {
            return false;
        };
        if !layout.can_set_level(kind, index) {
            return false;
        }
        if level > 0 {
            let capacity = self.reference.capacity_at(kind, level);
            if let Some(facility) = layout.facility(kind, index) {
                if !facility.fits_capacity(capacity) {
                    log::debug!(
                        "Rejected {} #{index} level {level}: shifts exceed capacity {capacity}",
                        kind.as_str()
                    );
                    return false;
                }
            }
        }
        self.session.update(|doc| {
            doc.layout.set_level(kind, index, level);
        })
    }

    /// Assign a shift in the open document if the facility has capacity
    /// for it at its current level.
    pub fn add_shift(&mut self, kind: FacilityKind, index: usize, shift: Shift) -> bool {
        let Some(facility) = self
            .session
            .document()
            .and_then(|doc| doc.layout.facility(kind, index))
        else {
            return false;
        };
        let capacity = self.reference.capacity_at(kind, facility.level);
        if !facility.can_add_shift(&shift, capacity) {
            return false;
        }
        self.session.update(|doc| {
            if let Some(facility) = doc.layout.facility_mut(kind, index) {
                facility.add_shift(shift, capacity);
            }
        })
    }
}
