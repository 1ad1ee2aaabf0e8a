//! The persistence backend seam.
//!
//! RULE: Services only reach persisted saves through this trait.
//! Every call is a complete request; callers route failures to the
//! ErrorChannel rather than propagating them.

use crate::{
    error::EditorResult,
    save::{SaveDescriptor, SaveDocument},
};

pub trait SaveBackend {
    /// Enumerate every persisted save.
    fn fetch_saves(&self) -> EditorResult<Vec<SaveDescriptor>>;

    /// Materialize a new default document under a backend-chosen name.
    fn create_save(&self) -> EditorResult<()>;

    /// Copy save `name` out of the store for sharing.
    fn export_save(&self, name: &str) -> EditorResult<()>;

    fn delete_save(&self, name: &str) -> EditorResult<()>;

    fn get_save(&self, name: &str) -> EditorResult<SaveDocument>;

    /// Overwrite the document stored under `name` and re-stamp its
    /// modification time.
    fn update_save(&self, name: &str, document: &SaveDocument) -> EditorResult<()>;

    fn rename_save(&self, old: &str, new: &str) -> EditorResult<()>;

    /// Cosmetic: retitle the host window after the active save.
    /// `None` restores the plain title. Backends without a window ignore it.
    fn rename_window(&self, _name: Option<&str>) -> EditorResult<()> {
        Ok(())
    }
}
