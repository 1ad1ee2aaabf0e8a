//! Shared primitive types used across the editor core.

/// The unique, user-visible name of a persisted save.
pub type SaveName = String;

/// Milliseconds since the Unix epoch.
pub type Timestamp = i64;

/// A facility level. Level 0 means "not yet built".
pub type Level = u8;
