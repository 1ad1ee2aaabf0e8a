//! Client-side state core of the base-layout save editor.
//!
//! Services are built once by `Editor` and share the backend and the
//! error channel through `Rc` handles. Everything runs on the UI thread.

pub mod backend;
pub mod config;
pub mod editor;
pub mod error;
pub mod error_channel;
pub mod power;
pub mod reference;
pub mod save;
pub mod save_list;
pub mod session;
pub mod store;
pub mod types;
pub mod zoom;
