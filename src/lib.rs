//! State and persistence core for an offline folder-based memo app.
//!
//! Folders own ordered lists of note ids; notes carry rich-text content, an
//! optional image attachment, a pin flag, and timestamps. Everything persists
//! to a string-valued key-value medium and is restored on load. Rendering,
//! rich-text editing, and layout belong to the embedding application; this
//! crate only exposes the state, the queries, and the seams the UI needs
//! (a confirmation hook for deletes, a pure `visible_notes()` view).

pub mod app;
pub mod image;
pub mod model;
pub mod search;
pub mod storage;
pub mod store;

pub use app::{AlwaysConfirm, ConfirmAction, MemoApp};
pub use model::{Folder, Note, StoreData};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use store::{NoteStore, DEFAULT_FOLDER_NAME};
