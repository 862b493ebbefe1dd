use anyhow::Result;
use std::path::Path;

use crate::image::read_image_as_data_uri;
use crate::store::NoteStore;

// ---- Confirmation Hook ----

/// Destructive operations ask before acting. The presentation layer supplies
/// the actual prompt; declining aborts with no state change.
pub trait ConfirmAction {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Confirms everything. Suits headless use and tests.
pub struct AlwaysConfirm;

impl ConfirmAction for AlwaysConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

const DELETE_FOLDER_PROMPT: &str =
    "Deleting a folder also deletes every memo inside it. Continue?";
const DELETE_NOTE_PROMPT: &str = "Delete this memo?";

// ---- Application Facade ----

/// Wraps the store with the pieces that sit between it and the UI: the
/// delete confirmations and the async image attach.
pub struct MemoApp {
    store: NoteStore,
    confirmer: Box<dyn ConfirmAction>,
}

impl MemoApp {
    pub fn new(store: NoteStore, confirmer: Box<dyn ConfirmAction>) -> Self {
        Self { store, confirmer }
    }

    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut NoteStore {
        &mut self.store
    }

    /// Returns true if the folder was deleted, false if the user declined.
    pub fn delete_folder(&mut self, id: &str) -> bool {
        if !self.confirmer.confirm(DELETE_FOLDER_PROMPT) {
            return false;
        }
        self.store.delete_folder(id);
        true
    }

    /// Returns true if the note was deleted, false if the user declined.
    pub fn delete_note(&mut self, id: &str) -> bool {
        if !self.confirmer.confirm(DELETE_NOTE_PROMPT) {
            return false;
        }
        self.store.delete_note(id);
        true
    }

    /// Read an image file and attach it to the note that is active NOW. The
    /// target id is captured before the read suspends, so switching notes
    /// while the file loads cannot redirect the result. Returns the id of
    /// the note the image landed on.
    pub async fn attach_image_from_file(&mut self, path: &Path) -> Result<Option<String>> {
        let Some(target) = self.store.active_note_id().map(String::from) else {
            return Ok(None);
        };
        let uri = read_image_as_data_uri(path).await?;
        self.store.set_image(&target, Some(uri));
        Ok(Some(target))
    }

    /// Clear the active note's image.
    pub fn remove_image(&mut self) {
        if let Some(id) = self.store.active_note_id().map(String::from) {
            self.store.set_image(&id, None);
        }
    }
}

// ---- Tests ----
