use anyhow::Result;

use crate::model::{fresh_id, now_timestamp, Folder, Note, StoreData};
use crate::search::note_matches;
use crate::storage::{keys, Storage};

pub const DEFAULT_FOLDER_NAME: &str = "New Folder";

/// Owns all folder/note state plus the active selection, and writes itself
/// through to the storage medium after every mutation.
///
/// Two invariants are maintained across every operation: a folder never ends
/// up with zero notes (a fresh note is created the moment one would), and the
/// active folder/note ids always point at entities that exist. Operations on
/// stale ids are silent no-ops.
pub struct NoteStore {
    data: StoreData,
    active_folder_id: Option<String>,
    active_note_id: Option<String>,
    gallery_view: bool,
    // Session-only, never persisted.
    search_term: String,
    renaming_id: Option<String>,
    storage: Box<dyn Storage>,
}

impl NoteStore {
    // ---- Load / Save ----

    /// Restore from storage. Missing or malformed data seeds a default store
    /// with one folder and one note. Restored selection ids that no longer
    /// resolve fall back to the first folder / the active folder's first
    /// note, and a restored empty folder list or empty active folder triggers
    /// creation (which also saves).
    pub fn load(storage: Box<dyn Storage>) -> Self {
        let mut store = NoteStore {
            data: StoreData::default(),
            active_folder_id: None,
            active_note_id: None,
            gallery_view: false,
            search_term: String::new(),
            renaming_id: None,
            storage,
        };

        if let Some(raw) = store.storage.get(keys::DATA) {
            match serde_json::from_str(&raw) {
                Ok(data) => {
                    store.data = data;
                    store.active_folder_id = store.storage.get(keys::ACTIVE_FOLDER);
                    store.active_note_id = store.storage.get(keys::ACTIVE_NOTE);
                    store.gallery_view =
                        store.storage.get(keys::GALLERY_VIEW).as_deref() == Some("true");
                }
                Err(e) => {
                    eprintln!("Warning: persisted memo data is malformed, seeding defaults: {}", e)
                }
            }
        }

        if store.data.folders.is_empty() {
            store.create_folder(None);
            return store;
        }

        let folder_ok = store
            .active_folder_id
            .as_deref()
            .map_or(false, |id| store.data.folder(id).is_some());
        if !folder_ok {
            store.active_folder_id = store.data.folders.first().map(|f| f.id.clone());
        }

        if store.active_folder().map_or(false, |f| f.notes.is_empty()) {
            store.create_note();
            return store;
        }

        let note_ok = store
            .active_note_id
            .as_deref()
            .map_or(false, |id| store.data.notes.contains_key(id));
        if !note_ok {
            store.active_note_id = store.active_folder().and_then(|f| f.notes.first().cloned());
        }

        store
    }

    /// Write the full data set plus selection state. Called after every
    /// mutation, no batching. A storage failure is reported but never aborts
    /// the in-memory mutation that already happened.
    pub fn save(&mut self) {
        if let Err(e) = self.persist() {
            eprintln!("Warning: failed to persist memo data: {}", e);
        }
    }

    fn persist(&mut self) -> Result<()> {
        let json = serde_json::to_string(&self.data)?;
        self.storage.set(keys::DATA, &json)?;

        match self.active_folder_id.clone() {
            Some(id) => self.storage.set(keys::ACTIVE_FOLDER, &id)?,
            None => self.storage.remove(keys::ACTIVE_FOLDER)?,
        }
        match self.active_note_id.clone() {
            Some(id) => self.storage.set(keys::ACTIVE_NOTE, &id)?,
            None => self.storage.remove(keys::ACTIVE_NOTE)?,
        }
        let gallery = if self.gallery_view { "true" } else { "false" };
        self.storage.set(keys::GALLERY_VIEW, gallery)?;
        Ok(())
    }

    // ---- Folder Operations ----

    /// Append a new folder, make it active, and create its first note. The
    /// note creation is what saves, so a folder never hits storage empty.
    pub fn create_folder(&mut self, name: Option<&str>) -> String {
        let folder = Folder {
            id: fresh_id("folder"),
            name: name.unwrap_or(DEFAULT_FOLDER_NAME).to_string(),
            notes: Vec::new(),
        };
        let id = folder.id.clone();
        self.data.folders.push(folder);
        self.active_folder_id = Some(id.clone());
        self.create_note();
        id
    }

    pub fn rename_folder(&mut self, id: &str, name: &str) {
        if let Some(folder) = self.data.folder_mut(id) {
            folder.name = name.to_string();
            self.save();
        }
    }

    /// Remove the folder and cascade-delete every note it referenced. If it
    /// was active, selection falls back to the first remaining folder and its
    /// first note. Deleting the last folder recreates a default one.
    pub fn delete_folder(&mut self, id: &str) {
        let Some(idx) = self.data.folders.iter().position(|f| f.id == id) else {
            return;
        };
        let folder = self.data.folders.remove(idx);
        for note_id in &folder.notes {
            self.data.notes.remove(note_id);
        }

        if self.active_folder_id.as_deref() == Some(id) {
            self.active_folder_id = self.data.folders.first().map(|f| f.id.clone());
            self.active_note_id = self
                .data
                .folders
                .first()
                .and_then(|f| f.notes.first().cloned());
        }

        if self.data.folders.is_empty() {
            self.create_folder(None);
            return;
        }
        self.save();
    }

    /// Switch the active folder, clearing any search in progress. A folder
    /// with no notes gets one created instead of leaving selection dangling.
    pub fn select_folder(&mut self, id: &str) {
        let Some(folder) = self.data.folder(id) else {
            return;
        };
        let first_note = folder.notes.first().cloned();
        self.search_term.clear();
        self.active_folder_id = Some(id.to_string());
        match first_note {
            Some(note_id) => {
                self.active_note_id = Some(note_id);
                self.save();
            }
            None => {
                self.create_note();
            }
        }
    }

    // ---- Note Operations ----

    /// Create a blank note at the front of the active folder's list and make
    /// it active. No-op without an active folder.
    pub fn create_note(&mut self) -> Option<String> {
        let folder_id = self.active_folder_id.clone()?;
        self.create_note_in(&folder_id, true)
    }

    fn create_note_in(&mut self, folder_id: &str, activate: bool) -> Option<String> {
        let note = Note::blank(fresh_id("note"));
        let id = note.id.clone();
        let folder = self.data.folder_mut(folder_id)?;
        folder.notes.insert(0, id.clone());
        self.data.notes.insert(id.clone(), note);
        if activate {
            self.active_note_id = Some(id.clone());
        }
        self.save();
        Some(id)
    }

    pub fn rename_note(&mut self, id: &str, title: &str) {
        if let Some(note) = self.data.notes.get_mut(id) {
            note.title = title.to_string();
            note.updated_at = now_timestamp();
            self.save();
        }
    }

    /// Remove the note from the global map and from whichever folder listed
    /// it. If it was active, selection falls back to the active folder's
    /// first note. A folder left empty immediately gets a fresh note; the
    /// new note becomes active only when that folder is the active one.
    pub fn delete_note(&mut self, id: &str) {
        if self.data.notes.remove(id).is_none() {
            return;
        }

        let mut emptied: Option<String> = None;
        for folder in &mut self.data.folders {
            let before = folder.notes.len();
            folder.notes.retain(|n| n != id);
            if folder.notes.len() != before && folder.notes.is_empty() {
                emptied = Some(folder.id.clone());
            }
        }

        if self.active_note_id.as_deref() == Some(id) {
            self.active_note_id = self.active_folder().and_then(|f| f.notes.first().cloned());
        }

        if let Some(folder_id) = emptied {
            let activate = self.active_folder_id.as_deref() == Some(folder_id.as_str());
            self.create_note_in(&folder_id, activate);
            return;
        }
        self.save();
    }

    /// Flip the pin flag. Pinning is a sort hint, not an edit, so it does not
    /// touch `updated_at`.
    pub fn toggle_pin(&mut self, id: &str) {
        if let Some(note) = self.data.notes.get_mut(id) {
            note.pinned = !note.pinned;
            self.save();
        }
    }

    /// Switch the active note. During a search the result list spans all
    /// folders, so the active folder is re-anchored to the note's folder.
    pub fn select_note(&mut self, id: &str) {
        if !self.data.notes.contains_key(id) {
            return;
        }
        self.active_note_id = Some(id.to_string());
        if !self.search_term.is_empty() {
            if let Some(folder) = self.data.folder_of_note(id) {
                self.active_folder_id = Some(folder.id.clone());
            }
        }
        self.save();
    }

    pub fn update_title(&mut self, id: &str, title: &str) {
        self.rename_note(id, title);
    }

    pub fn update_content(&mut self, id: &str, content: &str) {
        if let Some(note) = self.data.notes.get_mut(id) {
            note.content = content.to_string();
            note.updated_at = now_timestamp();
            self.save();
        }
    }

    /// Attach or clear the note's image (a data URI). The caller decides the
    /// target note id up front, so a selection change while an upload is in
    /// flight cannot redirect the result.
    pub fn set_image(&mut self, id: &str, image: Option<String>) {
        if let Some(note) = self.data.notes.get_mut(id) {
            note.image = image;
            note.updated_at = now_timestamp();
            self.save();
        }
    }

    // ---- Search and Views ----

    /// Set the transient search filter. Not a mutation of stored data, not
    /// persisted.
    pub fn set_search_term(&mut self, term: &str) {
        self.search_term = term.to_string();
    }

    /// The notes the list should show, recomputed on every call. A non-empty
    /// search term matches against every note in every folder; otherwise the
    /// active folder's notes. Pinned notes sort first, then `updated_at`
    /// descending, with the id as a deterministic tiebreak.
    pub fn visible_notes(&self) -> Vec<&Note> {
        let mut notes: Vec<&Note> = if self.search_term.is_empty() {
            match self.active_folder() {
                Some(folder) => folder
                    .notes
                    .iter()
                    .filter_map(|id| self.data.notes.get(id))
                    .collect(),
                None => Vec::new(),
            }
        } else {
            let term = self.search_term.to_lowercase();
            self.data
                .notes
                .values()
                .filter(|n| note_matches(n, &term))
                .collect()
        };

        notes.sort_by(|a, b| {
            b.pinned
                .cmp(&a.pinned)
                .then_with(|| b.updated_at.cmp(&a.updated_at))
                .then_with(|| a.id.cmp(&b.id))
        });
        notes
    }

    pub fn toggle_gallery_view(&mut self) {
        self.gallery_view = !self.gallery_view;
        self.save();
    }

    // ---- Rename State Machine ----

    /// Enter rename mode for a folder or note. Unknown ids are ignored.
    pub fn begin_rename(&mut self, id: &str) {
        if self.data.folder(id).is_some() || self.data.notes.contains_key(id) {
            self.renaming_id = Some(id.to_string());
        }
    }

    /// Commit the pending rename to whichever entity was being renamed.
    pub fn finish_rename(&mut self, new_name: &str) {
        let Some(id) = self.renaming_id.take() else {
            return;
        };
        if self.data.folder(&id).is_some() {
            self.rename_folder(&id, new_name);
        } else {
            self.rename_note(&id, new_name);
        }
    }

    /// Leave rename mode discarding the edit.
    pub fn cancel_rename(&mut self) {
        self.renaming_id = None;
    }

    // ---- Dark Mode ----

    // The dark-mode flag lives beside the store in the same key-value medium
    // but is independent of the note data.

    pub fn dark_mode_enabled(&self) -> bool {
        self.storage.get(keys::DARK_MODE).as_deref() == Some("enabled")
    }

    pub fn set_dark_mode(&mut self, enabled: bool) {
        let value = if enabled { "enabled" } else { "disabled" };
        if let Err(e) = self.storage.set(keys::DARK_MODE, value) {
            eprintln!("Warning: failed to persist dark mode flag: {}", e);
        }
    }

    // ---- Accessors ----

    pub fn folders(&self) -> &[Folder] {
        &self.data.folders
    }

    pub fn note(&self, id: &str) -> Option<&Note> {
        self.data.notes.get(id)
    }

    pub fn note_count(&self) -> usize {
        self.data.notes.len()
    }

    pub fn active_folder_id(&self) -> Option<&str> {
        self.active_folder_id.as_deref()
    }

    pub fn active_note_id(&self) -> Option<&str> {
        self.active_note_id.as_deref()
    }

    pub fn active_folder(&self) -> Option<&Folder> {
        self.active_folder_id
            .as_deref()
            .and_then(|id| self.data.folder(id))
    }

    pub fn active_note(&self) -> Option<&Note> {
        self.active_note_id
            .as_deref()
            .and_then(|id| self.data.notes.get(id))
    }

    pub fn gallery_view(&self) -> bool {
        self.gallery_view
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn renaming_id(&self) -> Option<&str> {
        self.renaming_id.as_deref()
    }

    pub fn data(&self) -> &StoreData {
        &self.data
    }
}

// ---- Tests ----
