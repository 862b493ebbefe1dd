use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

// ---- Records ----

/// A folder owns an ordered list of note ids, not the notes themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub id: String,
    pub name: String,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    /// Rich-text markup. Stored opaquely; only searched via its plain-text
    /// projection.
    pub content: String,
    /// Older persisted data predates the pin feature.
    #[serde(default)]
    pub pinned: bool,
    /// Attached image as a data URI.
    #[serde(default)]
    pub image: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// The full persisted data set: folder list plus the global note map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreData {
    #[serde(default)]
    pub folders: Vec<Folder>,
    #[serde(default)]
    pub notes: HashMap<String, Note>,
}

impl StoreData {
    pub fn folder(&self, id: &str) -> Option<&Folder> {
        self.folders.iter().find(|f| f.id == id)
    }

    pub fn folder_mut(&mut self, id: &str) -> Option<&mut Folder> {
        self.folders.iter_mut().find(|f| f.id == id)
    }

    /// The folder whose list contains the given note id, if any.
    pub fn folder_of_note(&self, note_id: &str) -> Option<&Folder> {
        self.folders
            .iter()
            .find(|f| f.notes.iter().any(|n| n == note_id))
    }
}

// ---- Ids and timestamps ----

static LAST_ID: AtomicI64 = AtomicI64::new(0);

/// Generate a `<prefix>_<millis>` id. Two calls in the same millisecond would
/// collide, so the counter is bumped past the last value handed out.
pub fn fresh_id(prefix: &str) -> String {
    let now = Utc::now().timestamp_millis();
    let mut last = LAST_ID.load(Ordering::SeqCst);
    loop {
        let candidate = now.max(last + 1);
        match LAST_ID.compare_exchange(last, candidate, Ordering::SeqCst, Ordering::SeqCst) {
            Ok(_) => return format!("{}_{}", prefix, candidate),
            Err(observed) => last = observed,
        }
    }
}

/// Current instant as RFC 3339 with millisecond precision in UTC, e.g.
/// `2026-08-30T12:34:56.789Z`. Lexicographic order matches chronological
/// order, which the note sort relies on.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl Note {
    /// A blank unpinned note stamped with the current instant.
    pub fn blank(id: String) -> Self {
        let now = now_timestamp();
        Note {
            id,
            title: String::new(),
            content: String::new(),
            pinned: false,
            image: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

// ---- Tests ----
