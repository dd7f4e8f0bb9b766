use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use rand::Rng;
use url::Url;

use crate::store::KvStore;
use crate::types::{Note, PopupState, TabInfo};

/// Reserved key for the in-progress draft.
pub const DRAFT_KEY: &str = "qn_draft";
/// Reserved key for the note list, stored as one JSON array value.
pub const NOTES_KEY: &str = "qn_notes";
/// Maximum number of saved notes. Commits beyond it drop the oldest.
pub const MAX_NOTES: usize = 500;

/// Outcome of a commit attempt. An empty or whitespace-only draft never
/// touches the store; the caller surfaces that as a status message only.
#[derive(Debug)]
pub enum Commit {
    Saved(Vec<Note>),
    EmptyDraft,
}

/// Owns every read and write against the popup's key-value store:
/// draft persistence, note list maintenance (insert, cap, delete, clear).
///
/// Every list mutation is a read-modify-write of the whole collection —
/// notes are not individually addressable in storage. Correctness assumes
/// a single popup instance; see DESIGN.md.
#[derive(Debug, Clone)]
pub struct NoteStore {
    store: KvStore,
}

impl NoteStore {
    pub fn new(store: KvStore) -> Self {
        Self { store }
    }

    /// Read draft and note list for popup open. Fails open to an empty
    /// draft / empty list when a key is absent or its JSON is malformed.
    pub fn load(&self) -> Result<PopupState> {
        let draft = self.store.get(DRAFT_KEY)?.unwrap_or_default();
        let notes = self.notes_list()?;
        Ok(PopupState { draft, notes })
    }

    /// Persist the current draft text. Called from the debounce loop, not
    /// directly from input events.
    pub fn save_draft(&self, text: &str) -> Result<()> {
        self.store.set(DRAFT_KEY, text)
    }

    /// Commit the draft as a new note captured on `tab`.
    ///
    /// Prepends the note, enforces the cap, and persists the updated list
    /// together with an emptied draft as one combined write. Returns the
    /// updated list so the popup can re-render without a second read.
    pub fn commit(&self, draft: &str, tab: &TabInfo) -> Result<Commit> {
        let text = draft.trim();
        if text.is_empty() {
            return Ok(Commit::EmptyDraft);
        }

        let note = Note {
            id: generate_id(),
            text: text.to_string(),
            url: tab.url.clone(),
            title: note_title(tab),
            ts: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };

        let mut notes = self.notes_list()?;
        notes.insert(0, note);
        notes.truncate(MAX_NOTES);
        let json = serde_json::to_string(&notes)?;
        self.store
            .set_many(&[(NOTES_KEY, json.as_str()), (DRAFT_KEY, "")])?;
        Ok(Commit::Saved(notes))
    }

    /// Remove the note with the given id. An unknown id leaves the list
    /// unchanged (the filtered list is still rewritten, as the source does).
    pub fn delete(&self, id: &str) -> Result<Vec<Note>> {
        let mut notes = self.notes_list()?;
        notes.retain(|n| n.id != id);
        self.store.set(NOTES_KEY, &serde_json::to_string(&notes)?)?;
        Ok(notes)
    }

    /// Replace the note list with an empty one.
    pub fn clear_all(&self) -> Result<()> {
        self.store.set(NOTES_KEY, "[]")
    }

    /// Drop the draft key. The note list is untouched.
    pub fn discard_draft(&self) -> Result<()> {
        self.store.remove(DRAFT_KEY)
    }

    fn notes_list(&self) -> Result<Vec<Note>> {
        let raw = match self.store.get(NOTES_KEY)? {
            Some(raw) => raw,
            None => return Ok(Vec::new()),
        };
        match serde_json::from_str(&raw) {
            Ok(notes) => Ok(notes),
            Err(e) => {
                tracing::warn!("Discarding unreadable note list: {e}");
                Ok(Vec::new())
            }
        }
    }
}

/// Time-plus-random id: base-36 millisecond timestamp, 6 random
/// alphanumerics. Collisions are treated as negligible; there is no
/// uniqueness check on insert.
fn generate_id() -> String {
    let millis = Utc::now().timestamp_millis().max(0) as u64;
    let suffix: String = rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(6)
        .map(char::from)
        .collect();
    format!("{}{}", to_base36(millis), suffix)
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = String::new();
    while n > 0 {
        out.insert(0, DIGITS[(n % 36) as usize] as char);
        n /= 36;
    }
    out
}

/// Title fallback chain: page title, then the URL's domain, then "Unknown".
fn note_title(tab: &TabInfo) -> String {
    let title = tab.title.trim();
    if !title.is_empty() {
        return title.to_string();
    }
    let domain = extract_domain(&tab.url);
    if domain.is_empty() {
        "Unknown".to_string()
    } else {
        domain
    }
}

/// Host of `url` with a leading "www." stripped. Unparseable input comes
/// back unchanged so the popup still shows something recognizable.
pub fn extract_domain(url: &str) -> String {
    match Url::parse(url).ok().and_then(|u| u.host_str().map(str::to_string)) {
        Some(host) => host.strip_prefix("www.").unwrap_or(&host).to_string(),
        None => url.to_string(),
    }
}
