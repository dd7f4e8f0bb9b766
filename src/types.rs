use serde::{Deserialize, Serialize};

/// A committed note, tied to the page it was captured on.
/// Immutable once created; the only mutation is removal from the list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    /// Opaque unique id: base-36 millisecond timestamp + random suffix.
    pub id: String,
    pub text: String,
    /// Page URL at capture time. May be empty if no tab info was available.
    pub url: String,
    pub title: String,
    /// Capture time as an RFC 3339 / ISO-8601 string.
    pub ts: String,
}

/// Metadata for the tab the popup was opened over.
/// Both fields empty when no tab info is available.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TabInfo {
    pub url: String,
    pub title: String,
}

/// Everything the popup needs on open: the resumable draft plus the
/// saved notes, newest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PopupState {
    pub draft: String,
    pub notes: Vec<Note>,
}

/// Payload of the `draft-saved` event emitted after a debounced draft
/// write lands. The frontend uses `empty` to pick its status line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftStatus {
    pub empty: bool,
}
