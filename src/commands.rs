use std::sync::Arc;

use tauri::{Emitter, Manager};
use tauri_plugin_clipboard_manager::ClipboardExt;

use crate::draft::{DraftDebouncer, DraftSink, DRAFT_DEBOUNCE};
use crate::notes::{Commit, NoteStore};
use crate::types::{DraftStatus, Note, PopupState, TabInfo};
use crate::AppMutex;

// ─── Tauri commands ────────────────────────────────────────────────────────────

/// Initial read on popup open: the resumable draft plus the saved notes.
#[tauri::command]
pub async fn load_state(state: tauri::State<'_, AppMutex>) -> Result<PopupState, String> {
    let store = note_store(&state).await?;
    store.load().map_err(|e| e.to_string())
}

/// Record which tab the popup was opened over. Called once by the opener;
/// until then the active tab stays empty and titles fall back accordingly.
#[tauri::command]
pub async fn set_active_tab(
    tab: TabInfo,
    state: tauri::State<'_, AppMutex>,
) -> Result<(), String> {
    state.lock().await.active_tab = tab;
    Ok(())
}

/// Fired on every input event. Non-blocking: the debouncer persists only
/// the final value of a burst and emits `draft-saved` when the write lands.
#[tauri::command]
pub async fn update_draft(
    text: String,
    state: tauri::State<'_, AppMutex>,
) -> Result<(), String> {
    let s = state.lock().await;
    let debouncer = s.draft_debouncer.as_ref().ok_or("store_not_ready")?;
    debouncer.update(text);
    Ok(())
}

/// Commit the current editor text as a note on the active tab. Returns the
/// updated list (newest first) for rendering. An empty or whitespace-only
/// draft persists nothing and surfaces as `nothing_to_save`.
#[tauri::command]
pub async fn save_note(
    text: String,
    state: tauri::State<'_, AppMutex>,
) -> Result<Vec<Note>, String> {
    let (store, tab) = {
        let s = state.lock().await;
        let store = s.note_store.clone().ok_or("store_not_ready")?;
        (store, s.active_tab.clone())
    }; // lock released before touching the store

    match store.commit(&text, &tab).map_err(|e| e.to_string())? {
        Commit::Saved(notes) => Ok(notes),
        Commit::EmptyDraft => Err("nothing_to_save".to_string()),
    }
}

/// Delete one note by id. Unknown ids are a no-op.
#[tauri::command]
pub async fn delete_note(
    id: String,
    state: tauri::State<'_, AppMutex>,
) -> Result<Vec<Note>, String> {
    let store = note_store(&state).await?;
    store.delete(&id).map_err(|e| e.to_string())
}

/// Replace the note list with an empty one. The frontend confirms first.
#[tauri::command]
pub async fn clear_notes(state: tauri::State<'_, AppMutex>) -> Result<(), String> {
    let store = note_store(&state).await?;
    store.clear_all().map_err(|e| e.to_string())
}

/// Drop the persisted draft without touching the note list.
#[tauri::command]
pub async fn discard_draft(state: tauri::State<'_, AppMutex>) -> Result<(), String> {
    let store = note_store(&state).await?;
    store.discard_draft().map_err(|e| e.to_string())
}

/// Copy note or draft text to the system clipboard.
#[tauri::command]
pub async fn copy_text(app: tauri::AppHandle, text: String) -> Result<(), String> {
    if text.is_empty() {
        return Err("nothing_to_copy".to_string());
    }
    app.clipboard().write_text(text).map_err(|e| e.to_string())
}

/// Open the page a note was captured on in a new browser tab.
#[tauri::command]
pub async fn open_note_url(url: String) -> Result<(), String> {
    if url.is_empty() {
        return Err("no_url".to_string());
    }
    open::that_detached(url).map_err(|e| e.to_string())
}

// ─── Internal helpers ──────────────────────────────────────────────────────────

/// Called once on startup: open the store under the app data dir and wire
/// up the draft debouncer. Until this finishes, commands answer
/// `store_not_ready`.
pub async fn startup_init(app: tauri::AppHandle) {
    let path = store_file_path(&app);
    let store = match crate::store::KvStore::open(&path) {
        Ok(store) => NoteStore::new(store),
        Err(e) => {
            tracing::error!("Failed to open note store at {}: {e}", path.display());
            return;
        }
    };

    let sink = Arc::new(PopupDraftSink {
        store: store.clone(),
        app: app.clone(),
    });
    let debouncer = DraftDebouncer::new(sink, DRAFT_DEBOUNCE);

    let state = app.state::<AppMutex>();
    let mut s = state.lock().await;
    s.note_store = Some(store);
    s.draft_debouncer = Some(debouncer);
}

/// Debounce sink that writes through the store and then tells the popup,
/// so the status line can flip from "Saving draft..." to "Draft saved".
struct PopupDraftSink {
    store: NoteStore,
    app: tauri::AppHandle,
}

impl DraftSink for PopupDraftSink {
    fn persist_draft(&self, text: &str) -> anyhow::Result<()> {
        self.store.save_draft(text)?;
        let _ = self.app.emit("draft-saved", DraftStatus { empty: text.is_empty() });
        Ok(())
    }
}

async fn note_store(state: &tauri::State<'_, AppMutex>) -> Result<NoteStore, String> {
    state
        .lock()
        .await
        .note_store
        .clone()
        .ok_or_else(|| "store_not_ready".to_string())
}

/// Path where the key-value store lives.
pub fn store_file_path(app: &tauri::AppHandle) -> std::path::PathBuf {
    app.path()
        .app_data_dir()
        .unwrap_or_else(|_| std::path::PathBuf::from("."))
        .join("tabnote")
        .join("notes.sqlite")
}
