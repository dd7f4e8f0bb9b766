pub mod commands;
pub mod draft;
pub mod notes;
pub mod store;
pub mod types;

use tokio::sync::Mutex;

use crate::draft::DraftDebouncer;
use crate::notes::NoteStore;
use crate::types::TabInfo;

/// All runtime state shared across Tauri commands.
#[derive(Default)]
pub struct AppState {
    /// Note store handle. None until startup_init opens the backing file;
    /// commands answer `store_not_ready` in the meantime.
    pub note_store: Option<NoteStore>,
    /// Background draft writer, created alongside the store.
    pub draft_debouncer: Option<DraftDebouncer>,
    /// Tab the popup was opened over. Stays empty if the opener never
    /// reports one; note titles then fall back to domain / "Unknown".
    pub active_tab: TabInfo,
}

/// Type alias used in Tauri command signatures and background tasks.
pub type AppMutex = Mutex<AppState>;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Only log WARN and above in production to avoid leaking note content
    #[cfg(debug_assertions)]
    tracing_subscriber::fmt::init();
    #[cfg(not(debug_assertions))]
    tracing_subscriber::fmt().with_max_level(tracing::Level::WARN).init();
    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_clipboard_manager::init())
        .manage(AppMutex::new(AppState::default()))
        .invoke_handler(tauri::generate_handler![
            commands::load_state,
            commands::set_active_tab,
            commands::update_draft,
            commands::save_note,
            commands::delete_note,
            commands::clear_notes,
            commands::discard_draft,
            commands::copy_text,
            commands::open_note_url,
        ])
        .setup(|app| {
            let handle = app.handle().clone();
            tauri::async_runtime::spawn(async move {
                commands::startup_init(handle).await;
            });
            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
