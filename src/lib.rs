pub mod commands;
pub mod error;
pub mod models;
pub mod services;

use services::upload_state::UploadController;
use tauri::{Emitter, Manager};

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_window_state::Builder::default().build())
        .setup(|app| {
            app.manage(UploadController::new());
            Ok(())
        })
        .on_window_event(|window, event| {
            if let tauri::WindowEvent::DragDrop(tauri::DragDropEvent::Drop { paths, .. }) = event {
                // Only the first dropped file is considered; extras are
                // silently ignored, same as the picker.
                let Some(path) = paths.first() else { return };
                let controller = window.state::<UploadController>();
                match controller.select_path(path) {
                    Ok(info) => {
                        let _ = window.emit("file-selected", info);
                    }
                    Err(e) => {
                        let _ = window.emit("select-error", e.to_string());
                    }
                }
            }
        })
        .invoke_handler(tauri::generate_handler![
            commands::connectivity::check_backend,
            commands::upload::select_file,
            commands::upload::load_preview,
            commands::upload::detect_trees,
            commands::upload::reset_form,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
