use crate::error::AppError;
use crate::models::detect_types::DetectionResult;
use crate::models::upload_types::FileInfo;
use crate::services::upload_state::UploadController;
use crate::services::{config, detect_client, preview_service};
use std::path::Path;
use tauri::{AppHandle, Emitter, State};

#[tauri::command]
pub fn select_file(
    controller: State<'_, UploadController>,
    path: String,
) -> Result<FileInfo, AppError> {
    controller.select_path(Path::new(&path))
}

/// Render the preview for the current selection. Decoding happens on a
/// blocking thread; a failure here surfaces a read error but leaves the
/// already-accepted selection in place.
#[tauri::command]
pub async fn load_preview(controller: State<'_, UploadController>) -> Result<String, AppError> {
    let file = controller
        .selected()
        .ok_or_else(|| AppError::Validation("Please select an image first.".to_string()))?;

    let preview = tokio::task::spawn_blocking(move || preview_service::generate_preview(&file.path))
        .await
        .map_err(|e| AppError::Unexpected(format!("Task join failed: {}", e)))??;

    controller.set_preview(preview.clone());
    Ok(preview)
}

/// Upload the selected file and map the response. Only one upload may be in
/// flight; progress percentages stream out as `upload-progress` events and a
/// final 0 resets the bar whatever the outcome.
#[tauri::command]
pub async fn detect_trees(
    app: AppHandle,
    controller: State<'_, UploadController>,
) -> Result<DetectionResult, AppError> {
    let file = controller
        .selected()
        .ok_or_else(|| AppError::Validation("Please select an image first.".to_string()))?;

    if !controller.begin_upload() {
        return Err(AppError::Validation(
            "An upload is already in progress.".to_string(),
        ));
    }

    controller.clear_notice();
    if let Some(notice) = detect_client::large_upload_notice(file.size) {
        controller.set_notice(notice.clone());
        let _ = app.emit("processing-info", &notice);
    }

    let api_url = config::api_url();
    let progress_app = app.clone();
    let outcome = detect_client::detect_trees(&api_url, &file, move |pct| {
        let _ = progress_app.emit("upload-progress", pct);
    })
    .await;

    let _ = app.emit("upload-progress", 0u64);
    controller.finish_upload();

    match outcome {
        Ok(result) => {
            let notice = detect_client::processing_notice(&result);
            controller.set_result(result.clone());
            controller.set_notice(notice.clone());
            let _ = app.emit("processing-info", &notice);
            Ok(result)
        }
        Err(e) => {
            // A failed attempt never shows stale statistics next to the error.
            controller.clear_result();
            controller.clear_notice();
            eprintln!("Upload failed: {}", e);
            Err(e)
        }
    }
}

/// Back to the initial form state. No confirmation, no undo.
#[tauri::command]
pub fn reset_form(controller: State<'_, UploadController>) -> Result<(), AppError> {
    if controller.is_uploading() {
        return Err(AppError::Validation(
            "An upload is already in progress.".to_string(),
        ));
    }
    controller.reset();
    Ok(())
}
