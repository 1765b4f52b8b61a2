use crate::error::AppError;
use crate::models::upload_types::ServiceStatus;
use crate::services::{config, detect_client};
use crate::services::upload_state::UploadController;
use tauri::State;

/// Probe the detection service once and record the outcome. Invoked by the
/// frontend on mount; failures are informational, never a blocking error.
#[tauri::command]
pub async fn check_backend(
    controller: State<'_, UploadController>,
) -> Result<ServiceStatus, AppError> {
    let status = detect_client::check_connection(&config::api_url()).await;
    controller.set_status(status);
    Ok(status)
}
