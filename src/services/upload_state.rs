use crate::error::AppError;
use crate::models::detect_types::DetectionResult;
use crate::models::upload_types::{FileInfo, ProcessingNotice, ServiceStatus};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// 2 GiB, matching the service-side upload cap.
pub const MAX_FILE_SIZE: u64 = 2 * 1024 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    pub mime: &'static str,
}

/// The single owner of all form state for the lifetime of the window.
/// Managed by Tauri and shared between commands and the drag-drop handler;
/// the atomic flag is the only concurrency guard the form needs, since at
/// most one upload is ever in flight.
#[derive(Clone)]
pub struct UploadController {
    selected: Arc<Mutex<Option<SelectedFile>>>,
    preview: Arc<Mutex<Option<String>>>,
    result: Arc<Mutex<Option<DetectionResult>>>,
    notice: Arc<Mutex<Option<ProcessingNotice>>>,
    status: Arc<Mutex<ServiceStatus>>,
    uploading: Arc<AtomicBool>,
}

impl UploadController {
    pub fn new() -> Self {
        Self {
            selected: Arc::new(Mutex::new(None)),
            preview: Arc::new(Mutex::new(None)),
            result: Arc::new(Mutex::new(None)),
            notice: Arc::new(Mutex::new(None)),
            status: Arc::new(Mutex::new(ServiceStatus::Unknown)),
            uploading: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Validate and take ownership of a newly picked or dropped file.
    /// Size is checked before type, and a prior result/notice/preview is
    /// cleared only once the new file is accepted.
    pub fn select_path(&self, path: &Path) -> Result<FileInfo, AppError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            AppError::Read(format!("Error reading image file: {}", e))
        })?;

        let mime = validate_selection(path, metadata.len())?;

        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let info = FileInfo {
            name: name.clone(),
            size: metadata.len(),
        };

        *self.selected.lock().unwrap() = Some(SelectedFile {
            path: path.to_path_buf(),
            name,
            size: metadata.len(),
            mime,
        });
        *self.preview.lock().unwrap() = None;
        *self.result.lock().unwrap() = None;
        *self.notice.lock().unwrap() = None;

        Ok(info)
    }

    pub fn selected(&self) -> Option<SelectedFile> {
        self.selected.lock().unwrap().clone()
    }

    pub fn set_preview(&self, data_url: String) {
        *self.preview.lock().unwrap() = Some(data_url);
    }

    pub fn preview(&self) -> Option<String> {
        self.preview.lock().unwrap().clone()
    }

    pub fn set_result(&self, result: DetectionResult) {
        *self.result.lock().unwrap() = Some(result);
    }

    /// A failed attempt clears any previous result so the error message and
    /// stale statistics are never shown together.
    pub fn clear_result(&self) {
        *self.result.lock().unwrap() = None;
    }

    pub fn result(&self) -> Option<DetectionResult> {
        self.result.lock().unwrap().clone()
    }

    pub fn set_notice(&self, notice: ProcessingNotice) {
        *self.notice.lock().unwrap() = Some(notice);
    }

    pub fn clear_notice(&self) {
        *self.notice.lock().unwrap() = None;
    }

    pub fn notice(&self) -> Option<ProcessingNotice> {
        self.notice.lock().unwrap().clone()
    }

    pub fn set_status(&self, status: ServiceStatus) {
        *self.status.lock().unwrap() = status;
    }

    pub fn status(&self) -> ServiceStatus {
        *self.status.lock().unwrap()
    }

    /// Claim the single upload slot. Returns false if a request is already
    /// in flight; the caller must not start another one.
    pub fn begin_upload(&self) -> bool {
        self.uploading
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub fn finish_upload(&self) {
        self.uploading.store(false, Ordering::SeqCst);
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading.load(Ordering::SeqCst)
    }

    /// Back to the initial state. The probed service status survives a reset,
    /// it describes the backend rather than the form.
    pub fn reset(&self) {
        *self.selected.lock().unwrap() = None;
        *self.preview.lock().unwrap() = None;
        *self.result.lock().unwrap() = None;
        *self.notice.lock().unwrap() = None;
    }
}

impl Default for UploadController {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply the selection rules in order: size first, then the extension
/// allow-list. The browser original also accepted a matching MIME type, but
/// for a path-based picker the extension is the only MIME source, so a single
/// allow-list covers both branches. Returns the MIME type for the upload.
pub fn validate_selection(path: &Path, size: u64) -> Result<&'static str, AppError> {
    if size > MAX_FILE_SIZE {
        return Err(AppError::Validation(
            "File size must be less than 2GB.".to_string(),
        ));
    }

    mime_for_path(path).ok_or_else(|| {
        AppError::Validation("Please select a valid image file (TIFF, JPG, PNG).".to_string())
    })
}

fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "tif" | "tiff" => Some("image/tiff"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        _ => None,
    }
}
