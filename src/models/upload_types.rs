use serde::Serialize;

/// Lightweight description of the selected file, sent to the webview
/// after a successful selection.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
}

/// Reachability of the detection service. Starts out Unknown until the
/// first probe answers; purely informational, never blocks an upload.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Unknown,
    Connected,
    Disconnected,
}

/// Advisory banner shown next to the form: a pre-upload heads-up for large
/// files (info) or a post-upload processing summary (success).
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ProcessingNotice {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NoticeKind,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Info,
    Success,
}
