use crate::error::AppError;
use crate::models::detect_types::{DetectionResult, ProcessingMethod};
use crate::models::upload_types::{NoticeKind, ProcessingNotice, ServiceStatus};
use crate::services::upload_state::SelectedFile;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;

/// 5 minute request timeout; very large images take a while server-side.
const DETECT_TIMEOUT: Duration = Duration::from_secs(300);
const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;
/// Above this the service switches to tiled processing, so the form shows
/// an advisory notice up front.
const LARGE_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// One unauthenticated GET against the service root. Any 2xx means the
/// backend is reachable; every failure mode collapses to Disconnected.
pub async fn check_connection(api_url: &str) -> ServiceStatus {
    let client = reqwest::Client::new();
    match client.get(format!("{}/", api_url)).send().await {
        Ok(response) if response.status().is_success() => ServiceStatus::Connected,
        Ok(response) => {
            eprintln!("Backend probe returned HTTP {}", response.status());
            ServiceStatus::Disconnected
        }
        Err(e) => {
            eprintln!("Backend connection failed: {}", e);
            ServiceStatus::Disconnected
        }
    }
}

/// Upload the selected file as multipart `file` and map the JSON response.
/// `on_progress` receives the percentage of file bytes sent, non-decreasing
/// and settling at 100 before the server answers; the caller renders the
/// remaining wait as a distinct processing phase.
pub async fn detect_trees<F>(
    api_url: &str,
    file: &SelectedFile,
    on_progress: F,
) -> Result<DetectionResult, AppError>
where
    F: Fn(u64) + Send + Sync + 'static,
{
    let client = reqwest::Client::builder()
        .timeout(DETECT_TIMEOUT)
        .build()
        .map_err(|e| AppError::Unexpected(e.to_string()))?;

    let body = progress_body(&file.path, file.size, on_progress).await?;
    let part = reqwest::multipart::Part::stream_with_length(body, file.size)
        .file_name(file.name.clone())
        .mime_str(file.mime)
        .map_err(|e| AppError::Unexpected(e.to_string()))?;
    let form = reqwest::multipart::Form::new().part("file", part);

    let response = client
        .post(format!("{}/api/detect-trees", api_url))
        .multipart(form)
        .send()
        .await
        .map_err(|e| classify_send_error(e, api_url))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(server_error(status.as_u16(), &body));
    }

    response
        .json::<DetectionResult>()
        .await
        .map_err(|e| AppError::Unexpected(e.to_string()))
}

/// Stream the file from disk in fixed chunks, reporting percent-sent as the
/// request body is pulled. Emits only when the percentage advances, the same
/// dedup a progress bar needs anyway.
async fn progress_body<F>(path: &Path, total: u64, on_progress: F) -> Result<reqwest::Body, AppError>
where
    F: Fn(u64) + Send + Sync + 'static,
{
    let file = tokio::fs::File::open(path).await?;
    let on_progress = Arc::new(on_progress);
    on_progress(0);

    let stream = futures::stream::unfold(
        (file, 0u64, 0u64),
        move |(mut file, sent, last)| {
            let on_progress = on_progress.clone();
            async move {
                let mut buf = vec![0u8; UPLOAD_CHUNK_SIZE];
                match file.read(&mut buf).await {
                    Ok(0) => None,
                    Ok(n) => {
                        buf.truncate(n);
                        let sent = sent + n as u64;
                        let pct = percent(sent, total);
                        let last = if pct > last {
                            on_progress(pct);
                            pct
                        } else {
                            last
                        };
                        Some((Ok(buf), (file, sent, last)))
                    }
                    Err(e) => Some((Err(e), (file, sent, last))),
                }
            }
        },
    );

    Ok(reqwest::Body::wrap_stream(stream))
}

/// Percentage of file bytes sent, clamped to [0, 100].
pub(crate) fn percent(sent: u64, total: u64) -> u64 {
    if total == 0 {
        return 100;
    }
    sent.min(total) * 100 / total
}

/// A response arrived but with an error status: extract `detail` (FastAPI)
/// or `message` from the JSON body, falling back to a generic text.
pub(crate) fn server_error(status: u16, body: &str) -> AppError {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("detail")
                .and_then(|d| d.as_str().map(str::to_string))
                .or_else(|| value.get("message").and_then(|m| m.as_str().map(str::to_string)))
        })
        .unwrap_or_else(|| "Unknown server error".to_string());

    AppError::Server { status, detail }
}

/// No usable response: connect failures and timeouts point the user at the
/// configured service URL, local body/builder failures stay generic.
fn classify_send_error(err: reqwest::Error, api_url: &str) -> AppError {
    if err.is_connect() || err.is_timeout() {
        AppError::Network {
            url: api_url.to_string(),
        }
    } else if err.is_body() || err.is_builder() || err.is_decode() {
        AppError::Unexpected(err.to_string())
    } else {
        // The request left the machine and nothing came back.
        AppError::Network {
            url: api_url.to_string(),
        }
    }
}

/// Pre-upload advisory for files large enough to be tiled server-side.
pub fn large_upload_notice(size: u64) -> Option<ProcessingNotice> {
    if size > LARGE_FILE_BYTES {
        Some(ProcessingNotice {
            message: "Large image detected. This may take a while as the image will be \
                      processed in tiles. Very large images may be automatically resized \
                      for optimal processing."
                .to_string(),
            kind: NoticeKind::Info,
        })
    } else {
        None
    }
}

/// Post-upload summary of how the service handled the image.
pub fn processing_notice(result: &DetectionResult) -> ProcessingNotice {
    match result.processing_method {
        ProcessingMethod::Tiled => ProcessingNotice {
            message: format!(
                "Image processed using tiling method. {} tiles were processed.",
                result.tiles_processed.unwrap_or(0)
            ),
            kind: NoticeKind::Success,
        },
        ProcessingMethod::SinglePass => ProcessingNotice {
            message: "Image processed using single-pass method.".to_string(),
            kind: NoticeKind::Success,
        },
    }
}
