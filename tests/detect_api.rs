use std::io::Write;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use tree_scout_lib::error::AppError;
use tree_scout_lib::models::detect_types::ProcessingMethod;
use tree_scout_lib::models::upload_types::ServiceStatus;
use tree_scout_lib::services::detect_client;
use tree_scout_lib::services::upload_state::SelectedFile;

/// Minimal one-shot HTTP server: drains each request (headers plus
/// Content-Length body) and answers with a canned response.
async fn spawn_server(status_line: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut tmp = [0u8; 8192];

                let header_end = loop {
                    let n = match socket.read(&mut tmp).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => n,
                    };
                    buf.extend_from_slice(&tmp[..n]);
                    if let Some(pos) = find_subslice(&buf, b"\r\n\r\n") {
                        break pos + 4;
                    }
                };

                let headers = String::from_utf8_lossy(&buf[..header_end]).to_string();
                let content_length = headers
                    .lines()
                    .find_map(|line| {
                        let (key, value) = line.split_once(':')?;
                        if key.eq_ignore_ascii_case("content-length") {
                            value.trim().parse::<usize>().ok()
                        } else {
                            None
                        }
                    })
                    .unwrap_or(0);

                let mut remaining = content_length.saturating_sub(buf.len() - header_end);
                while remaining > 0 {
                    match socket.read(&mut tmp).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => remaining = remaining.saturating_sub(n),
                    }
                }

                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_line,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{}", addr)
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// A port that was bound once and released, so connections are refused.
async fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

fn sample_file(dir: &tempfile::TempDir, len: usize) -> SelectedFile {
    let path = dir.path().join("orchard.jpg");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(&vec![0xABu8; len]).unwrap();
    SelectedFile {
        path,
        name: "orchard.jpg".to_string(),
        size: len as u64,
        mime: "image/jpeg",
    }
}

#[tokio::test]
async fn successful_upload_maps_the_response_and_reports_progress() {
    let url = spawn_server(
        "200 OK",
        r#"{
            "treeCount": 42,
            "confidence": 87.5,
            "processingTime": 12.3,
            "processingMethod": "tiled",
            "tilesProcessed": 7,
            "detections": [
                {"confidence": 91.0, "bbox": {"x": 1, "y": 2, "width": 3, "height": 4}}
            ]
        }"#,
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let file = sample_file(&dir, 256 * 1024);

    let seen: Arc<Mutex<Vec<u64>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let result = detect_client::detect_trees(&url, &file, move |pct| {
        sink.lock().unwrap().push(pct);
    })
    .await
    .unwrap();

    assert_eq!(result.tree_count, 42);
    assert_eq!(result.processing_method, ProcessingMethod::Tiled);
    assert_eq!(result.tiles_processed, Some(7));
    assert_eq!(result.detections.len(), 1);

    let notice = detect_client::processing_notice(&result);
    assert!(notice.message.contains("7 tiles were processed"));

    let seen = seen.lock().unwrap();
    assert!(!seen.is_empty());
    assert_eq!(*seen.first().unwrap(), 0);
    assert_eq!(*seen.last().unwrap(), 100);
    for pair in seen.windows(2) {
        assert!(pair[0] <= pair[1], "progress went backwards: {:?}", *seen);
    }
    assert!(seen.iter().all(|p| *p <= 100));
}

#[tokio::test]
async fn error_status_builds_a_server_error_from_the_detail_field() {
    let url = spawn_server("500 Internal Server Error", r#"{"detail": "OOM"}"#).await;

    let dir = tempfile::tempdir().unwrap();
    let file = sample_file(&dir, 1024);

    let err = detect_client::detect_trees(&url, &file, |_| {})
        .await
        .unwrap_err();

    assert_eq!(
        err,
        AppError::Server {
            status: 500,
            detail: "OOM".to_string()
        }
    );
    let msg = err.to_string();
    assert!(msg.contains("500"));
    assert!(msg.contains("OOM"));
}

#[tokio::test]
async fn connection_failure_names_the_configured_url() {
    let url = dead_url().await;

    let dir = tempfile::tempdir().unwrap();
    let file = sample_file(&dir, 1024);

    let err = detect_client::detect_trees(&url, &file, |_| {})
        .await
        .unwrap_err();

    assert_eq!(err, AppError::Network { url: url.clone() });
    let msg = err.to_string();
    assert!(msg.contains(&url));
    // A network error carries no status code.
    assert!(!msg.contains("Server error"));
}

#[tokio::test]
async fn malformed_success_body_is_an_unexpected_error() {
    let url = spawn_server("200 OK", r#"{"unexpected": "shape"}"#).await;

    let dir = tempfile::tempdir().unwrap();
    let file = sample_file(&dir, 512);

    let err = detect_client::detect_trees(&url, &file, |_| {})
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unexpected(_)));
}

#[tokio::test]
async fn probe_reports_connected_for_any_2xx() {
    let url = spawn_server("200 OK", r#"{"message": "Tree Detection API is running"}"#).await;
    assert_eq!(
        detect_client::check_connection(&url).await,
        ServiceStatus::Connected
    );
}

#[tokio::test]
async fn probe_reports_disconnected_on_error_status_or_no_server() {
    let url = spawn_server("503 Service Unavailable", r#"{"detail": "warming up"}"#).await;
    assert_eq!(
        detect_client::check_connection(&url).await,
        ServiceStatus::Disconnected
    );

    let url = dead_url().await;
    assert_eq!(
        detect_client::check_connection(&url).await,
        ServiceStatus::Disconnected
    );
}
