//! End-to-end: column info -> matrix -> batched HTTP loads -> files on disk

use std::time::Duration;

use scattergrid::loader::{FetchError, ImageSource};
use scattergrid::matrix::{MatrixSettings, PlotContext, ScatterplotMatrix, parse_columns_info};
use scattergrid::{BatchedImageLoader, DirectorySurface, HttpImageSource, ViewLifetime};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Minimal HTTP/1.1 responder: `/missing` answers 404, `/hang` never answers,
/// everything else returns a small body.
async fn spawn_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((mut sock, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let mut buf = [0u8; 8192];
                let n = sock.read(&mut buf).await.unwrap_or(0);
                let request = String::from_utf8_lossy(&buf[..n]).to_string();
                if request.starts_with("GET /hang") {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    return;
                }
                let (status, body) = if request.starts_with("GET /missing") {
                    ("404 Not Found", "")
                } else {
                    ("200 OK", "PNGDATA")
                };
                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: image/png\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = sock.write_all(response.as_bytes()).await;
                let _ = sock.shutdown().await;
            });
        }
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn test_http_source_success_and_status_error() {
    let server = spawn_server().await;
    let source = HttpImageSource::new(None).unwrap();

    let bytes = source.fetch(&format!("{server}/plot")).await.unwrap();
    assert_eq!(bytes, b"PNGDATA");

    match source.fetch(&format!("{server}/missing")).await {
        Err(FetchError::Status { status, .. }) => assert_eq!(status, 404),
        other => panic!("expected 404, got {other:?}"),
    }
}

#[tokio::test]
async fn test_http_timeout_turns_hang_into_failure() {
    let server = spawn_server().await;
    let source = HttpImageSource::new(Some(Duration::from_millis(200))).unwrap();
    let res = source.fetch(&format!("{server}/hang")).await;
    assert!(matches!(res, Err(FetchError::Request(_))));
}

#[tokio::test]
async fn test_matrix_thumbnails_written_to_directory() {
    let server = spawn_server().await;
    let columns = parse_columns_info(
        r#"[
            {"name": "height", "is_numeric": true},
            {"name": "city", "is_numeric": false},
            {"name": "weight", "is_numeric": true},
            {"name": "age", "is_numeric": true}
        ]"#,
    )
    .unwrap();
    let context = PlotContext {
        server: server.parse().unwrap(),
        project: "7".to_string(),
        engine: serde_json::json!({"facets": [], "mode": "row-based"}),
    };
    let matrix =
        ScatterplotMatrix::build(&columns, Some("weight"), MatrixSettings::default(), &context)
            .unwrap();
    assert_eq!(matrix.descriptors().len(), 3);

    let dir = TempDir::new().unwrap();
    let mut surface = DirectorySurface::new(dir.path()).unwrap();
    let loader = BatchedImageLoader::new(HttpImageSource::new(None).unwrap(), 2).unwrap();
    let report = loader
        .run(matrix.descriptors(), ViewLifetime::new(), &mut surface)
        .await
        .unwrap();

    assert_eq!(report.loaded, 3);
    assert_eq!(report.failed, 0);
    let mut names: Vec<String> = surface
        .written()
        .iter()
        .map(|p| {
            let name = p.file_name().unwrap().to_string_lossy().to_string();
            // Drop the settle-order prefix.
            name[4..].to_string()
        })
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "height-x-vs-age-y.png",
            "height-x-vs-weight-y.png",
            "weight-x-vs-age-y.png",
        ]
    );
    for path in surface.written() {
        assert_eq!(std::fs::read(path).unwrap(), b"PNGDATA");
    }
}
