//! Route tests driven through the router without binding a socket

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use pretty_assertions::assert_eq;
use tower::ServiceExt;
use waterfall_cli::server::StatusResponse;
use waterfall_cli::{router, AppState, ServiceConfig};

const PLAN: &str = "\
task,assignee,start,due,end
Requirements,Alice,2021-01-10,2021-01-20,2021-01-25
Design,Bob,2021-01-18,2021-02-01,2021-02-10
Backend,Alice,2021-02-01,2021-02-20,2021-03-15
";

const BOUNDARY: &str = "waterfall-test-boundary";

fn app(dir: &tempfile::TempDir) -> Router {
    let config = ServiceConfig {
        storage_dir: dir.path().join("uploads"),
        dpi: 96.0,
        ..ServiceConfig::default()
    };
    router(Arc::new(AppState::new(config).unwrap()))
}

fn multipart_body(field: &str, filename: &str, content: &str) -> String {
    format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
         Content-Type: text/csv\r\n\
         \r\n\
         {content}\r\n\
         --{BOUNDARY}--\r\n"
    )
}

fn upload_request(field: &str, filename: &str, content: &str) -> Request<Body> {
    Request::post("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(field, filename, content)))
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

async fn json_body(response: axum::response::Response) -> StatusResponse {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

async fn upload(app: &Router, filename: &str, content: &str) -> StatusResponse {
    let response = app
        .clone()
        .oneshot(upload_request("file", filename, content))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    json_body(response).await
}

#[tokio::test]
async fn health_check_reports_ok() {
    let dir = tempfile::tempdir().unwrap();
    let response = app(&dir)
        .oneshot(Request::get("/api/health_check").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body.status, "ok");
    assert!(!body.message.is_empty());
}

#[tokio::test]
async fn upload_then_download() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir);

    let body = upload(&app, "plan.csv", PLAN).await;
    assert_eq!(body.status, "ok");
    assert_eq!(body.filename.as_deref(), Some("plan.csv"));
    assert!(dir.path().join("uploads/plan.csv").exists());

    let response = app
        .oneshot(Request::get("/api/download/plan.csv").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"plan.csv\""
    );
    assert_eq!(body_bytes(response).await, PLAN.as_bytes());
}

#[tokio::test]
async fn upload_strips_client_directories() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir);

    let body = upload(&app, "../../escape.csv", PLAN).await;
    assert_eq!(body.filename.as_deref(), Some("escape.csv"));
    assert!(dir.path().join("uploads/escape.csv").exists());
    assert!(!dir.path().join("escape.csv").exists());
}

#[tokio::test]
async fn upload_without_file_field_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let response = app(&dir)
        .oneshot(upload_request("attachment", "plan.csv", PLAN))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await.status, "error");
}

#[tokio::test]
async fn download_missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let response = app(&dir)
        .oneshot(Request::get("/api/download/nope.csv").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body.status, "error");
    assert!(body.message.contains("nope.csv"));
}

#[tokio::test]
async fn chart_returns_png_attachment() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir);
    upload(&app, "plan.csv", PLAN).await;

    let response = app
        .oneshot(
            Request::post("/api/chart/plan.csv?title=Launch")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"gantt.png\""
    );
    let png = body_bytes(response).await;
    assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
}

#[tokio::test]
async fn chart_of_header_only_csv_is_unprocessable() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir);
    upload(&app, "empty.csv", "task,assignee,start,due,end\n").await;

    let response = app
        .oneshot(Request::post("/api/chart/empty.csv").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json_body(response).await.message.contains("no tasks to render"));
}

#[tokio::test]
async fn chart_of_unknown_file_has_no_data() {
    let dir = tempfile::tempdir().unwrap();
    let response = app(&dir)
        .oneshot(Request::post("/api/chart/missing.csv").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json_body(response).await.message.contains("no tasks to render"));
}

#[tokio::test]
async fn chart_with_malformed_date_is_unprocessable() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir);
    upload(
        &app,
        "bad.csv",
        "task,assignee,start,due,end\nA,Alice,2021-13-40,2021-01-20,2021-01-25\n",
    )
    .await;

    let response = app
        .oneshot(Request::post("/api/chart/bad.csv").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json_body(response).await.message.contains("2021-13-40"));
}
