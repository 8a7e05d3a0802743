//! HTTP Server - dashboard page and figure updates
//!
//! Endpoints:
//! - GET  /            → Dashboard page
//! - POST /api/figure  → Chart for the posted selection

use axum::{
    extract::State,
    middleware,
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;

use crate::access_log;
use crate::chart;
use crate::filter::Selection;
use crate::page;
use crate::state::AppState;

/// Build the router; shared by `serve` and the tests
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/figure", post(update_figure))
        .layer(middleware::from_fn_with_state(state.clone(), access_log::record))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server
pub async fn serve(state: AppState, port: u16) -> anyhow::Result<()> {
    tracing::info!("Initializing HTTP server on port {}", port);
    let rows = state.table.len();
    let logging_access = state.access_log.is_some();
    let app = router(state);

    let addr = format!("0.0.0.0:{}", port);
    tracing::info!("Starting server on http://localhost:{}", port);
    tracing::info!("  Rows loaded: {}", rows);
    tracing::info!("  Access log: {}", if logging_access { "enabled" } else { "disabled" });

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server bound to {}", addr);
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}

/// GET / - Dashboard page
async fn index(State(state): State<AppState>) -> impl IntoResponse {
    tracing::debug!("GET /");
    Html(page::render_page(&state.table, &state.page))
}

/// POST /api/figure - Re-render the chart for a selection
async fn update_figure(
    State(state): State<AppState>,
    Json(selection): Json<Selection>,
) -> impl IntoResponse {
    if selection.is_unfiltered() {
        tracing::info!("POST /api/figure (no filters)");
    } else {
        tracing::info!(
            "POST /api/figure sensor={:?} signal={:?} track={:?}",
            selection.sensor, selection.signal, selection.track
        );
    }
    let figure = chart::render(&state.table, &selection);
    tracing::debug!("Returning figure with {} points", figure.point_count());
    Json(figure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access_log::AccessSink;
    use crate::config::PageConfig;
    use crate::dataset::{row, Table};
    use axum::body::{to_bytes, Body};
    use axum::extract::ConnectInfo;
    use axum::http::{header, Request, StatusCode};
    use chrono::{DateTime, Local};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tower::ServiceExt;

    #[derive(Default)]
    struct MemorySink {
        lines: Mutex<Vec<String>>,
    }

    impl AccessSink for MemorySink {
        fn append(&self, timestamp: DateTime<Local>, client: &str) -> std::io::Result<()> {
            self.lines
                .lock()
                .unwrap()
                .push(access_log::format_line(timestamp, client));
            Ok(())
        }
    }

    struct FailingSink;

    impl AccessSink for FailingSink {
        fn append(&self, _: DateTime<Local>, _: &str) -> std::io::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"))
        }
    }

    fn test_table() -> Table {
        Table::from_rows(vec![
            row("Accelerometer", "FFT", "Rail corrugation", 3.0, "A;B;C"),
            row("Laser", "Wavelet", "Alignment", 1.0, "D"),
            row("Camera", "FFT", "Track gauge", 2.0, "E;F"),
        ])
    }

    fn test_state() -> AppState {
        AppState::new(test_table(), PageConfig::default())
    }

    fn figure_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/figure")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
        to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
    }

    #[tokio::test]
    async fn test_index_serves_page() {
        let response = router(test_state())
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = String::from_utf8(body_bytes(response).await).unwrap();
        assert!(html.contains("<option value=\"Camera\">Camera</option>"));
        assert!(html.contains("id=\"signal-dropdown\""));
    }

    #[tokio::test]
    async fn test_figure_matches_render() {
        let state = test_state();
        let response = router(state.clone())
            .oneshot(figure_request(r#"{"sensor": ["Camera", "Accelerometer"], "signal": null}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let selection = Selection::new(vec!["Camera", "Accelerometer"], vec![], vec![]);
        let expected = serde_json::to_vec(&chart::render(&state.table, &selection)).unwrap();
        assert_eq!(body_bytes(response).await, expected);
    }

    #[tokio::test]
    async fn test_figure_empty_body_object_returns_all_rows() {
        let response = router(test_state()).oneshot(figure_request("{}")).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(
            json["data"][0]["x"],
            serde_json::json!(["Accelerometer", "Laser", "Camera"])
        );
    }

    #[tokio::test]
    async fn test_figure_rejects_malformed_json() {
        let response = router(test_state())
            .oneshot(figure_request("{\"sensor\": "))
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let response = router(test_state())
            .oneshot(Request::builder().uri("/api/options").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_access_log_records_client_ip() {
        let sink = Arc::new(MemorySink::default());
        let state = test_state().with_access_log(sink.clone());

        let mut request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let peer: SocketAddr = "203.0.113.9:51000".parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(peer));

        let response = router(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // The write happens on a blocking task after the response
        let mut lines = Vec::new();
        for _ in 0..50 {
            lines = sink.lines.lock().unwrap().clone();
            if !lines.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with(" - 203.0.113.9\n"));
    }

    #[tokio::test]
    async fn test_access_log_failure_does_not_fail_request() {
        let state = test_state().with_access_log(Arc::new(FailingSink));
        let response = router(state).oneshot(figure_request("{}")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
