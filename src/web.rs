use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::{self, AppState};
use crate::config::AdsbConfig;
use crate::{AdsbError, Result};

/// Full application router: docs, health and the `/api` endpoints
pub fn app(state: AppState, request_timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(api::index))
        .route("/health", get(api::health))
        .nest("/api", api::router())
        .with_state(state)
        .layer(middleware::from_fn_with_state(request_timeout, enforce_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Abort slow requests with the regular JSON failure body
async fn enforce_timeout(State(limit): State<Duration>, request: Request, next: Next) -> Response {
    match tokio::time::timeout(limit, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(timeout = ?limit, "Request timed out");
            AdsbError::provider_unavailable(format!("Request timed out after {}ms", limit.as_millis()))
                .into_response()
        }
    }
}

pub async fn run(config: &AdsbConfig, state: AppState) -> Result<()> {
    let timeout = Duration::from_secs(config.server.request_timeout_seconds.into());
    let app = app(state, timeout);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("ADS-B tracking API running at http://{}", addr);
    tracing::info!("API documentation: http://{}/", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Unable to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeodesicCalculator;
    use crate::tracking::TrackingService;
    use crate::tracking::tests::FakeProvider;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let tracking = TrackingService::new(Arc::new(FakeProvider::default()), GeodesicCalculator::default());
        app(AppState { tracking }, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_index_lists_endpoints() {
        let response = test_app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        let endpoints = body["endpoints"].as_object().unwrap();
        assert_eq!(endpoints.len(), 5);
        assert!(endpoints.contains_key("calculate_route_distance"));
    }

    #[tokio::test]
    async fn test_timeout_uses_failure_body() {
        let slow = Router::new()
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    "late"
                }),
            )
            .layer(middleware::from_fn_with_state(Duration::from_millis(10), enforce_timeout));

        let response = slow
            .oneshot(Request::builder().uri("/slow").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error_kind"], "provider_unavailable");
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_cors_headers() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header("origin", "http://example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
    }
}
