//! Health check handlers.

use axum::{extract::State, http::StatusCode};

use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the credential store does not answer
/// or the auth service can no longer issue sessions.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    if state.auth().is_degraded() {
        return StatusCode::SERVICE_UNAVAILABLE;
    }

    match state.auth().store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::routes;
    use crate::state::testing::{failing_state, test_state};

    async fn ready_status(state: AppState) -> StatusCode {
        routes::app(state)
            .oneshot(Request::get("/health/ready").body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_ready_with_reachable_store() {
        let (state, _) = test_state();
        assert_eq!(ready_status(state).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_not_ready_when_store_is_down() {
        assert_eq!(ready_status(failing_state()).await, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_not_ready_after_random_source_failure() {
        let (state, _) = test_state();
        state.auth().mark_degraded();
        assert_eq!(ready_status(state.clone()).await, StatusCode::SERVICE_UNAVAILABLE);

        // Liveness is unaffected
        let response = routes::app(state)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
