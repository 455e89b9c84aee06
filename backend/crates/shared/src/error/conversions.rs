//! Error conversions - From / IntoResponse implementations
//!
//! Library errors the portal meets at its edges, mapped onto [`AppError`].

#[cfg(any(feature = "reqwest", feature = "axum"))]
use super::app_error::AppError;
#[cfg(feature = "reqwest")]
use super::kind::ErrorKind;

// ============================================================================
// reqwest conversions (feature-gated)
// ============================================================================

#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::new(ErrorKind::GatewayTimeout, "Upstream service timed out").with_source(err)
        } else if err.is_connect() {
            AppError::service_unavailable("Upstream service unreachable").with_source(err)
        } else if let Some(status) = err.status() {
            let kind = ErrorKind::from_upstream_status(status.as_u16());
            AppError::new(kind, format!("Upstream service responded with {status}"))
                .with_source(err)
        } else if err.is_decode() {
            AppError::new(ErrorKind::BadGateway, "Upstream service sent an unreadable response")
                .with_source(err)
        } else {
            AppError::new(ErrorKind::BadGateway, "Upstream request failed").with_source(err)
        }
    }
}

// ============================================================================
// Axum conversions (feature-gated)
// ============================================================================

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // RFC 7807 Problem Details for HTTP APIs
        let body = serde_json::json!({
            "type": format!("https://httpstatuses.io/{}", self.status_code()),
            "title": self.kind().as_str(),
            "status": self.status_code(),
            "detail": self.message(),
            "action": self.action(),
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(all(test, feature = "axum"))]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn test_problem_details_response() {
        let response = AppError::service_unavailable("Authentication service is unavailable")
            .with_action("Try again in a moment")
            .into_response();

        assert_eq!(response.status(), axum::http::StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            response.headers()[axum::http::header::CONTENT_TYPE],
            "application/json"
        );
    }
}
