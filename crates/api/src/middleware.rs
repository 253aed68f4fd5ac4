use axum::body::{to_bytes, Body};
use axum::extract::DefaultBodyLimit;
use axum::http::{header, StatusCode};
use axum::middleware::map_response;
use axum::response::{IntoResponse, Json, Response};
use axum::Router;
use laponia_models::ErrorShape;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Upper bound on a rejection body read back for rewriting.
const MAX_REJECTION_BODY: usize = 64 * 1024;

/// Request tracing, permissive CORS for browser frontends, JSON error bodies
/// and a body size cap.
pub fn apply_middleware(router: Router, body_limit_mb: u64) -> Router {
    let body_limit = (body_limit_mb * 1024 * 1024) as usize;
    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .layer(map_response(json_error_body))
            .layer(DefaultBodyLimit::max(body_limit)),
    )
}

/// Rewrite error responses that axum produced itself (405, 413, extractor
/// rejections) into an `ErrorShape`. JSON error bodies pass through.
pub async fn json_error_body(response: Response) -> Response {
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) || is_json(&response) {
        return response;
    }

    let (parts, body) = response.into_parts();
    let text = to_bytes(body, MAX_REJECTION_BODY)
        .await
        .map(|bytes| String::from_utf8_lossy(&bytes).trim().to_string())
        .unwrap_or_default();
    let error = if text.is_empty() {
        status.canonical_reason().unwrap_or("Error").to_string()
    } else {
        text
    };

    let mut rewritten = (
        status,
        Json(ErrorShape {
            error,
            error_type: error_type_for(status).to_string(),
        }),
    )
        .into_response();

    // keep Allow, CORS and similar headers from the original response
    for (name, value) in parts.headers.iter() {
        if name != header::CONTENT_TYPE && name != header::CONTENT_LENGTH {
            rewritten.headers_mut().append(name.clone(), value.clone());
        }
    }
    rewritten
}

fn is_json(response: &Response<Body>) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map_or(false, |ct| ct.starts_with("application/json"))
}

fn error_type_for(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "InvalidRequest",
        StatusCode::NOT_FOUND => "NotFound",
        StatusCode::METHOD_NOT_ALLOWED => "MethodNotAllowed",
        StatusCode::PAYLOAD_TOO_LARGE => "PayloadTooLarge",
        StatusCode::UNSUPPORTED_MEDIA_TYPE => "UnsupportedMediaType",
        s if s.is_server_error() => "InternalError",
        _ => "InvalidRequest",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn plain_text_rejection_becomes_error_shape() {
        let rejection = (
            StatusCode::BAD_REQUEST,
            "Failed to deserialize query string",
        )
            .into_response();

        let rewritten = json_error_body(rejection).await;
        assert_eq!(rewritten.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(rewritten).await,
            serde_json::json!({
                "error": "Failed to deserialize query string",
                "error_type": "InvalidRequest"
            })
        );
    }

    #[tokio::test]
    async fn json_errors_and_successes_pass_through() {
        let shaped = (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorShape {
                error: "Chatbot não inicializado corretamente".to_string(),
                error_type: "ServiceUnavailable".to_string(),
            }),
        )
            .into_response();
        let body = body_json(json_error_body(shaped).await).await;
        assert_eq!(body["error_type"], "ServiceUnavailable");

        let ok = json_error_body("metrics text".into_response()).await;
        assert_eq!(ok.status(), StatusCode::OK);
        let bytes = to_bytes(ok.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"metrics text");
    }
}
