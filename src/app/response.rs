use crate::core::negotiate::RendererRegistry;
use crate::core::render::Rendered;
use crate::utils::error::{ApiError, ErrorCategory, Result, INTERNAL_ERROR_MESSAGE};
use axum::body::Body;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

impl IntoResponse for Rendered {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// 成功時直接輸出；失敗時經由協商器輸出 `{"message": ...}`
pub fn respond(
    renderers: &RendererRegistry,
    accept: Option<&str>,
    result: Result<Rendered>,
) -> Response {
    match result {
        Ok(rendered) => rendered.into_response(),
        Err(err) => error_response(renderers, accept, &err),
    }
}

pub fn error_response(renderers: &RendererRegistry, accept: Option<&str>, err: &ApiError) -> Response {
    log_error(err);

    match renderers.render_error(accept, err) {
        Ok(rendered) => rendered.into_response(),
        Err(render_err) => {
            tracing::error!("❌ Failed to render error response: {}", render_err);
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE).into_response()
        }
    }
}

fn log_error(err: &ApiError) {
    match err.category() {
        ErrorCategory::Client => {
            tracing::debug!("↩️ {} {}", err.status_code().as_u16(), err)
        }
        ErrorCategory::Unimplemented => tracing::warn!("🚧 {}", err),
        category => {
            tracing::error!(
                "❌ Request failed: {} (Category: {:?}, Severity: {:?})",
                err,
                category,
                err.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", err.recovery_suggestion());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::render::XhtmlRenderer;
    use axum::http::header::{CONTENT_TYPE, VARY};
    use http_body_util::BodyExt;
    use std::sync::Arc;

    fn registry() -> RendererRegistry {
        RendererRegistry::standard(Arc::new(XhtmlRenderer::new().unwrap()))
    }

    async fn body_string(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_internal_errors_hide_details() {
        let err = ApiError::MissingAttribute {
            attribute: "gid".to_string(),
            object: "project 'hgi'".to_string(),
        };
        let response = error_response(&registry(), None, &err);

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        let body = body_string(response).await;
        assert!(!body.contains("gid"));
        assert!(body.contains(INTERNAL_ERROR_MESSAGE));
    }

    #[tokio::test]
    async fn test_successful_render_passes_through() {
        let registry = registry();
        let rendered = registry.render(
            Some("text/plain"),
            &serde_json::json!({"gid": 1234}),
            StatusCode::OK,
        );
        let response = respond(&registry, Some("text/plain"), rendered);

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain");
        assert_eq!(response.headers()[VARY], "accept");
        assert_eq!(body_string(response).await, r#"{"gid":1234}"#);
    }
}
