use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use chart_render::RenderError;
use thiserror::Error;

/// Request-time failures. Malformed widget input is never one of these; it
/// is ignored and the previous value is kept.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("unknown demo {0:?}")]
    UnknownDemo(String),
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::UnknownDemo(name) => {
                tracing::warn!(demo = %name, "unknown demo requested");
                let page = ui::render_not_implemented_page(&name, "");
                (StatusCode::NOT_FOUND, Html(page)).into_response()
            }
            AppError::Render(err) => {
                tracing::error!(error = %err, "chart render failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "failed to render chart").into_response()
            }
        }
    }
}
