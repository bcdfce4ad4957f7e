//! Request failures and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

/// Anything that stops a wheel from being drawn. There is no partial chart.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to load template: {0:#}")]
    Template(anyhow::Error),
    #[error("Failed to read activities: {0:#}")]
    Sheet(anyhow::Error),
    #[error("Failed to render dashboard: {0:#}")]
    Render(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        error!("{}", message);
        (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
    }
}
