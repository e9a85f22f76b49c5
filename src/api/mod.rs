//! HTTP surface

pub mod colors;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::limit::RequestBodyLimitLayer;

use crate::db::ColorCatalog;
use crate::models::MatchError;
use crate::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Match(#[from] MatchError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Match(MatchError::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            ApiError::Match(MatchError::CatalogUnavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Match(MatchError::TransformFailure(_)) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("request failed: {self}");
        } else {
            log::debug!("request rejected: {self}");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Build the API router over any catalog
pub fn router<C: ColorCatalog + 'static>(state: AppState<C>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/api/colors", get(colors::list_colors::<C>))
        .route("/api/colors/find-closest", post(colors::find_closest::<C>))
        .route("/api/colors/suggest-mix", post(colors::suggest_mix::<C>))
        .route("/api/colors/mix", post(colors::mix::<C>))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransformError;

    #[test]
    fn error_status_mapping() {
        let cases = [
            (ApiError::from(MatchError::InvalidInput("x".into())), 400),
            (ApiError::from(MatchError::CatalogUnavailable("x".into())), 503),
            (ApiError::from(MatchError::from(TransformError::NonFinite)), 500),
            (ApiError::Internal("x".into()), 500),
        ];
        for (err, code) in cases {
            assert_eq!(err.status().as_u16(), code);
        }
    }
}
