//! Request handlers.

use crate::server::error::ApiError;
use crate::server::response::PredictResponse;
use crate::server::AppState;
use crate::utils::decode_rgb;
use axum::Json;
use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use serde_json::json;
use tracing::debug;

/// Accepted multipart field names for the uploaded image.
fn is_image_field(name: Option<&str>) -> bool {
    matches!(name, Some("image") | Some("file"))
}

/// POST /predict: runs the full detection pipeline on one uploaded image.
///
/// Decoding and inference are CPU-bound, so both run on the blocking pool
/// rather than the async executor.
pub async fn predict(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<PredictResponse>, ApiError> {
    let mut payload: Option<Bytes> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidRequest(e.to_string()))?
    {
        if is_image_field(field.name()) {
            payload = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::InvalidRequest(e.to_string()))?,
            );
            break;
        }
    }

    let bytes = payload
        .filter(|bytes| !bytes.is_empty())
        .ok_or(ApiError::MissingUpload)?;
    debug!(bytes = bytes.len(), "received image upload");

    let analyzer = state.analyzer.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let image = decode_rgb(&bytes).map_err(ApiError::ImageDecode)?;
        analyzer.analyze(&image).map_err(ApiError::from)
    })
    .await
    .map_err(|e| {
        ApiError::Internal(crate::core::errors::DetectError::invalid_input(format!(
            "worker task failed: {e}"
        )))
    })??;

    Ok(Json(PredictResponse::from_outcome(&outcome)?))
}

/// GET /health: liveness probe answered without touching any model.
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /favicon.ico: browsers request it against the API origin; answer
/// empty instead of a noisy 404.
pub async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_field_accepts_both_historical_names() {
        assert!(is_image_field(Some("image")));
        assert!(is_image_field(Some("file")));
        assert!(!is_image_field(Some("photo")));
        assert!(!is_image_field(None));
    }
}
