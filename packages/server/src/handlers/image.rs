use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use common::storage::{ContentHash, ImageStore};
use sea_orm::EntityTrait;
use tokio_util::io::ReaderStream;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::image;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::MaybeAuthMember;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/images/{image_id}",
    tag = "Images",
    operation_id = "downloadImage",
    summary = "Download a stored image",
    description = "Streams a representative, example or certification image from the image \
        store. Supports ETag-based caching via If-None-Match. Certification images are only \
        served to the member they belong to; everyone else receives 404.",
    params(("image_id" = String, Path, description = "Image ID (UUID)")),
    responses(
        (status = 200, description = "Image content"),
        (status = 304, description = "Not Modified (ETag match)"),
        (status = 404, description = "Image not found or not accessible (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, viewer, headers), fields(image_id = %image_id))]
pub async fn download_image(
    viewer: MaybeAuthMember,
    State(state): State<AppState>,
    Path(image_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let image_model = image::Entity::find_by_id(image_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Image not found".into()))?;

    if image_model.owner_type == image::OWNER_CERTIFICATION {
        // owner_id is "{challenge_id}:{member_id}"; only that member may see
        // the photo. 404 instead of 403 to prevent enumeration.
        let owner_suffix = viewer
            .0
            .as_ref()
            .map(|auth| format!(":{}", auth.member_id));
        let is_owner = matches!(owner_suffix, Some(ref s) if image_model.owner_id.ends_with(s));
        if !is_owner {
            return Err(AppError::NotFound("Image not found".into()));
        }
    }

    let etag_value = format!("\"{}\"", image_model.content_hash);
    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && let Ok(val) = if_none_match.to_str()
        && (val == etag_value || val == "*")
    {
        return Ok(StatusCode::NOT_MODIFIED.into_response());
    }

    let hash = ContentHash::from_hex(&image_model.content_hash)
        .map_err(|e| AppError::Internal(format!("Corrupt content hash in image row: {e}")))?;
    let reader = state.images.get_stream(&hash).await?;
    let body = Body::from_stream(ReaderStream::new(reader));

    let content_type = image_model
        .content_type
        .as_deref()
        .unwrap_or("application/octet-stream");

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, image_model.size.to_string())
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_value(&image_model.filename),
        )
        .header(header::ETAG, &etag_value)
        .header(header::CACHE_CONTROL, "private, max-age=3600")
        .body(body)
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))?;

    Ok(response)
}

/// Build a safe inline `Content-Disposition` header value. Filenames were
/// validated at upload time, but quoting rules still apply.
fn content_disposition_value(filename: &str) -> String {
    let ascii_safe: String = filename
        .chars()
        .filter(|c| c.is_ascii_graphic() && !matches!(c, '"' | ';' | '\\'))
        .collect();
    let ascii_name = if ascii_safe.is_empty() {
        "image".to_string()
    } else {
        ascii_safe
    };
    format!("inline; filename=\"{ascii_name}\"")
}
