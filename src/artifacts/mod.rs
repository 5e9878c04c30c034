use std::future::Future;

use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        rejection::{JsonRejection, PathRejection},
        DefaultBodyLimit, Path, RawQuery, State,
    },
    Json,
};
use serde_json::Value;
use tracing::Instrument;

use crate::backend::{normalize, Operation, RawResponse};
use crate::error::ProxyError;
use crate::models::{
    common, ApiResponse, ArtifactQuery, ArtifactUpload, FileContent, FilePart, FormValue,
    RequestContext, UpdateArtifactMeta,
};
use crate::AppState;

pub fn routes(max_upload_bytes: usize) -> axum::Router<AppState> {
    axum::Router::new()
        .route(
            "/:disk_id/artifact",
            axum::routing::get(get_artifact)
                .post(upload_artifact)
                .put(update_artifact_meta)
                .delete(delete_artifact),
        )
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

/// GET /api/disk/:disk_id/artifact?file_path=...
pub async fn get_artifact(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    RawQuery(query): RawQuery,
) -> Result<ApiResponse<Value>, ProxyError> {
    let ctx = context(path)?;
    let file_path = ArtifactQuery::parse(query.as_deref()).require_file_path()?;

    let data = forward(
        Operation::Read,
        &ctx,
        state.backend.get_artifact(&ctx, &file_path),
    )
    .await?;
    check_content(&data);

    Ok(ApiResponse::success(data))
}

/// POST /api/disk/:disk_id/artifact
/// Multipart form with `file`, `file_path` and an optional `meta`.
pub async fn upload_artifact(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<ApiResponse<Value>, ProxyError> {
    let ctx = context(path)?;
    let mut multipart = multipart
        .map_err(|_| ProxyError::validation("request body must be multipart/form-data"))?;
    let upload = ArtifactUpload::from_fields(read_form(&mut multipart).await?)?;

    let data = forward(
        Operation::Create,
        &ctx,
        state.backend.upload_artifact(&ctx, upload),
    )
    .await?;

    Ok(ApiResponse::success(data))
}

/// PUT /api/disk/:disk_id/artifact
/// JSON body `{ "file_path": ..., "meta": ... }`.
pub async fn update_artifact_meta(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<ApiResponse<Value>, ProxyError> {
    let ctx = context(path)?;
    let Json(body) = body.map_err(|_| ProxyError::validation("request body must be a JSON object"))?;
    let update = UpdateArtifactMeta::from_body(&body)?;

    let data = forward(
        Operation::Update,
        &ctx,
        state.backend.update_artifact_meta(&ctx, &update),
    )
    .await?;

    Ok(ApiResponse::success(data))
}

/// DELETE /api/disk/:disk_id/artifact?file_path=...
pub async fn delete_artifact(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    RawQuery(query): RawQuery,
) -> Result<ApiResponse<Value>, ProxyError> {
    let ctx = context(path)?;
    let file_path = ArtifactQuery::parse(query.as_deref()).require_file_path()?;

    let data = forward(
        Operation::Delete,
        &ctx,
        state.backend.delete_artifact(&ctx, &file_path),
    )
    .await?;

    Ok(ApiResponse::success(data))
}

/// Start the per-call context from the `disk_id` path segment.
fn context(path: Result<Path<String>, PathRejection>) -> Result<RequestContext, ProxyError> {
    let Path(disk_id) = path.map_err(|e| {
        tracing::debug!(error = %e, "unusable disk_id path segment");
        ProxyError::validation("disk_id is invalid")
    })?;
    RequestContext::new(disk_id)
}

/// Await one backend call and normalize its response.
async fn forward<F>(op: Operation, ctx: &RequestContext, call: F) -> Result<Value, ProxyError>
where
    F: Future<Output = Result<RawResponse, ProxyError>>,
{
    let span = tracing::info_span!(
        "artifact",
        operation = %op,
        disk_id = %ctx.disk_id,
        request_id = %ctx.request_id
    );

    async move {
        tracing::debug!("forwarding to backend");
        call.await.and_then(|raw| normalize(op, raw))
    }
    .instrument(span)
    .await
}

/// Parsed file content attached to a read is passed through as-is; a shape
/// mismatch is only reported in the logs.
fn check_content(data: &Value) {
    let Some(content) = data.get("content").filter(|c| !c.is_null()) else {
        return;
    };
    if let Err(e) = common::parse::<FileContent>(content) {
        tracing::warn!(error = %e, "backend returned unexpected file content shape");
    }
}

async fn read_form(multipart: &mut Multipart) -> Result<Vec<(String, FormValue)>, ProxyError> {
    let mut fields = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(invalid_form)? {
        let name = field.name().unwrap_or_default().to_string();
        let value = match field.file_name().map(str::to_owned) {
            Some(file_name) => {
                let content_type = field.content_type().map(str::to_owned);
                let bytes = field.bytes().await.map_err(invalid_form)?;
                FormValue::File(FilePart {
                    file_name,
                    content_type,
                    bytes,
                })
            }
            None => FormValue::Text(field.text().await.map_err(invalid_form)?),
        };
        fields.push((name, value));
    }

    Ok(fields)
}

fn invalid_form(e: axum::extract::multipart::MultipartError) -> ProxyError {
    ProxyError::validation(format!("invalid multipart body: {}", e.body_text()))
}
