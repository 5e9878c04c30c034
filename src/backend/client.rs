use std::time::Instant;

use reqwest::multipart::{Form, Part};
use url::Url;

use crate::backend::envelope::{Operation, RawResponse};
use crate::config::BackendConfig;
use crate::error::ProxyError;
use crate::models::{ArtifactUpload, FilePart, RequestContext, UpdateArtifactMeta};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Forwards validated artifact operations to the backend, one request each.
pub struct BackendClient {
    http: reqwest::Client,
    base_url: Url,
    token: String,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(http: reqwest::Client, config: &BackendConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.clone(),
            token: config.bearer_token(),
        }
    }

    /// GET the artifact at `file_path` on the context's disk.
    pub async fn get_artifact(
        &self,
        ctx: &RequestContext,
        file_path: &str,
    ) -> Result<RawResponse, ProxyError> {
        let url = self.artifact_url(&ctx.disk_id)?;
        let request = self.http.get(url).query(&[("file_path", file_path)]);
        self.send(Operation::Read, ctx, request).await
    }

    /// POST a multipart upload.
    pub async fn upload_artifact(
        &self,
        ctx: &RequestContext,
        upload: ArtifactUpload,
    ) -> Result<RawResponse, ProxyError> {
        let url = self.artifact_url(&ctx.disk_id)?;

        let mut form = Form::new()
            .part("file", file_part(upload.file))
            .text("file_path", upload.file_path);
        if let Some(meta) = upload.meta {
            form = form.text("meta", meta);
        }

        let request = self.http.post(url).multipart(form);
        self.send(Operation::Create, ctx, request).await
    }

    /// PUT new metadata for an artifact.
    pub async fn update_artifact_meta(
        &self,
        ctx: &RequestContext,
        update: &UpdateArtifactMeta,
    ) -> Result<RawResponse, ProxyError> {
        let url = self.artifact_url(&ctx.disk_id)?;
        let request = self.http.put(url).json(update);
        self.send(Operation::Update, ctx, request).await
    }

    pub async fn delete_artifact(
        &self,
        ctx: &RequestContext,
        file_path: &str,
    ) -> Result<RawResponse, ProxyError> {
        let url = self.artifact_url(&ctx.disk_id)?;
        let request = self.http.delete(url).query(&[("file_path", file_path)]);
        self.send(Operation::Delete, ctx, request).await
    }

    fn artifact_url(&self, disk_id: &str) -> Result<Url, ProxyError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                ProxyError::Internal(format!("backend URL {} cannot be a base", self.base_url))
            })?;
            segments
                .pop_if_empty()
                .extend(["api", "v1", "disk", disk_id, "artifact"]);
        }
        Ok(url)
    }

    async fn send(
        &self,
        op: Operation,
        ctx: &RequestContext,
        request: reqwest::RequestBuilder,
    ) -> Result<RawResponse, ProxyError> {
        let started = Instant::now();

        let response = request
            .bearer_auth(&self.token)
            .header(REQUEST_ID_HEADER, ctx.request_id.to_string())
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        tracing::debug!(
            operation = %op,
            disk_id = %ctx.disk_id,
            request_id = %ctx.request_id,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "backend responded"
        );

        Ok(RawResponse { status, body })
    }
}

fn file_part(file: FilePart) -> Part {
    let FilePart {
        file_name,
        content_type,
        bytes,
    } = file;
    let part = || Part::bytes(bytes.to_vec()).file_name(file_name.clone());

    match content_type {
        Some(content_type) => part().mime_str(&content_type).unwrap_or_else(|e| {
            tracing::warn!(%content_type, error = %e, "dropping unparsable file content type");
            part()
        }),
        None => part(),
    }
}
