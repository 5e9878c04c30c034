use axum::body::Bytes;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::error::ProxyError;

/// Per-call context, created when a request arrives and dropped with it.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: Uuid,
    pub disk_id: String,
}

impl RequestContext {
    pub fn new(disk_id: String) -> Result<Self, ProxyError> {
        if disk_id.is_empty() {
            return Err(ProxyError::validation("disk_id is required"));
        }

        Ok(Self {
            request_id: Uuid::new_v4(),
            disk_id,
        })
    }
}

/// Query string accepted by the read and delete endpoints.
#[derive(Debug, Default)]
pub struct ArtifactQuery {
    pub file_path: Option<String>,
}

impl ArtifactQuery {
    /// Decode a raw query string. Unknown keys are ignored and a repeated
    /// `file_path` keeps its first value.
    pub fn parse(query: Option<&str>) -> Self {
        let file_path = url::form_urlencoded::parse(query.unwrap_or_default().as_bytes())
            .find(|(key, _)| key == "file_path")
            .map(|(_, value)| value.into_owned());

        Self { file_path }
    }

    pub fn require_file_path(self) -> Result<String, ProxyError> {
        non_empty(self.file_path).ok_or_else(|| ProxyError::validation("file_path is required"))
    }
}

/// Body of the metadata update sent to the backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateArtifactMeta {
    pub file_path: String,
    pub meta: String,
}

impl UpdateArtifactMeta {
    /// Validate an untyped JSON body; both fields must be non-empty strings.
    pub fn from_body(body: &Value) -> Result<Self, ProxyError> {
        let file_path = string_field(body, "file_path")
            .ok_or_else(|| ProxyError::validation("file_path is required"))?;
        let meta =
            string_field(body, "meta").ok_or_else(|| ProxyError::validation("meta is required"))?;

        Ok(Self { file_path, meta })
    }
}

/// Uploaded file part, buffered in memory and forwarded as-is.
#[derive(Debug, Clone)]
pub struct FilePart {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// One field of an inbound multipart form.
#[derive(Debug, Clone)]
pub enum FormValue {
    Text(String),
    File(FilePart),
}

#[derive(Debug, Clone)]
pub struct ArtifactUpload {
    pub file: FilePart,
    pub file_path: String,
    pub meta: Option<String>,
}

impl ArtifactUpload {
    /// Build an upload from form fields in arrival order. The first field with a
    /// given name wins.
    pub fn from_fields(fields: Vec<(String, FormValue)>) -> Result<Self, ProxyError> {
        let mut file = None;
        let mut file_path = None;
        let mut meta = None;

        for (name, value) in fields {
            let slot = match name.as_str() {
                "file" => &mut file,
                "file_path" => &mut file_path,
                "meta" => &mut meta,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }

        let file = match file {
            Some(FormValue::File(part)) => part,
            _ => return Err(ProxyError::validation("file is required")),
        };

        let file_path = match file_path {
            Some(FormValue::Text(path)) if !path.is_empty() => path,
            _ => return Err(ProxyError::validation("file_path is required")),
        };

        let meta = match meta {
            Some(FormValue::Text(meta)) if !meta.is_empty() => Some(meta),
            _ => None,
        };

        Ok(Self {
            file,
            file_path,
            meta,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn string_field(body: &Value, field: &str) -> Option<String> {
    non_empty(body.get(field).and_then(Value::as_str).map(str::to_owned))
}
