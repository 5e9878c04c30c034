use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{ser::SerializeStruct, Serialize, Serializer};

/// Caller-facing response body.
///
/// Serializes as `{"success": true, "data": ...}` or
/// `{"success": false, "error": "..."}`; exactly one payload field is present.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse<T> {
    Success(T),
    Failure(String),
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        ApiResponse::Success(data)
    }

    pub fn failure(error: impl Into<String>) -> Self {
        ApiResponse::Failure(error.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ApiResponse::Success(_))
    }
}

impl<T: Serialize> Serialize for ApiResponse<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ApiResponse", 2)?;
        match self {
            ApiResponse::Success(data) => {
                state.serialize_field("success", &true)?;
                state.serialize_field("data", data)?;
            }
            ApiResponse::Failure(error) => {
                state.serialize_field("success", &false)?;
                state.serialize_field("error", error)?;
            }
        }
        state.end()
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = if self.is_success() {
            StatusCode::OK
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_serialization() {
        let response = ApiResponse::success(json!({ "a": 1 }));
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "success": true, "data": { "a": 1 } })
        );
    }

    #[test]
    fn test_failure_serialization() {
        let response = ApiResponse::<()>::failure("file_path is required");
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "success": false, "error": "file_path is required" })
        );
    }

    #[test]
    fn test_into_response_status() {
        assert_eq!(
            ApiResponse::success(json!({})).into_response().status(),
            StatusCode::OK
        );
        assert_eq!(
            ApiResponse::<()>::failure("boom").into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
