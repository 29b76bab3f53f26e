use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use paradox_lib::wire::ErrorBody;
use paradox_lib::Error;

/// Error response: a status code and a short `{"error": ...}` body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Storage failures get the generic `failure` message; their detail has
    /// already been logged by the catalog.
    pub fn from_catalog(err: Error, failure: &'static str) -> Self {
        match err {
            Error::NotFound { .. } => ApiError::new(StatusCode::NOT_FOUND, err.to_string()),
            Error::Validation(msg) => ApiError::new(StatusCode::BAD_REQUEST, msg),
            Error::Conflict(msg) => ApiError::new(StatusCode::CONFLICT, msg),
            Error::Unauthorized => ApiError::new(StatusCode::UNAUTHORIZED, err.to_string()),
            Error::Storage(_) => ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, failure),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/// Maps catalog errors to responses, see [`ApiError::from_catalog`].
pub trait OrFail<T> {
    fn or_fail(self, failure: &'static str) -> Result<T, ApiError>;
}

impl<T> OrFail<T> for paradox_lib::Result<T> {
    fn or_fail(self, failure: &'static str) -> Result<T, ApiError> {
        self.map_err(|e| ApiError::from_catalog(e, failure))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paradox_lib::StoreError;

    fn status_of(err: Error) -> StatusCode {
        Err::<(), _>(err).or_fail("Failed").unwrap_err().status()
    }

    #[test]
    fn taxonomy_maps_to_status_codes() {
        assert_eq!(status_of(Error::NotFound { entity: "Item" }), StatusCode::NOT_FOUND);
        assert_eq!(status_of(Error::Validation("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(Error::Conflict("x".into())), StatusCode::CONFLICT);
        assert_eq!(status_of(Error::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_of(Error::Storage(StoreError::Io(std::io::Error::other("boom")))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn storage_detail_is_not_exposed() {
        let err = Err::<(), _>(Error::Storage(StoreError::Io(std::io::Error::other(
            "/secret/path",
        ))))
        .or_fail("Failed to create item")
        .unwrap_err();
        assert_eq!(err.message, "Failed to create item");
    }
}
