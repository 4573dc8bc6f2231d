//! Error handling for HTTP handlers
//!
//! Services return `anyhow::Result`; handlers convert the error into
//! [`AppError`], whose `ResponseError` impl picks the status code and body
//! from the [`SuperManagerError`] carried inside.

use std::fmt::{Display, Formatter};

use actix_web::HttpResponse;
use actix_web::http::StatusCode;

pub use supermanager_common::error::{
    AUTHENTICATION_FAILED, CORE_RECORD_PROTECTED, DATA_ACCESS_ERROR, INVALID, NOT_AUTHENTICATED,
    NOT_FOUND, PARSE_ERROR, PERMISSION_DENIED, SERVER_ERROR, TOKEN_NOT_VALID,
};
pub use supermanager_common::{ErrorCode, FieldErrors, SuperManagerError};

use crate::model::response::Detail;

// Local wrapper for application errors to implement actix-web error handling
// (Cannot impl foreign trait for foreign type due to orphan rules)
#[derive(Debug)]
pub struct AppError {
    inner: anyhow::Error,
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(value: anyhow::Error) -> Self {
        AppError { inner: value }
    }
}

impl From<SuperManagerError> for AppError {
    fn from(value: SuperManagerError) -> Self {
        AppError {
            inner: value.into(),
        }
    }
}

impl From<FieldErrors> for AppError {
    fn from(value: FieldErrors) -> Self {
        SuperManagerError::Validation(value).into()
    }
}

impl AppError {
    pub fn inner(&self) -> &anyhow::Error {
        &self.inner
    }

    pub fn downcast_ref<E: std::error::Error + Send + Sync + 'static>(&self) -> Option<&E> {
        self.inner.downcast_ref::<E>()
    }
}

impl actix_web::error::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self.downcast_ref::<SuperManagerError>() {
            Some(
                SuperManagerError::IllegalArgument(_)
                | SuperManagerError::Validation(_)
                | SuperManagerError::CoreRecordProtected(_),
            ) => StatusCode::BAD_REQUEST,
            Some(
                SuperManagerError::NotAuthenticated
                | SuperManagerError::AuthenticationFailed(_)
                | SuperManagerError::TokenNotValid(_),
            ) => StatusCode::UNAUTHORIZED,
            Some(SuperManagerError::PermissionDenied) => StatusCode::FORBIDDEN,
            Some(SuperManagerError::NotFound) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        match self.downcast_ref::<SuperManagerError>() {
            Some(SuperManagerError::Validation(errors)) => HttpResponse::build(status).json(errors),
            Some(SuperManagerError::TokenNotValid(message)) => {
                let message = if message.is_empty() {
                    TOKEN_NOT_VALID.message
                } else {
                    message.as_str()
                };
                HttpResponse::build(status).json(Detail::with_code(message, TOKEN_NOT_VALID.code))
            }
            Some(e) => {
                if status.is_server_error() {
                    tracing::error!(code = e.error_code().code, "Request failed: {}", e);
                }
                HttpResponse::build(status).json(Detail::new(e.to_string()))
            }
            None => {
                tracing::error!("Request failed: {:#}", self.inner);
                HttpResponse::build(status).json(Detail::new(self.inner.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::ResponseError;
    use actix_web::body::to_bytes;

    use super::*;

    async fn body(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.error_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[actix_rt::test]
    async fn test_validation_renders_field_map() {
        let err = AppError::from(SuperManagerError::field("title", "This field is required."));
        let (status, json) = body(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, serde_json::json!({"title": ["This field is required."]}));
    }

    #[actix_rt::test]
    async fn test_core_record_protected() {
        let err = AppError::from(SuperManagerError::CoreRecordProtected("locations".to_string()));
        let (status, json) = body(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["detail"], "Only superadmins can edit core locations.");
    }

    #[actix_rt::test]
    async fn test_auth_errors() {
        let (status, json) = body(SuperManagerError::NotAuthenticated.into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["detail"], "Authentication credentials were not provided.");

        let (status, json) = body(SuperManagerError::TokenNotValid(String::new()).into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            json,
            serde_json::json!({"detail": "Token is invalid.", "code": "token_not_valid"})
        );

        let (status, json) = body(SuperManagerError::PermissionDenied.into()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["detail"], "You do not have permission to perform this action.");
    }

    #[actix_rt::test]
    async fn test_not_found_and_unknown() {
        let (status, json) = body(SuperManagerError::NotFound.into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json, serde_json::json!({"detail": "Not found."}));

        let (status, json) = body(anyhow::anyhow!("boom").into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["detail"], "boom");
    }

    #[test]
    fn test_app_error_from_anyhow() {
        let app_err = AppError::from(anyhow::anyhow!("test error"));
        assert_eq!(format!("{}", app_err), "test error");
        assert!(app_err.downcast_ref::<SuperManagerError>().is_none());
    }
}
