use crate::api::v1::handler::ApiResponse;
use crate::application_port::*;
use serde::Serialize;
use std::convert::Infallible;
use thiserror::Error;
use tracing::{error, warn};
use warp::http::StatusCode;
use warp::{Rejection, reject};

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    if let Some(failure) = err.find::<ApiFailure>() {
        let json = warp::reply::json(&ApiResponse::<()>::err(
            failure.code.clone(),
            failure.message.clone(),
        ));
        Ok(warp::reply::with_status(json, failure.code.status()))
    } else if err.is_not_found() {
        let json = warp::reply::json(&ApiResponse::<()>::err(
            ApiErrorCode::NotFound,
            "no such route",
        ));
        Ok(warp::reply::with_status(json, StatusCode::NOT_FOUND))
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        let json = warp::reply::json(&ApiResponse::<()>::err(
            ApiErrorCode::InvalidArgument,
            e.to_string(),
        ));
        Ok(warp::reply::with_status(json, StatusCode::BAD_REQUEST))
    } else if let Some(e) = err.find::<warp::reject::InvalidQuery>() {
        let json = warp::reply::json(&ApiResponse::<()>::err(
            ApiErrorCode::InvalidArgument,
            e.to_string(),
        ));
        Ok(warp::reply::with_status(json, StatusCode::BAD_REQUEST))
    } else {
        let json = warp::reply::json(&ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(ApiError {
                code: ApiErrorCode::InternalError,
                message: format!("Unhandled error: {:?}", err),
            }),
        });
        Ok(warp::reply::with_status(
            json,
            StatusCode::INTERNAL_SERVER_ERROR,
        ))
    }
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Eq, PartialEq, Error, Serialize)]
pub enum ApiErrorCode {
    #[error("Invalid argument")]
    InvalidArgument,
    #[error("Already exists")]
    AlreadyExists,
    #[error("Not found")]
    NotFound,
    #[error("Failed precondition")]
    FailedPrecondition,
    #[error("Deadline exceeded")]
    DeadlineExceeded,
    #[error("Internal error")]
    InternalError,
}

impl ApiErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiErrorCode::InvalidArgument => StatusCode::BAD_REQUEST,
            ApiErrorCode::AlreadyExists => StatusCode::CONFLICT,
            ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
            ApiErrorCode::FailedPrecondition => StatusCode::PRECONDITION_FAILED,
            ApiErrorCode::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
            ApiErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ErrorKind> for ApiErrorCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::InvalidArgument => ApiErrorCode::InvalidArgument,
            ErrorKind::AlreadyExists => ApiErrorCode::AlreadyExists,
            ErrorKind::NotFound => ApiErrorCode::NotFound,
            ErrorKind::FailedPrecondition => ApiErrorCode::FailedPrecondition,
            ErrorKind::Internal => ApiErrorCode::InternalError,
        }
    }
}

/// A rejection carrying the client-facing error. Internal details are logged, not returned.
#[derive(Debug)]
pub struct ApiFailure {
    pub code: ApiErrorCode,
    pub message: String,
}

impl ApiFailure {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        ApiFailure {
            code: ApiErrorCode::InvalidArgument,
            message: message.into(),
        }
    }

    pub fn deadline_exceeded() -> Self {
        warn!("request deadline exceeded");
        ApiFailure {
            code: ApiErrorCode::DeadlineExceeded,
            message: "request did not finish in time".to_string(),
        }
    }
}

impl reject::Reject for ApiFailure {}

impl From<RelationError> for ApiFailure {
    fn from(error: RelationError) -> Self {
        let code = ApiErrorCode::from(error.kind());
        let message = match code {
            ApiErrorCode::InternalError => {
                error!("internal error: {error:#}");
                code.to_string()
            }
            _ => error.to_string(),
        };
        ApiFailure { code, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kinds_map_to_statuses() {
        let cases = [
            (RelationError::InvalidArgument("x".into()), 400),
            (RelationError::AlreadyExists("x".into()), 409),
            (RelationError::NotFound("x".into()), 404),
            (RelationError::FailedPrecondition("x".into()), 412),
            (RelationError::Store("x".into()), 500),
        ];
        for (error, status) in cases {
            assert_eq!(ApiFailure::from(error).code.status().as_u16(), status);
        }
    }

    #[test]
    fn store_details_stay_out_of_the_response() {
        let failure = ApiFailure::from(RelationError::Store("password=hunter2".into()));
        assert!(!failure.message.contains("hunter2"));
    }
}
