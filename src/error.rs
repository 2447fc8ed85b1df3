use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

use crate::client::ApiError;
use crate::client::holidays::HolidayBatchError;
use crate::extraction::ExtractionError;
use crate::form::{FieldIssue, FormError};
use crate::utils::document::DocumentError;

/// Errors returned by the admin handlers, rendered as `{"message": ...}`.
#[derive(Debug, Display)]
pub enum AdminError {
    #[display(fmt = "Draft not found")]
    DraftNotFound,

    #[display(fmt = "Employee not found")]
    EmployeeNotFound,

    #[display(fmt = "{}", _0)]
    BadRequest(String),

    /// Submission blocked by field issues.
    #[display(fmt = "Please correct the highlighted fields")]
    Invalid(Vec<FieldIssue>),

    #[display(fmt = "{}", _0)]
    Extraction(ExtractionError),

    #[display(fmt = "{}", _0)]
    Upstream(ApiError),

    #[display(fmt = "{}", _0)]
    Batch(HolidayBatchError),

    #[display(fmt = "Something went wrong, Contact with system admin")]
    Internal(String),
}

impl std::error::Error for AdminError {}

impl AdminError {
    fn upstream_status(e: &ApiError) -> StatusCode {
        match e {
            ApiError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Aborted { .. } | ApiError::Request(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_GATEWAY,
        }
    }
}

impl ResponseError for AdminError {
    fn status_code(&self) -> StatusCode {
        match self {
            AdminError::DraftNotFound | AdminError::EmployeeNotFound => StatusCode::NOT_FOUND,
            AdminError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AdminError::Invalid(_) | AdminError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AdminError::Upstream(e) => Self::upstream_status(e),
            AdminError::Batch(HolidayBatchError::NothingToSubmit) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AdminError::Batch(HolidayBatchError::Interrupted { source, .. }) => {
                Self::upstream_status(source)
            }
            AdminError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AdminError::Invalid(issues) => json!({ "message": self.to_string(), "issues": issues }),
            AdminError::Batch(HolidayBatchError::Interrupted { added, .. }) => {
                json!({ "message": self.to_string(), "added": added })
            }
            AdminError::Internal(detail) => {
                tracing::error!(error = %detail, "Internal error");
                json!({ "message": self.to_string() })
            }
            _ => json!({ "message": self.to_string() }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

impl From<ApiError> for AdminError {
    fn from(e: ApiError) -> Self {
        AdminError::Upstream(e)
    }
}

impl From<ExtractionError> for AdminError {
    fn from(e: ExtractionError) -> Self {
        AdminError::Extraction(e)
    }
}

impl From<HolidayBatchError> for AdminError {
    fn from(e: HolidayBatchError) -> Self {
        AdminError::Batch(e)
    }
}

impl From<FormError> for AdminError {
    fn from(e: FormError) -> Self {
        AdminError::BadRequest(e.to_string())
    }
}

impl From<DocumentError> for AdminError {
    fn from(e: DocumentError) -> Self {
        AdminError::BadRequest(e.to_string())
    }
}
