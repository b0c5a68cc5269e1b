use crate::controller::TryExhaust;
use application::transfer::ApprovalRequestDto;
use axum::response::{IntoResponse, Response};
use error_stack::{Report, ResultExt};
use kernel::KernelError;
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct CreatedApprovalResponse {
    id: Uuid,
}

impl IntoResponse for CreatedApprovalResponse {
    fn into_response(self) -> Response {
        (axum::http::StatusCode::CREATED, axum::Json(self)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct ApprovalResponse {
    id: Uuid,
    user_id: Uuid,
    request_type: String,
    resource_id: Option<Uuid>,
    request_data: serde_json::Value,
    status: String,
    admin_id: Option<Uuid>,
    admin_notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    requested_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    processed_at: Option<OffsetDateTime>,
}

impl IntoResponse for ApprovalResponse {
    fn into_response(self) -> Response {
        (axum::http::StatusCode::OK, axum::Json(self)).into_response()
    }
}

pub struct CreatedApprovalPresenter;

impl TryExhaust<ApprovalRequestDto> for CreatedApprovalPresenter {
    type To = CreatedApprovalResponse;
    type Error = Report<KernelError>;
    fn emit(&self, input: ApprovalRequestDto) -> Result<Self::To, Self::Error> {
        Ok(CreatedApprovalResponse { id: input.id })
    }
}

pub struct ApprovalPresenter;

impl TryExhaust<()> for ApprovalPresenter {
    type To = ();
    type Error = Report<KernelError>;
    fn emit(&self, input: ()) -> Result<Self::To, Self::Error> {
        Ok(input)
    }
}

impl TryExhaust<ApprovalRequestDto> for ApprovalPresenter {
    type To = ApprovalResponse;
    type Error = Report<KernelError>;
    fn emit(&self, input: ApprovalRequestDto) -> Result<Self::To, Self::Error> {
        // Payloads are stored as JSON text; hand them back structured.
        let request_data = serde_json::from_str(&input.request_data)
            .change_context_lazy(|| KernelError::Internal)?;
        Ok(ApprovalResponse {
            id: input.id,
            user_id: input.user_id,
            request_type: input.request_type,
            resource_id: input.resource_id,
            request_data,
            status: input.status,
            admin_id: input.admin_id,
            admin_notes: input.admin_notes,
            requested_at: input.requested_at,
            processed_at: input.processed_at,
        })
    }
}

impl TryExhaust<Option<ApprovalRequestDto>> for ApprovalPresenter {
    type To = Option<ApprovalResponse>;
    type Error = Report<KernelError>;
    fn emit(&self, input: Option<ApprovalRequestDto>) -> Result<Self::To, Self::Error> {
        input.map(|request| self.emit(request)).transpose()
    }
}

impl TryExhaust<Vec<ApprovalRequestDto>> for ApprovalPresenter {
    type To = axum::Json<Vec<ApprovalResponse>>;
    type Error = Report<KernelError>;
    fn emit(&self, input: Vec<ApprovalRequestDto>) -> Result<Self::To, Self::Error> {
        let requests = input
            .into_iter()
            .map(|request| self.emit(request))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(axum::Json(requests))
    }
}
