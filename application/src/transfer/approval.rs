use time::OffsetDateTime;
use uuid::Uuid;

use kernel::prelude::entity::{
    AdminNotes, ApprovalRequest, ApprovalRequestId, DestructApprovalRequest, RequestData,
    RequestType, ResourceId, SelectLimit, SelectOffset,
};

#[derive(Debug, Clone)]
pub struct ApprovalRequestDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub request_type: String,
    pub resource_id: Option<Uuid>,
    pub request_data: String,
    pub status: String,
    pub admin_id: Option<Uuid>,
    pub admin_notes: Option<String>,
    pub requested_at: OffsetDateTime,
    pub processed_at: Option<OffsetDateTime>,
}

impl From<ApprovalRequest> for ApprovalRequestDto {
    fn from(value: ApprovalRequest) -> Self {
        let DestructApprovalRequest {
            id,
            user_id,
            request_type,
            resource_id,
            request_data,
            status,
            admin_id,
            admin_notes,
            requested_at,
            processed_at,
        } = value.into_destruct();
        Self {
            id: id.into(),
            user_id: user_id.into(),
            request_type: request_type.into(),
            resource_id: resource_id.map(Uuid::from),
            request_data: request_data.into(),
            status: status.as_ref().to_string(),
            admin_id: admin_id.map(Uuid::from),
            admin_notes: admin_notes.map(String::from),
            requested_at: requested_at.into(),
            processed_at: processed_at.map(OffsetDateTime::from),
        }
    }
}

pub struct SubmitApprovalDto {
    pub request_type: RequestType,
    pub resource_id: Option<ResourceId>,
    pub request_data: RequestData,
}

pub struct DecideApprovalDto {
    pub id: ApprovalRequestId,
    pub admin_notes: Option<AdminNotes>,
}

/// Full replacement of the requested change; partial edits are not a
/// thing the workflow offers.
pub struct UpdateApprovalDto {
    pub id: ApprovalRequestId,
    pub request_type: RequestType,
    pub resource_id: Option<ResourceId>,
    pub request_data: RequestData,
}

pub struct DeleteApprovalDto {
    pub id: ApprovalRequestId,
}

pub struct GetApprovalDto {
    pub id: ApprovalRequestId,
}

pub struct GetAllApprovalDto {
    pub limit: SelectLimit,
    pub offset: SelectOffset,
}
