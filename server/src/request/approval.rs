use crate::controller::Intake;
use application::transfer::{
    DecideApprovalDto, DeleteApprovalDto, GetAllApprovalDto, GetApprovalDto, SubmitApprovalDto,
    UpdateApprovalDto,
};
use kernel::prelude::entity::{
    AdminNotes, ApprovalRequestId, RequestData, RequestType, ResourceId, SelectLimit, SelectOffset,
};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct SubmitApprovalRequest {
    request_type: String,
    resource_id: Option<Uuid>,
    request_data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct UpdateApprovalRequest {
    request_type: String,
    resource_id: Option<Uuid>,
    request_data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct DecideApprovalRequest {
    admin_notes: Option<String>,
}

#[derive(Debug)]
pub struct DeleteApprovalRequest {
    id: Uuid,
}

impl DeleteApprovalRequest {
    pub fn new(id: Uuid) -> Self {
        Self { id }
    }
}

#[derive(Debug)]
pub struct GetApprovalRequest {
    id: Uuid,
}

impl GetApprovalRequest {
    pub fn new(id: Uuid) -> Self {
        Self { id }
    }
}

#[derive(Debug, Deserialize)]
pub struct GetAllApprovalRequest {
    #[serde(default)]
    limit: SelectLimit,
    #[serde(default)]
    offset: SelectOffset,
}

pub struct ApprovalTransformer;

impl Intake<SubmitApprovalRequest> for ApprovalTransformer {
    type To = SubmitApprovalDto;
    fn emit(&self, input: SubmitApprovalRequest) -> Self::To {
        SubmitApprovalDto {
            request_type: RequestType::new(input.request_type),
            resource_id: input.resource_id.map(ResourceId::new),
            request_data: RequestData::new(input.request_data.to_string()),
        }
    }
}

impl Intake<(Uuid, UpdateApprovalRequest)> for ApprovalTransformer {
    type To = UpdateApprovalDto;
    fn emit(&self, input: (Uuid, UpdateApprovalRequest)) -> Self::To {
        let (id, input) = input;
        UpdateApprovalDto {
            id: ApprovalRequestId::new(id),
            request_type: RequestType::new(input.request_type),
            resource_id: input.resource_id.map(ResourceId::new),
            request_data: RequestData::new(input.request_data.to_string()),
        }
    }
}

impl Intake<(Uuid, DecideApprovalRequest)> for ApprovalTransformer {
    type To = DecideApprovalDto;
    fn emit(&self, input: (Uuid, DecideApprovalRequest)) -> Self::To {
        let (id, input) = input;
        DecideApprovalDto {
            id: ApprovalRequestId::new(id),
            admin_notes: input.admin_notes.map(AdminNotes::new),
        }
    }
}

impl Intake<DeleteApprovalRequest> for ApprovalTransformer {
    type To = DeleteApprovalDto;
    fn emit(&self, input: DeleteApprovalRequest) -> Self::To {
        DeleteApprovalDto {
            id: ApprovalRequestId::new(input.id),
        }
    }
}

impl Intake<GetApprovalRequest> for ApprovalTransformer {
    type To = GetApprovalDto;
    fn emit(&self, input: GetApprovalRequest) -> Self::To {
        GetApprovalDto {
            id: ApprovalRequestId::new(input.id),
        }
    }
}

impl Intake<GetAllApprovalRequest> for ApprovalTransformer {
    type To = GetAllApprovalDto;
    fn emit(&self, input: GetAllApprovalRequest) -> Self::To {
        GetAllApprovalDto {
            limit: input.limit,
            offset: input.offset,
        }
    }
}
