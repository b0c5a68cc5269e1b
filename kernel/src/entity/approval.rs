mod id;
mod kind;
mod notes;
mod payload;
mod period;
mod status;

pub use self::{id::*, kind::*, notes::*, payload::*, period::*, status::*};
use crate::entity::UserId;
use crate::KernelError;
use destructure::{Destructure, Mutation};
use error_stack::Report;

/// State machine over a requested change: `pending` until an admin
/// resolves it, then immutable. `admin_id` and `processed_at` are set
/// exactly when the status leaves `pending`.
#[derive(Debug, Clone, Eq, PartialEq, Destructure, Mutation)]
pub struct ApprovalRequest {
    id: ApprovalRequestId,
    user_id: UserId,
    request_type: RequestType,
    resource_id: Option<ResourceId>,
    request_data: RequestData,
    status: ApprovalStatus,
    admin_id: Option<UserId>,
    admin_notes: Option<AdminNotes>,
    requested_at: RequestedAt,
    processed_at: Option<ProcessedAt>,
}

impl ApprovalRequest {
    pub fn submitted(
        id: ApprovalRequestId,
        user_id: UserId,
        request_type: RequestType,
        resource_id: Option<ResourceId>,
        request_data: RequestData,
        requested_at: RequestedAt,
    ) -> Self {
        Self {
            id,
            user_id,
            request_type,
            resource_id,
            request_data,
            status: ApprovalStatus::Pending,
            admin_id: None,
            admin_notes: None,
            requested_at,
            processed_at: None,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: ApprovalRequestId,
        user_id: UserId,
        request_type: RequestType,
        resource_id: Option<ResourceId>,
        request_data: RequestData,
        status: ApprovalStatus,
        admin_id: Option<UserId>,
        admin_notes: Option<AdminNotes>,
        requested_at: RequestedAt,
        processed_at: Option<ProcessedAt>,
    ) -> Self {
        Self {
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
        }
    }

    pub fn id(&self) -> &ApprovalRequestId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn request_type(&self) -> &RequestType {
        &self.request_type
    }

    pub fn resource_id(&self) -> Option<&ResourceId> {
        self.resource_id.as_ref()
    }

    pub fn request_data(&self) -> &RequestData {
        &self.request_data
    }

    pub fn status(&self) -> &ApprovalStatus {
        &self.status
    }

    pub fn admin_id(&self) -> Option<&UserId> {
        self.admin_id.as_ref()
    }

    pub fn admin_notes(&self) -> Option<&AdminNotes> {
        self.admin_notes.as_ref()
    }

    pub fn requested_at(&self) -> &RequestedAt {
        &self.requested_at
    }

    pub fn processed_at(&self) -> Option<&ProcessedAt> {
        self.processed_at.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.status.is_pending()
    }

    /// The one legal transition: `pending` to `approved` or `rejected`,
    /// stamping the deciding admin and the decision time together.
    pub fn process(
        mut self,
        status: ApprovalStatus,
        admin_id: UserId,
        admin_notes: Option<AdminNotes>,
        processed_at: ProcessedAt,
    ) -> error_stack::Result<Self, KernelError> {
        if status.is_pending() {
            return Err(Report::new(KernelError::Validation)
                .attach_printable("A request cannot be processed back into pending"));
        }
        if !self.is_pending() {
            return Err(Report::new(KernelError::InvalidState).attach_printable(format!(
                "Request {} is already {}",
                self.id.as_ref(),
                self.status.as_ref()
            )));
        }
        self.substitute(|request| {
            *request.status = status;
            *request.admin_id = Some(admin_id);
            *request.admin_notes = admin_notes;
            *request.processed_at = Some(processed_at);
        });
        Ok(self)
    }
}
