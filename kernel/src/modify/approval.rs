use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::{ApprovalRequest, ApprovalRequestId};
use crate::KernelError;

#[async_trait::async_trait]
pub trait ApprovalModifier: 'static + Sync + Send {
    type Transaction: Transaction;
    async fn create(
        &self,
        con: &mut Self::Transaction,
        request: &ApprovalRequest,
    ) -> error_stack::Result<(), KernelError>;
    /// Writes a decided request back. Guard: the stored row is still
    /// `pending`, so a request can be processed at most once even under
    /// racing admins.
    async fn process(
        &self,
        con: &mut Self::Transaction,
        request: &ApprovalRequest,
    ) -> error_stack::Result<Option<ApprovalRequest>, KernelError>;
    /// Rewrites the requested change. Guard: still `pending`.
    async fn update(
        &self,
        con: &mut Self::Transaction,
        request: &ApprovalRequest,
    ) -> error_stack::Result<Option<ApprovalRequest>, KernelError>;
    /// Physical delete; pending rows are not history yet. Guard: still
    /// `pending`.
    async fn delete(
        &self,
        con: &mut Self::Transaction,
        id: &ApprovalRequestId,
    ) -> error_stack::Result<Option<ApprovalRequestId>, KernelError>;
}

pub trait DependOnApprovalModifier: 'static + Sync + Send + DependOnDatabaseConnection {
    type ApprovalModifier: ApprovalModifier<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn approval_modifier(&self) -> &Self::ApprovalModifier;
}
