use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::{ApprovalRequest, ApprovalRequestId, SelectLimit, SelectOffset};
use crate::KernelError;

#[async_trait::async_trait]
pub trait ApprovalQuery: 'static + Sync + Send {
    type Transaction: Transaction;
    async fn find_by_id(
        &self,
        con: &mut Self::Transaction,
        id: &ApprovalRequestId,
    ) -> error_stack::Result<Option<ApprovalRequest>, KernelError>;
    async fn find_all(
        &self,
        con: &mut Self::Transaction,
        limit: &SelectLimit,
        offset: &SelectOffset,
    ) -> error_stack::Result<Vec<ApprovalRequest>, KernelError>;
}

pub trait DependOnApprovalQuery: 'static + Sync + Send + DependOnDatabaseConnection {
    type ApprovalQuery: ApprovalQuery<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn approval_query(&self) -> &Self::ApprovalQuery;
}
