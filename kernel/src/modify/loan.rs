use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::{BookId, Loan, LoanId, ReturnedAt};
use crate::KernelError;

/// Loan transitions are guarded the same way as copy counts: `None`
/// means the row was missing or its state no longer allowed the
/// transition, never that half of it was applied.
#[async_trait::async_trait]
pub trait LoanModifier: 'static + Sync + Send {
    type Transaction: Transaction;
    async fn create(
        &self,
        con: &mut Self::Transaction,
        loan: &Loan,
    ) -> error_stack::Result<(), KernelError>;
    /// Closes the loan. Guard: still active.
    async fn mark_returned(
        &self,
        con: &mut Self::Transaction,
        id: &LoanId,
        returned_at: &ReturnedAt,
    ) -> error_stack::Result<Option<Loan>, KernelError>;
    /// Moves the loan to another book. Guard: still active.
    async fn reassign(
        &self,
        con: &mut Self::Transaction,
        id: &LoanId,
        book_id: &BookId,
    ) -> error_stack::Result<Option<Loan>, KernelError>;
    /// Soft delete. Guard: returned and not already deleted.
    async fn delete(
        &self,
        con: &mut Self::Transaction,
        id: &LoanId,
    ) -> error_stack::Result<Option<Loan>, KernelError>;
}

pub trait DependOnLoanModifier: 'static + Sync + Send + DependOnDatabaseConnection {
    type LoanModifier: LoanModifier<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn loan_modifier(&self) -> &Self::LoanModifier;
}
