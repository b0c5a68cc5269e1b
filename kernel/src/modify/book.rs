use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::{Book, BookId, TotalCopies};
use crate::KernelError;

/// Copy-count mutations are compare-and-swap operations: each one
/// applies only while its guard holds and reports back the updated row,
/// or `None` when no row qualified. Callers disambiguate `None` with a
/// follow-up read inside the same transaction.
#[async_trait::async_trait]
pub trait BookModifier: 'static + Sync + Send {
    type Transaction: Transaction;
    async fn create(
        &self,
        con: &mut Self::Transaction,
        book: &Book,
    ) -> error_stack::Result<(), KernelError>;
    /// Rewrites title and ISBN. Copy counts move only through the
    /// dedicated operations below.
    async fn update(
        &self,
        con: &mut Self::Transaction,
        book: &Book,
    ) -> error_stack::Result<(), KernelError>;
    /// Takes one copy. Guard: book active and `copies_available > 0`.
    async fn reserve_copy(
        &self,
        con: &mut Self::Transaction,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError>;
    /// Gives one copy back. Guard: `copies_available < copies_total`.
    async fn release_copy(
        &self,
        con: &mut Self::Transaction,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError>;
    /// Changes the total and shifts `copies_available` by the same
    /// delta. Guard: the shifted availability stays non-negative, i.e.
    /// the new total still covers every outstanding loan.
    async fn update_stock(
        &self,
        con: &mut Self::Transaction,
        id: &BookId,
        total: &TotalCopies,
    ) -> error_stack::Result<Option<Book>, KernelError>;
    /// Soft delete. Guard: book active and no active loan references it.
    async fn delete(
        &self,
        con: &mut Self::Transaction,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError>;
}

pub trait DependOnBookModifier: 'static + Sync + Send + DependOnDatabaseConnection {
    type BookModifier: BookModifier<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn book_modifier(&self) -> &Self::BookModifier;
}
