use time::OffsetDateTime;

use kernel::interface::query::LoanQuery;
use kernel::interface::update::LoanModifier;
use kernel::prelude::entity::{BookId, IsDeleted, Loan, LoanId, ReturnedAt};
use kernel::KernelError;

use crate::database::memory::MemoryTransaction;

pub struct MemoryLoanRepository;

#[async_trait::async_trait]
impl LoanQuery for MemoryLoanRepository {
    type Transaction = MemoryTransaction;

    async fn find_by_id(
        &self,
        con: &mut MemoryTransaction,
        id: &LoanId,
    ) -> error_stack::Result<Option<Loan>, KernelError> {
        Ok(con
            .state()
            .loans
            .get(id.as_ref())
            .filter(|loan| !loan.is_deleted())
            .cloned())
    }

    async fn find_by_book_id(
        &self,
        con: &mut MemoryTransaction,
        book_id: &BookId,
    ) -> error_stack::Result<Vec<Loan>, KernelError> {
        let mut loans: Vec<Loan> = con
            .state()
            .loans
            .values()
            .filter(|loan| loan.book_id() == book_id && !loan.is_deleted())
            .cloned()
            .collect();
        loans.sort_by(|a, b| {
            b.borrowed_at()
                .as_ref()
                .cmp(a.borrowed_at().as_ref())
                .then_with(|| a.id().as_ref().cmp(b.id().as_ref()))
        });
        Ok(loans)
    }

    async fn count_active_by_book_id(
        &self,
        con: &mut MemoryTransaction,
        book_id: &BookId,
    ) -> error_stack::Result<i64, KernelError> {
        let count = con
            .state()
            .loans
            .values()
            .filter(|loan| loan.book_id() == book_id && loan.is_active())
            .count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    async fn find_overdue(
        &self,
        con: &mut MemoryTransaction,
        at: &OffsetDateTime,
    ) -> error_stack::Result<Vec<Loan>, KernelError> {
        let mut loans: Vec<Loan> = con
            .state()
            .loans
            .values()
            .filter(|loan| loan.is_active() && loan.due_date().as_ref() < at)
            .cloned()
            .collect();
        loans.sort_by(|a, b| {
            a.due_date()
                .as_ref()
                .cmp(b.due_date().as_ref())
                .then_with(|| a.id().as_ref().cmp(b.id().as_ref()))
        });
        Ok(loans)
    }
}

#[async_trait::async_trait]
impl LoanModifier for MemoryLoanRepository {
    type Transaction = MemoryTransaction;

    async fn create(
        &self,
        con: &mut MemoryTransaction,
        loan: &Loan,
    ) -> error_stack::Result<(), KernelError> {
        con.state_mut()
            .loans
            .insert(*loan.id().as_ref(), loan.clone());
        Ok(())
    }

    async fn mark_returned(
        &self,
        con: &mut MemoryTransaction,
        id: &LoanId,
        returned_at: &ReturnedAt,
    ) -> error_stack::Result<Option<Loan>, KernelError> {
        let Some(stored) = con.state_mut().loans.get_mut(id.as_ref()) else {
            return Ok(None);
        };
        if !stored.is_active() {
            return Ok(None);
        }
        stored.substitute(|stored| {
            *stored.returned_at = Some(returned_at.clone());
        });
        Ok(Some(stored.clone()))
    }

    async fn reassign(
        &self,
        con: &mut MemoryTransaction,
        id: &LoanId,
        book_id: &BookId,
    ) -> error_stack::Result<Option<Loan>, KernelError> {
        let Some(stored) = con.state_mut().loans.get_mut(id.as_ref()) else {
            return Ok(None);
        };
        if !stored.is_active() {
            return Ok(None);
        }
        stored.substitute(|stored| {
            *stored.book_id = book_id.clone();
        });
        Ok(Some(stored.clone()))
    }

    async fn delete(
        &self,
        con: &mut MemoryTransaction,
        id: &LoanId,
    ) -> error_stack::Result<Option<Loan>, KernelError> {
        let Some(stored) = con.state_mut().loans.get_mut(id.as_ref()) else {
            return Ok(None);
        };
        if stored.returned_at().is_none() || stored.is_deleted() {
            return Ok(None);
        }
        stored.substitute(|stored| {
            *stored.deleted = IsDeleted::new(true);
        });
        Ok(Some(stored.clone()))
    }
}

#[cfg(test)]
mod test {
    use time::{Duration, OffsetDateTime};
    use uuid::Uuid;

    use kernel::interface::database::DatabaseConnection;
    use kernel::interface::query::LoanQuery;
    use kernel::interface::update::LoanModifier;
    use kernel::prelude::entity::{
        BookId, BorrowedAt, BorrowerEmail, BorrowerName, DueDate, IsDeleted, Loan, LoanId,
        ReturnedAt,
    };
    use kernel::KernelError;

    use crate::database::memory::{MemoryDatabase, MemoryLoanRepository};

    fn new_loan(book_id: &BookId, due_in: Duration) -> Loan {
        let now = OffsetDateTime::now_utc();
        Loan::new(
            LoanId::new(Uuid::new_v4()),
            book_id.clone(),
            BorrowerName::new("test"),
            BorrowerEmail::new("test@example.com"),
            BorrowedAt::new(now - Duration::days(1)),
            DueDate::new(now + due_in),
            None,
            None,
            IsDeleted::default(),
        )
    }

    #[tokio::test]
    async fn active_count_tracks_returns() -> error_stack::Result<(), KernelError> {
        let db = MemoryDatabase::new();
        let mut con = db.transact().await?;
        let book_id = BookId::new(Uuid::new_v4());

        let loan = new_loan(&book_id, Duration::days(14));
        MemoryLoanRepository.create(&mut con, &loan).await?;
        assert_eq!(
            MemoryLoanRepository
                .count_active_by_book_id(&mut con, &book_id)
                .await?,
            1
        );

        let returned = MemoryLoanRepository
            .mark_returned(&mut con, loan.id(), &ReturnedAt::new(OffsetDateTime::now_utc()))
            .await?;
        assert!(returned.is_some());
        assert_eq!(
            MemoryLoanRepository
                .count_active_by_book_id(&mut con, &book_id)
                .await?,
            0
        );

        let again = MemoryLoanRepository
            .mark_returned(&mut con, loan.id(), &ReturnedAt::new(OffsetDateTime::now_utc()))
            .await?;
        assert!(again.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn overdue_scan_orders_by_due_date() -> error_stack::Result<(), KernelError> {
        let db = MemoryDatabase::new();
        let mut con = db.transact().await?;
        let book_id = BookId::new(Uuid::new_v4());

        let older = new_loan(&book_id, Duration::hours(-20));
        let newer = new_loan(&book_id, Duration::hours(-2));
        let current = new_loan(&book_id, Duration::days(14));
        MemoryLoanRepository.create(&mut con, &newer).await?;
        MemoryLoanRepository.create(&mut con, &older).await?;
        MemoryLoanRepository.create(&mut con, &current).await?;

        let now = OffsetDateTime::now_utc();
        let overdue = MemoryLoanRepository.find_overdue(&mut con, &now).await?;
        assert_eq!(overdue.len(), 2);
        assert!(overdue[0].due_date().as_ref() <= overdue[1].due_date().as_ref());
        Ok(())
    }
}
