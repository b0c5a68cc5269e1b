use sqlx::types::Uuid;
use sqlx::PgConnection;
use time::OffsetDateTime;

use kernel::interface::query::LoanQuery;
use kernel::interface::update::LoanModifier;
use kernel::prelude::entity::{
    BookId, BorrowedAt, BorrowerEmail, BorrowerName, DueDate, IsDeleted, Loan, LoanId, LoanNotes,
    ReturnedAt,
};
use kernel::KernelError;

use crate::database::postgres::PostgresTransaction;
use crate::error::ConvertError;

pub struct PostgresLoanRepository;

#[async_trait::async_trait]
impl LoanQuery for PostgresLoanRepository {
    type Transaction = PostgresTransaction;

    async fn find_by_id(
        &self,
        con: &mut PostgresTransaction,
        id: &LoanId,
    ) -> error_stack::Result<Option<Loan>, KernelError> {
        PgLoanInternal::find_by_id(con.connection(), id).await
    }

    async fn find_by_book_id(
        &self,
        con: &mut PostgresTransaction,
        book_id: &BookId,
    ) -> error_stack::Result<Vec<Loan>, KernelError> {
        PgLoanInternal::find_by_book_id(con.connection(), book_id).await
    }

    async fn count_active_by_book_id(
        &self,
        con: &mut PostgresTransaction,
        book_id: &BookId,
    ) -> error_stack::Result<i64, KernelError> {
        PgLoanInternal::count_active_by_book_id(con.connection(), book_id).await
    }

    async fn find_overdue(
        &self,
        con: &mut PostgresTransaction,
        at: &OffsetDateTime,
    ) -> error_stack::Result<Vec<Loan>, KernelError> {
        PgLoanInternal::find_overdue(con.connection(), at).await
    }
}

#[async_trait::async_trait]
impl LoanModifier for PostgresLoanRepository {
    type Transaction = PostgresTransaction;

    async fn create(
        &self,
        con: &mut PostgresTransaction,
        loan: &Loan,
    ) -> error_stack::Result<(), KernelError> {
        PgLoanInternal::create(con.connection(), loan).await
    }

    async fn mark_returned(
        &self,
        con: &mut PostgresTransaction,
        id: &LoanId,
        returned_at: &ReturnedAt,
    ) -> error_stack::Result<Option<Loan>, KernelError> {
        PgLoanInternal::mark_returned(con.connection(), id, returned_at).await
    }

    async fn reassign(
        &self,
        con: &mut PostgresTransaction,
        id: &LoanId,
        book_id: &BookId,
    ) -> error_stack::Result<Option<Loan>, KernelError> {
        PgLoanInternal::reassign(con.connection(), id, book_id).await
    }

    async fn delete(
        &self,
        con: &mut PostgresTransaction,
        id: &LoanId,
    ) -> error_stack::Result<Option<Loan>, KernelError> {
        PgLoanInternal::delete(con.connection(), id).await
    }
}

#[derive(sqlx::FromRow)]
struct LoanRow {
    id: Uuid,
    book_id: Uuid,
    borrower_name: String,
    borrower_email: String,
    borrowed_at: OffsetDateTime,
    due_date: OffsetDateTime,
    returned_at: Option<OffsetDateTime>,
    notes: Option<String>,
    is_deleted: bool,
}

impl From<LoanRow> for Loan {
    fn from(row: LoanRow) -> Self {
        Loan::new(
            LoanId::new(row.id),
            BookId::new(row.book_id),
            BorrowerName::new(row.borrower_name),
            BorrowerEmail::new(row.borrower_email),
            BorrowedAt::new(row.borrowed_at),
            DueDate::new(row.due_date),
            row.returned_at.map(ReturnedAt::new),
            row.notes.map(LoanNotes::new),
            IsDeleted::new(row.is_deleted),
        )
    }
}

pub(in crate::database) struct PgLoanInternal;

impl PgLoanInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &LoanId,
    ) -> error_stack::Result<Option<Loan>, KernelError> {
        let row = sqlx::query_as::<_, LoanRow>(
            // language=postgresql
            r#"
            SELECT id, book_id, borrower_name, borrower_email, borrowed_at, due_date,
                   returned_at, notes, is_deleted
            FROM loans
            WHERE id = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.map(Loan::from))
    }

    async fn find_by_book_id(
        con: &mut PgConnection,
        book_id: &BookId,
    ) -> error_stack::Result<Vec<Loan>, KernelError> {
        let rows = sqlx::query_as::<_, LoanRow>(
            // language=postgresql
            r#"
            SELECT id, book_id, borrower_name, borrower_email, borrowed_at, due_date,
                   returned_at, notes, is_deleted
            FROM loans
            WHERE book_id = $1 AND is_deleted = FALSE
            ORDER BY borrowed_at DESC, id
            "#,
        )
        .bind(book_id.as_ref())
        .fetch_all(con)
        .await
        .convert_error()?;
        Ok(rows.into_iter().map(Loan::from).collect())
    }

    async fn count_active_by_book_id(
        con: &mut PgConnection,
        book_id: &BookId,
    ) -> error_stack::Result<i64, KernelError> {
        let count = sqlx::query_scalar::<_, i64>(
            // language=postgresql
            r#"
            SELECT COUNT(*)
            FROM loans
            WHERE book_id = $1 AND returned_at IS NULL AND is_deleted = FALSE
            "#,
        )
        .bind(book_id.as_ref())
        .fetch_one(con)
        .await
        .convert_error()?;
        Ok(count)
    }

    async fn find_overdue(
        con: &mut PgConnection,
        at: &OffsetDateTime,
    ) -> error_stack::Result<Vec<Loan>, KernelError> {
        let rows = sqlx::query_as::<_, LoanRow>(
            // language=postgresql
            r#"
            SELECT id, book_id, borrower_name, borrower_email, borrowed_at, due_date,
                   returned_at, notes, is_deleted
            FROM loans
            WHERE returned_at IS NULL AND is_deleted = FALSE AND due_date < $1
            ORDER BY due_date, id
            "#,
        )
        .bind(at)
        .fetch_all(con)
        .await
        .convert_error()?;
        Ok(rows.into_iter().map(Loan::from).collect())
    }

    async fn create(con: &mut PgConnection, loan: &Loan) -> error_stack::Result<(), KernelError> {
        sqlx::query(
            // language=postgresql
            r#"
            INSERT INTO loans (id, book_id, borrower_name, borrower_email, borrowed_at,
                               due_date, returned_at, notes, is_deleted)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(loan.id().as_ref())
        .bind(loan.book_id().as_ref())
        .bind(loan.borrower_name().as_ref())
        .bind(loan.borrower_email().as_ref())
        .bind(loan.borrowed_at().as_ref())
        .bind(loan.due_date().as_ref())
        .bind(loan.returned_at().map(|returned| returned.as_ref()))
        .bind(loan.notes().map(|notes| notes.as_ref()))
        .bind(loan.is_deleted())
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }

    async fn mark_returned(
        con: &mut PgConnection,
        id: &LoanId,
        returned_at: &ReturnedAt,
    ) -> error_stack::Result<Option<Loan>, KernelError> {
        let row = sqlx::query_as::<_, LoanRow>(
            // language=postgresql
            r#"
            UPDATE loans
            SET returned_at = $2
            WHERE id = $1 AND returned_at IS NULL AND is_deleted = FALSE
            RETURNING id, book_id, borrower_name, borrower_email, borrowed_at, due_date,
                      returned_at, notes, is_deleted
            "#,
        )
        .bind(id.as_ref())
        .bind(returned_at.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.map(Loan::from))
    }

    async fn reassign(
        con: &mut PgConnection,
        id: &LoanId,
        book_id: &BookId,
    ) -> error_stack::Result<Option<Loan>, KernelError> {
        let row = sqlx::query_as::<_, LoanRow>(
            // language=postgresql
            r#"
            UPDATE loans
            SET book_id = $2
            WHERE id = $1 AND returned_at IS NULL AND is_deleted = FALSE
            RETURNING id, book_id, borrower_name, borrower_email, borrowed_at, due_date,
                      returned_at, notes, is_deleted
            "#,
        )
        .bind(id.as_ref())
        .bind(book_id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.map(Loan::from))
    }

    async fn delete(
        con: &mut PgConnection,
        id: &LoanId,
    ) -> error_stack::Result<Option<Loan>, KernelError> {
        let row = sqlx::query_as::<_, LoanRow>(
            // language=postgresql
            r#"
            UPDATE loans
            SET is_deleted = TRUE
            WHERE id = $1 AND returned_at IS NOT NULL AND is_deleted = FALSE
            RETURNING id, book_id, borrower_name, borrower_email, borrowed_at, due_date,
                      returned_at, notes, is_deleted
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.map(Loan::from))
    }
}

#[cfg(test)]
mod test {
    use time::{Duration, OffsetDateTime};
    use uuid::Uuid;

    use kernel::interface::database::DatabaseConnection;
    use kernel::interface::query::LoanQuery;
    use kernel::interface::update::{BookModifier, LoanModifier};
    use kernel::prelude::entity::{
        AvailableCopies, Book, BookId, BookTitle, BorrowedAt, BorrowerEmail, BorrowerName,
        DueDate, IsDeleted, Isbn, Loan, LoanId, ReturnedAt, TotalCopies,
    };
    use kernel::KernelError;

    use crate::database::postgres::book::PostgresBookRepository;
    use crate::database::postgres::loan::PostgresLoanRepository;
    use crate::database::postgres::{PostgresDatabase, PostgresTransaction};

    async fn seed_book(con: &mut PostgresTransaction) -> error_stack::Result<BookId, KernelError> {
        let id = BookId::new(Uuid::new_v4());
        let book = Book::new(
            id.clone(),
            BookTitle::new("test"),
            Isbn::new(Uuid::new_v4().to_string()),
            AvailableCopies::new(1),
            TotalCopies::new(1),
            IsDeleted::default(),
        );
        PostgresBookRepository.create(con, &book).await?;
        Ok(id)
    }

    fn new_loan(book_id: &BookId, borrowed_at: OffsetDateTime, due_date: OffsetDateTime) -> Loan {
        Loan::new(
            LoanId::new(Uuid::new_v4()),
            book_id.clone(),
            BorrowerName::new("test"),
            BorrowerEmail::new("test@example.com"),
            BorrowedAt::new(borrowed_at),
            DueDate::new(due_date),
            None,
            None,
            IsDeleted::default(),
        )
    }

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn return_is_one_shot() -> error_stack::Result<(), KernelError> {
        let db = PostgresDatabase::new().await?;
        let mut con = db.transact().await?;
        let book_id = seed_book(&mut con).await?;

        let now = OffsetDateTime::now_utc();
        let loan = new_loan(&book_id, now, now + Duration::days(14));
        PostgresLoanRepository.create(&mut con, &loan).await?;

        let count = PostgresLoanRepository
            .count_active_by_book_id(&mut con, &book_id)
            .await?;
        assert_eq!(count, 1);

        let returned = PostgresLoanRepository
            .mark_returned(&mut con, loan.id(), &ReturnedAt::new(now))
            .await?
            .unwrap();
        assert!(!returned.is_active());

        let count = PostgresLoanRepository
            .count_active_by_book_id(&mut con, &book_id)
            .await?;
        assert_eq!(count, 0);

        // Already closed; the guard rejects a second return.
        let returned = PostgresLoanRepository
            .mark_returned(&mut con, loan.id(), &ReturnedAt::new(now))
            .await?;
        assert!(returned.is_none());

        Ok(())
    }

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn delete_requires_a_closed_loan() -> error_stack::Result<(), KernelError> {
        let db = PostgresDatabase::new().await?;
        let mut con = db.transact().await?;
        let book_id = seed_book(&mut con).await?;

        let now = OffsetDateTime::now_utc();
        let loan = new_loan(&book_id, now, now + Duration::days(14));
        PostgresLoanRepository.create(&mut con, &loan).await?;

        let deleted = PostgresLoanRepository.delete(&mut con, loan.id()).await?;
        assert!(deleted.is_none());

        PostgresLoanRepository
            .mark_returned(&mut con, loan.id(), &ReturnedAt::new(now))
            .await?;
        let deleted = PostgresLoanRepository.delete(&mut con, loan.id()).await?;
        assert!(deleted.is_some());

        let found = PostgresLoanRepository.find_by_id(&mut con, loan.id()).await?;
        assert!(found.is_none());

        Ok(())
    }

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn overdue_scan_skips_returned_loans() -> error_stack::Result<(), KernelError> {
        let db = PostgresDatabase::new().await?;
        let mut con = db.transact().await?;
        let book_id = seed_book(&mut con).await?;

        let now = OffsetDateTime::now_utc();
        let overdue = new_loan(&book_id, now - Duration::days(30), now - Duration::days(16));
        let on_time = new_loan(&book_id, now, now + Duration::days(14));
        PostgresLoanRepository.create(&mut con, &overdue).await?;
        PostgresLoanRepository.create(&mut con, &on_time).await?;

        let found = PostgresLoanRepository.find_overdue(&mut con, &now).await?;
        let ids: Vec<_> = found.iter().map(Loan::id).collect();
        assert!(ids.contains(&overdue.id()));
        assert!(!ids.contains(&on_time.id()));

        PostgresLoanRepository
            .mark_returned(&mut con, overdue.id(), &ReturnedAt::new(now))
            .await?;
        let found = PostgresLoanRepository.find_overdue(&mut con, &now).await?;
        assert!(!found.iter().any(|l| l.id() == overdue.id()));

        Ok(())
    }

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn reassign_moves_the_loan() -> error_stack::Result<(), KernelError> {
        let db = PostgresDatabase::new().await?;
        let mut con = db.transact().await?;
        let first = seed_book(&mut con).await?;
        let second = seed_book(&mut con).await?;

        let now = OffsetDateTime::now_utc();
        let loan = new_loan(&first, now, now + Duration::days(14));
        PostgresLoanRepository.create(&mut con, &loan).await?;

        let moved = PostgresLoanRepository
            .reassign(&mut con, loan.id(), &second)
            .await?
            .unwrap();
        assert_eq!(moved.book_id(), &second);
        // The due date travels with the loan.
        assert_eq!(moved.due_date(), loan.due_date());

        Ok(())
    }
}
