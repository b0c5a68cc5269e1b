use error_stack::Report;
use time::OffsetDateTime;
use uuid::Uuid;

use kernel::interface::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use kernel::interface::notify::{DependOnNotificationQueue, NotificationJob, Recipient};
use kernel::interface::query::{BookQuery, DependOnBookQuery, DependOnLoanQuery, LoanQuery};
use kernel::interface::update::{
    BookModifier, DependOnBookModifier, DependOnLoanModifier, LoanModifier,
};
use kernel::prelude::entity::{BorrowedAt, IsDeleted, Loan, LoanId, ReturnedAt};
use kernel::KernelError;

use crate::service::EnqueueNotification;
use crate::transfer::{
    BorrowBookDto, DeleteLoanDto, GetBookLoansDto, GetLoanDto, LoanDto, ReassignLoanDto,
    ReturnBookDto,
};

/// Loan lifecycle. Every mutation pairs its loan write with the copy
/// accounting of the affected book inside one transaction, so the
/// available count and the set of active loans cannot drift apart.
#[async_trait::async_trait]
pub trait LoanService:
    'static
    + Sync
    + Send
    + DependOnDatabaseConnection
    + DependOnLoanQuery
    + DependOnLoanModifier
    + DependOnBookQuery
    + DependOnBookModifier
    + DependOnNotificationQueue
{
    async fn borrow_book(&self, dto: BorrowBookDto) -> error_stack::Result<LoanDto, KernelError> {
        let now = OffsetDateTime::now_utc();
        if dto.due_date.as_ref() <= &now {
            return Err(Report::new(KernelError::Validation)
                .attach_printable("Due date must lie in the future"));
        }

        let mut connection = self.database_connection().transact().await?;

        let Some(book) = self
            .book_modifier()
            .reserve_copy(&mut connection, &dto.book_id)
            .await?
        else {
            return match self
                .book_query()
                .find_by_id(&mut connection, &dto.book_id)
                .await?
            {
                None => Err(Report::new(KernelError::NotFound)
                    .attach_printable(format!("Book {} does not exist", dto.book_id.as_ref()))),
                Some(_) => Err(Report::new(KernelError::ResourceExhausted).attach_printable(
                    format!("No copies of book {} are available", dto.book_id.as_ref()),
                )),
            };
        };

        let loan = Loan::new(
            LoanId::new(Uuid::new_v4()),
            dto.book_id,
            dto.borrower_name,
            dto.borrower_email,
            BorrowedAt::new(now),
            dto.due_date,
            None,
            dto.notes,
            IsDeleted::default(),
        );
        self.loan_modifier().create(&mut connection, &loan).await?;

        connection.commit().await?;

        self.enqueue_notification(NotificationJob::LoanConfirmation {
            recipient: Recipient::new(
                loan.borrower_email().as_ref(),
                loan.borrower_name().as_ref(),
            ),
            book_title: book.title().as_ref().to_string(),
            due_date: *loan.due_date().as_ref(),
        })
        .await;

        Ok(LoanDto::from(loan))
    }

    async fn return_book(&self, dto: ReturnBookDto) -> error_stack::Result<LoanDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let returned_at = ReturnedAt::new(OffsetDateTime::now_utc());
        let Some(loan) = self
            .loan_modifier()
            .mark_returned(&mut connection, &dto.id, &returned_at)
            .await?
        else {
            return match self.loan_query().find_by_id(&mut connection, &dto.id).await? {
                None => Err(Report::new(KernelError::NotFound)
                    .attach_printable(format!("Loan {} does not exist", dto.id.as_ref()))),
                Some(_) => Err(Report::new(KernelError::InvalidState)
                    .attach_printable(format!("Loan {} is already returned", dto.id.as_ref()))),
            };
        };

        let book = self
            .book_modifier()
            .release_copy(&mut connection, loan.book_id())
            .await?
            .ok_or_else(|| {
                Report::new(KernelError::Internal).attach_printable(format!(
                    "Book {} shows no copy out on loan",
                    loan.book_id().as_ref()
                ))
            })?;

        connection.commit().await?;

        self.enqueue_notification(NotificationJob::ReturnConfirmation {
            recipient: Recipient::new(
                loan.borrower_email().as_ref(),
                loan.borrower_name().as_ref(),
            ),
            book_title: book.title().as_ref().to_string(),
            overdue: loan.was_returned_overdue(),
        })
        .await;

        Ok(LoanDto::from(loan))
    }

    /// Moving a loan credits the old book and debits the new one in the
    /// same transaction; a failure on either side leaves both counts
    /// untouched.
    async fn reassign_book(
        &self,
        dto: ReassignLoanDto,
    ) -> error_stack::Result<LoanDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let loan = self
            .loan_query()
            .find_by_id(&mut connection, &dto.id)
            .await?
            .ok_or_else(|| {
                Report::new(KernelError::NotFound)
                    .attach_printable(format!("Loan {} does not exist", dto.id.as_ref()))
            })?;
        if !loan.is_active() {
            return Err(Report::new(KernelError::InvalidState)
                .attach_printable(format!("Loan {} is no longer active", dto.id.as_ref())));
        }
        if loan.book_id() == &dto.book_id {
            return Ok(LoanDto::from(loan));
        }

        if self
            .book_modifier()
            .reserve_copy(&mut connection, &dto.book_id)
            .await?
            .is_none()
        {
            return match self
                .book_query()
                .find_by_id(&mut connection, &dto.book_id)
                .await?
            {
                None => Err(Report::new(KernelError::NotFound)
                    .attach_printable(format!("Book {} does not exist", dto.book_id.as_ref()))),
                Some(_) => Err(Report::new(KernelError::ResourceExhausted).attach_printable(
                    format!("No copies of book {} are available", dto.book_id.as_ref()),
                )),
            };
        }

        self.book_modifier()
            .release_copy(&mut connection, loan.book_id())
            .await?
            .ok_or_else(|| {
                Report::new(KernelError::Internal).attach_printable(format!(
                    "Book {} shows no copy out on loan",
                    loan.book_id().as_ref()
                ))
            })?;

        let updated = self
            .loan_modifier()
            .reassign(&mut connection, &dto.id, &dto.book_id)
            .await?
            .ok_or_else(|| {
                Report::new(KernelError::Concurrency).attach_printable(format!(
                    "Loan {} changed while being reassigned",
                    dto.id.as_ref()
                ))
            })?;

        connection.commit().await?;

        Ok(LoanDto::from(updated))
    }

    async fn delete_loan(&self, dto: DeleteLoanDto) -> error_stack::Result<(), KernelError> {
        let mut connection = self.database_connection().transact().await?;

        if self
            .loan_modifier()
            .delete(&mut connection, &dto.id)
            .await?
            .is_none()
        {
            return match self.loan_query().find_by_id(&mut connection, &dto.id).await? {
                None => Err(Report::new(KernelError::NotFound)
                    .attach_printable(format!("Loan {} does not exist", dto.id.as_ref()))),
                Some(_) => Err(Report::new(KernelError::InvalidState)
                    .attach_printable(format!("Loan {} is still active", dto.id.as_ref()))),
            };
        }

        connection.commit().await?;
        Ok(())
    }

    /// Scans active loans past their due date and queues one reminder
    /// per loan. Returns how many reminders were queued.
    async fn remind_overdue(&self) -> error_stack::Result<usize, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let now = OffsetDateTime::now_utc();
        let overdue = self
            .loan_query()
            .find_overdue(&mut connection, &now)
            .await?;

        let mut jobs = Vec::with_capacity(overdue.len());
        for loan in overdue {
            let Some(book) = self
                .book_query()
                .find_by_id(&mut connection, loan.book_id())
                .await?
            else {
                tracing::warn!(
                    "Loan {} references missing book {}",
                    loan.id().as_ref(),
                    loan.book_id().as_ref()
                );
                continue;
            };
            jobs.push(NotificationJob::OverdueReminder {
                recipient: Recipient::new(
                    loan.borrower_email().as_ref(),
                    loan.borrower_name().as_ref(),
                ),
                book_title: book.title().as_ref().to_string(),
                due_date: *loan.due_date().as_ref(),
            });
        }
        connection.commit().await?;

        let count = jobs.len();
        for job in jobs {
            self.enqueue_notification(job).await;
        }
        Ok(count)
    }

    async fn get_loan(&self, dto: GetLoanDto) -> error_stack::Result<Option<LoanDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;
        let loan = self
            .loan_query()
            .find_by_id(&mut connection, &dto.id)
            .await?;
        connection.commit().await?;
        Ok(loan.map(LoanDto::from))
    }

    async fn get_book_loans(
        &self,
        dto: GetBookLoansDto,
    ) -> error_stack::Result<Vec<LoanDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;
        let loans = self
            .loan_query()
            .find_by_book_id(&mut connection, &dto.book_id)
            .await?;
        connection.commit().await?;
        Ok(loans.into_iter().map(LoanDto::from).collect())
    }
}

impl<T> LoanService for T where
    T: DependOnLoanQuery
        + DependOnLoanModifier
        + DependOnBookQuery
        + DependOnBookModifier
        + DependOnNotificationQueue
{
}
