mod common;

use std::sync::Arc;

use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use application::service::{BookService, LoanService};
use application::transfer::{
    BookDto, BorrowBookDto, CreateBookDto, DeleteBookDto, DeleteLoanDto, GetBookDto, GetLoanDto,
    ReassignLoanDto, ReturnBookDto, UpdateBookDto,
};
use kernel::interface::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use kernel::interface::notify::NotificationJob;
use kernel::interface::update::{DependOnLoanModifier, LoanModifier};
use kernel::prelude::entity::{
    BookId, BookTitle, BorrowedAt, BorrowerEmail, BorrowerName, DueDate, IsDeleted, Isbn, Loan,
    LoanId, TotalCopies,
};
use kernel::KernelError;

use common::TestModule;

async fn seed_book(module: &TestModule, copies: i32) -> error_stack::Result<BookDto, KernelError> {
    module
        .create_book(CreateBookDto {
            title: BookTitle::new("The Left Hand of Darkness"),
            isbn: Isbn::new(Uuid::new_v4().to_string()),
            copies_total: TotalCopies::new(copies),
        })
        .await
}

fn borrow_dto(book_id: Uuid) -> BorrowBookDto {
    BorrowBookDto {
        book_id: BookId::new(book_id),
        borrower_name: BorrowerName::new("Jane"),
        borrower_email: BorrowerEmail::new("jane@example.com"),
        due_date: DueDate::new(OffsetDateTime::now_utc() + Duration::days(14)),
        notes: None,
    }
}

async fn available(module: &TestModule, id: Uuid) -> error_stack::Result<i32, KernelError> {
    let book = module
        .get_book(GetBookDto {
            id: BookId::new(id),
        })
        .await?
        .expect("book should exist");
    Ok(book.copies_available)
}

#[tokio::test]
async fn borrow_exhaust_return_cycle() -> error_stack::Result<(), KernelError> {
    let (module, delivered) = TestModule::build();
    let book = seed_book(&module, 1).await?;
    assert_eq!(book.copies_available, 1);

    let loan = module.borrow_book(borrow_dto(book.id)).await?;
    assert_eq!(loan.book_id, book.id);
    assert!(loan.returned_at.is_none());
    assert_eq!(available(&module, book.id).await?, 0);

    let report = module.borrow_book(borrow_dto(book.id)).await.unwrap_err();
    assert!(matches!(
        report.current_context(),
        KernelError::ResourceExhausted
    ));

    let returned = module
        .return_book(ReturnBookDto {
            id: LoanId::new(loan.id),
        })
        .await?;
    assert!(returned.returned_at.is_some());
    assert_eq!(available(&module, book.id).await?, 1);

    // A second return changes nothing.
    let report = module
        .return_book(ReturnBookDto {
            id: LoanId::new(loan.id),
        })
        .await
        .unwrap_err();
    assert!(matches!(report.current_context(), KernelError::InvalidState));
    assert_eq!(available(&module, book.id).await?, 1);

    let jobs = delivered.lock().unwrap();
    assert!(jobs
        .iter()
        .any(|job| matches!(job, NotificationJob::LoanConfirmation { .. })));
    assert!(jobs.iter().any(|job| matches!(
        job,
        NotificationJob::ReturnConfirmation { overdue: false, .. }
    )));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_borrows_never_oversell() -> error_stack::Result<(), KernelError> {
    let (module, _delivered) = TestModule::build();
    let module = Arc::new(module);
    let book = seed_book(&module, 3).await?;

    let mut handles = Vec::new();
    for _ in 0..4 {
        let module = Arc::clone(&module);
        let book_id = book.id;
        handles.push(tokio::spawn(async move {
            module.borrow_book(borrow_dto(book_id)).await
        }));
    }

    let mut succeeded = 0;
    let mut exhausted = 0;
    for handle in handles {
        match handle.await.expect("borrow task panicked") {
            Ok(_) => succeeded += 1,
            Err(report) => {
                assert!(matches!(
                    report.current_context(),
                    KernelError::ResourceExhausted
                ));
                exhausted += 1;
            }
        }
    }
    assert_eq!((succeeded, exhausted), (3, 1));
    assert_eq!(available(&module, book.id).await?, 0);
    Ok(())
}

#[tokio::test]
async fn reassignment_is_all_or_nothing() -> error_stack::Result<(), KernelError> {
    let (module, _delivered) = TestModule::build();
    let source = seed_book(&module, 1).await?;
    let full_target = seed_book(&module, 1).await?;
    let open_target = seed_book(&module, 1).await?;

    let loan = module.borrow_book(borrow_dto(source.id)).await?;
    // Take the only copy of the first target so it cannot accept the loan.
    module.borrow_book(borrow_dto(full_target.id)).await?;

    let report = module
        .reassign_book(ReassignLoanDto {
            id: LoanId::new(loan.id),
            book_id: BookId::new(full_target.id),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        report.current_context(),
        KernelError::ResourceExhausted
    ));

    // Nothing moved: the source copy is still out and the loan still
    // points at the source book.
    assert_eq!(available(&module, source.id).await?, 0);
    let unchanged = module
        .get_loan(GetLoanDto {
            id: LoanId::new(loan.id),
        })
        .await?
        .expect("loan should exist");
    assert_eq!(unchanged.book_id, source.id);

    let moved = module
        .reassign_book(ReassignLoanDto {
            id: LoanId::new(loan.id),
            book_id: BookId::new(open_target.id),
        })
        .await?;
    assert_eq!(moved.book_id, open_target.id);
    assert_eq!(available(&module, source.id).await?, 1);
    assert_eq!(available(&module, open_target.id).await?, 0);
    Ok(())
}

#[tokio::test]
async fn total_copies_respect_outstanding_loans() -> error_stack::Result<(), KernelError> {
    let (module, _delivered) = TestModule::build();
    let book = seed_book(&module, 2).await?;
    module.borrow_book(borrow_dto(book.id)).await?;

    let trimmed = module
        .update_book(UpdateBookDto {
            id: BookId::new(book.id),
            title: None,
            isbn: None,
            copies_total: Some(TotalCopies::new(1)),
        })
        .await?;
    assert_eq!((trimmed.copies_available, trimmed.copies_total), (0, 1));

    let report = module
        .update_book(UpdateBookDto {
            id: BookId::new(book.id),
            title: None,
            isbn: None,
            copies_total: Some(TotalCopies::new(0)),
        })
        .await
        .unwrap_err();
    assert!(matches!(report.current_context(), KernelError::Conflict));
    Ok(())
}

#[tokio::test]
async fn books_with_active_loans_cannot_be_removed() -> error_stack::Result<(), KernelError> {
    let (module, _delivered) = TestModule::build();
    let book = seed_book(&module, 1).await?;
    let loan = module.borrow_book(borrow_dto(book.id)).await?;

    let report = module
        .remove_book(DeleteBookDto {
            id: BookId::new(book.id),
        })
        .await
        .unwrap_err();
    assert!(matches!(report.current_context(), KernelError::Conflict));

    module
        .return_book(ReturnBookDto {
            id: LoanId::new(loan.id),
        })
        .await?;
    module
        .remove_book(DeleteBookDto {
            id: BookId::new(book.id),
        })
        .await?;
    assert!(module
        .get_book(GetBookDto {
            id: BookId::new(book.id),
        })
        .await?
        .is_none());
    Ok(())
}

#[tokio::test]
async fn loan_records_survive_until_returned() -> error_stack::Result<(), KernelError> {
    let (module, _delivered) = TestModule::build();
    let book = seed_book(&module, 1).await?;
    let loan = module.borrow_book(borrow_dto(book.id)).await?;

    let report = module
        .delete_loan(DeleteLoanDto {
            id: LoanId::new(loan.id),
        })
        .await
        .unwrap_err();
    assert!(matches!(report.current_context(), KernelError::InvalidState));

    module
        .return_book(ReturnBookDto {
            id: LoanId::new(loan.id),
        })
        .await?;
    module
        .delete_loan(DeleteLoanDto {
            id: LoanId::new(loan.id),
        })
        .await?;
    assert!(module
        .get_loan(GetLoanDto {
            id: LoanId::new(loan.id),
        })
        .await?
        .is_none());
    Ok(())
}

#[tokio::test]
async fn borrow_rejects_bad_input() -> error_stack::Result<(), KernelError> {
    let (module, _delivered) = TestModule::build();
    let book = seed_book(&module, 1).await?;

    let mut dto = borrow_dto(book.id);
    dto.due_date = DueDate::new(OffsetDateTime::now_utc() - Duration::hours(1));
    let report = module.borrow_book(dto).await.unwrap_err();
    assert!(matches!(report.current_context(), KernelError::Validation));

    let report = module
        .borrow_book(borrow_dto(Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(matches!(report.current_context(), KernelError::NotFound));
    Ok(())
}

#[tokio::test]
async fn overdue_reminders_cover_open_late_loans() -> error_stack::Result<(), KernelError> {
    let (module, delivered) = TestModule::build();
    let book = seed_book(&module, 2).await?;

    // Overdue loans cannot be created through the service; seed one.
    let now = OffsetDateTime::now_utc();
    let late = Loan::new(
        LoanId::new(Uuid::new_v4()),
        BookId::new(book.id),
        BorrowerName::new("Ursula"),
        BorrowerEmail::new("ursula@example.com"),
        BorrowedAt::new(now - Duration::days(30)),
        DueDate::new(now - Duration::days(2)),
        None,
        None,
        IsDeleted::default(),
    );
    let mut connection = module.database_connection().transact().await?;
    module.loan_modifier().create(&mut connection, &late).await?;
    connection.commit().await?;

    // An on-time loan must not trigger a reminder.
    module.borrow_book(borrow_dto(book.id)).await?;

    let count = module.remind_overdue().await?;
    assert_eq!(count, 1);

    let jobs = delivered.lock().unwrap();
    let reminder = jobs
        .iter()
        .find(|job| matches!(job, NotificationJob::OverdueReminder { .. }))
        .expect("reminder should be queued");
    if let NotificationJob::OverdueReminder {
        recipient,
        book_title,
        ..
    } = reminder
    {
        assert_eq!(recipient.email, "ursula@example.com");
        assert_eq!(book_title, "The Left Hand of Darkness");
    }
    Ok(())
}
