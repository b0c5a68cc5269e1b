use time::OffsetDateTime;
use uuid::Uuid;

use kernel::prelude::entity::{
    BookId, BorrowerEmail, BorrowerName, DestructLoan, DueDate, Loan, LoanId, LoanNotes,
};

#[derive(Debug, Clone)]
pub struct LoanDto {
    pub id: Uuid,
    pub book_id: Uuid,
    pub borrower_name: String,
    pub borrower_email: String,
    pub borrowed_at: OffsetDateTime,
    pub due_date: OffsetDateTime,
    pub returned_at: Option<OffsetDateTime>,
    pub notes: Option<String>,
}

impl From<Loan> for LoanDto {
    fn from(value: Loan) -> Self {
        let DestructLoan {
            id,
            book_id,
            borrower_name,
            borrower_email,
            borrowed_at,
            due_date,
            returned_at,
            notes,
            ..
        } = value.into_destruct();
        Self {
            id: id.into(),
            book_id: book_id.into(),
            borrower_name: borrower_name.into(),
            borrower_email: borrower_email.into(),
            borrowed_at: borrowed_at.into(),
            due_date: due_date.into(),
            returned_at: returned_at.map(OffsetDateTime::from),
            notes: notes.map(String::from),
        }
    }
}

pub struct BorrowBookDto {
    pub book_id: BookId,
    pub borrower_name: BorrowerName,
    pub borrower_email: BorrowerEmail,
    pub due_date: DueDate,
    pub notes: Option<LoanNotes>,
}

pub struct ReturnBookDto {
    pub id: LoanId,
}

pub struct ReassignLoanDto {
    pub id: LoanId,
    pub book_id: BookId,
}

pub struct DeleteLoanDto {
    pub id: LoanId,
}

pub struct GetLoanDto {
    pub id: LoanId,
}

pub struct GetBookLoansDto {
    pub book_id: BookId,
}
