use crate::controller::Intake;
use crate::request::BookTransformer;
use application::transfer::{
    BorrowBookDto, DeleteLoanDto, GetBookLoansDto, GetLoanDto, ReassignLoanDto, ReturnBookDto,
};
use kernel::prelude::entity::{BookId, BorrowerEmail, BorrowerName, DueDate, LoanId, LoanNotes};
use serde::Deserialize;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateLoanRequest {
    book_id: Uuid,
    borrower_name: String,
    borrower_email: String,
    #[serde(with = "time::serde::rfc3339")]
    due_date: OffsetDateTime,
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReassignLoanRequest {
    book_id: Uuid,
}

#[derive(Debug)]
pub struct ReturnLoanRequest {
    id: Uuid,
}

impl ReturnLoanRequest {
    pub fn new(id: Uuid) -> Self {
        Self { id }
    }
}

#[derive(Debug)]
pub struct DeleteLoanRequest {
    id: Uuid,
}

impl DeleteLoanRequest {
    pub fn new(id: Uuid) -> Self {
        Self { id }
    }
}

#[derive(Debug)]
pub struct GetLoanRequest {
    id: Uuid,
}

impl GetLoanRequest {
    pub fn new(id: Uuid) -> Self {
        Self { id }
    }
}

#[derive(Debug)]
pub struct GetBookLoansRequest {
    id: Uuid,
}

impl GetBookLoansRequest {
    pub fn new(id: Uuid) -> Self {
        Self { id }
    }
}

impl Intake<GetBookLoansRequest> for BookTransformer {
    type To = GetBookLoansDto;
    fn emit(&self, input: GetBookLoansRequest) -> Self::To {
        GetBookLoansDto {
            book_id: BookId::new(input.id),
        }
    }
}

pub struct LoanTransformer;

impl Intake<CreateLoanRequest> for LoanTransformer {
    type To = BorrowBookDto;
    fn emit(&self, input: CreateLoanRequest) -> Self::To {
        BorrowBookDto {
            book_id: BookId::new(input.book_id),
            borrower_name: BorrowerName::new(input.borrower_name),
            borrower_email: BorrowerEmail::new(input.borrower_email),
            due_date: DueDate::new(input.due_date),
            notes: input.notes.map(LoanNotes::new),
        }
    }
}

impl Intake<ReturnLoanRequest> for LoanTransformer {
    type To = ReturnBookDto;
    fn emit(&self, input: ReturnLoanRequest) -> Self::To {
        ReturnBookDto {
            id: LoanId::new(input.id),
        }
    }
}

impl Intake<(Uuid, ReassignLoanRequest)> for LoanTransformer {
    type To = ReassignLoanDto;
    fn emit(&self, input: (Uuid, ReassignLoanRequest)) -> Self::To {
        let (id, input) = input;
        ReassignLoanDto {
            id: LoanId::new(id),
            book_id: BookId::new(input.book_id),
        }
    }
}

impl Intake<DeleteLoanRequest> for LoanTransformer {
    type To = DeleteLoanDto;
    fn emit(&self, input: DeleteLoanRequest) -> Self::To {
        DeleteLoanDto {
            id: LoanId::new(input.id),
        }
    }
}

impl Intake<GetLoanRequest> for LoanTransformer {
    type To = GetLoanDto;
    fn emit(&self, input: GetLoanRequest) -> Self::To {
        GetLoanDto {
            id: LoanId::new(input.id),
        }
    }
}
