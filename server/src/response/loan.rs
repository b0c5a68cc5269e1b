use crate::controller::Exhaust;
use application::transfer::LoanDto;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct CreatedLoanResponse {
    id: Uuid,
}

impl IntoResponse for CreatedLoanResponse {
    fn into_response(self) -> Response {
        (axum::http::StatusCode::CREATED, axum::Json(self)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct LoanResponse {
    id: Uuid,
    book_id: Uuid,
    borrower_name: String,
    borrower_email: String,
    #[serde(with = "time::serde::rfc3339")]
    borrowed_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    due_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    returned_at: Option<OffsetDateTime>,
    notes: Option<String>,
}

impl IntoResponse for LoanResponse {
    fn into_response(self) -> Response {
        (axum::http::StatusCode::OK, axum::Json(self)).into_response()
    }
}

pub struct CreatedLoanPresenter;

impl Exhaust<LoanDto> for CreatedLoanPresenter {
    type To = CreatedLoanResponse;
    fn emit(&self, input: LoanDto) -> Self::To {
        CreatedLoanResponse { id: input.id }
    }
}

pub struct LoanPresenter;

impl Exhaust<()> for LoanPresenter {
    type To = ();
    fn emit(&self, input: ()) -> Self::To {
        input
    }
}

impl Exhaust<LoanDto> for LoanPresenter {
    type To = LoanResponse;
    fn emit(&self, input: LoanDto) -> Self::To {
        LoanResponse {
            id: input.id,
            book_id: input.book_id,
            borrower_name: input.borrower_name,
            borrower_email: input.borrower_email,
            borrowed_at: input.borrowed_at,
            due_date: input.due_date,
            returned_at: input.returned_at,
            notes: input.notes,
        }
    }
}

impl Exhaust<Option<LoanDto>> for LoanPresenter {
    type To = Option<LoanResponse>;
    fn emit(&self, input: Option<LoanDto>) -> Self::To {
        input.map(|loan| self.emit(loan))
    }
}

impl Exhaust<Vec<LoanDto>> for LoanPresenter {
    type To = axum::Json<Vec<LoanResponse>>;
    fn emit(&self, input: Vec<LoanDto>) -> Self::To {
        let result = input
            .into_iter()
            .map(|loan| self.emit(loan))
            .collect::<Vec<_>>();

        axum::Json::from(result)
    }
}
