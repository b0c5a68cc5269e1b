use crate::controller::Exhaust;
use application::transfer::BookDto;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct CreatedBookResponse {
    id: Uuid,
}

impl IntoResponse for CreatedBookResponse {
    fn into_response(self) -> Response {
        (axum::http::StatusCode::CREATED, axum::Json(self)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct BookResponse {
    id: Uuid,
    title: String,
    isbn: String,
    copies_available: i32,
    copies_total: i32,
}

impl IntoResponse for BookResponse {
    fn into_response(self) -> Response {
        (axum::http::StatusCode::OK, axum::Json(self)).into_response()
    }
}

pub struct CreatedBookPresenter;

impl Exhaust<BookDto> for CreatedBookPresenter {
    type To = CreatedBookResponse;
    fn emit(&self, input: BookDto) -> Self::To {
        CreatedBookResponse { id: input.id }
    }
}

pub struct BookPresenter;

impl Exhaust<()> for BookPresenter {
    type To = ();
    fn emit(&self, input: ()) -> Self::To {
        input
    }
}

impl Exhaust<BookDto> for BookPresenter {
    type To = BookResponse;
    fn emit(&self, input: BookDto) -> Self::To {
        BookResponse {
            id: input.id,
            title: input.title,
            isbn: input.isbn,
            copies_available: input.copies_available,
            copies_total: input.copies_total,
        }
    }
}

impl Exhaust<Option<BookDto>> for BookPresenter {
    type To = Option<BookResponse>;
    fn emit(&self, input: Option<BookDto>) -> Self::To {
        input.map(|book| self.emit(book))
    }
}

impl Exhaust<Vec<BookDto>> for BookPresenter {
    type To = axum::Json<Vec<BookResponse>>;
    fn emit(&self, input: Vec<BookDto>) -> Self::To {
        let result = input
            .into_iter()
            .map(|book| self.emit(book))
            .collect::<Vec<_>>();

        axum::Json::from(result)
    }
}
