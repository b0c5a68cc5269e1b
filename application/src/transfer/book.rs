use uuid::Uuid;

use kernel::prelude::entity::{
    Book, BookId, BookTitle, DestructBook, Isbn, SelectLimit, SelectOffset, TotalCopies,
};

/// Flattened book for the boundary. `copies_available` is the live
/// count the loan engine maintains.
#[derive(Debug, Clone)]
pub struct BookDto {
    pub id: Uuid,
    pub title: String,
    pub isbn: String,
    pub copies_available: i32,
    pub copies_total: i32,
}

impl From<Book> for BookDto {
    fn from(value: Book) -> Self {
        let DestructBook {
            id,
            title,
            isbn,
            copies_available,
            copies_total,
            ..
        } = value.into_destruct();
        Self {
            id: id.into(),
            title: title.into(),
            isbn: isbn.into(),
            copies_available: copies_available.into(),
            copies_total: copies_total.into(),
        }
    }
}

pub struct CreateBookDto {
    pub title: BookTitle,
    pub isbn: Isbn,
    pub copies_total: TotalCopies,
}

pub struct GetBookDto {
    pub id: BookId,
}

pub struct GetAllBookDto {
    pub limit: SelectLimit,
    pub offset: SelectOffset,
}

pub struct UpdateBookDto {
    pub id: BookId,
    pub title: Option<BookTitle>,
    pub isbn: Option<Isbn>,
    pub copies_total: Option<TotalCopies>,
}

pub struct DeleteBookDto {
    pub id: BookId,
}
