mod copies;
mod id;
mod isbn;
mod title;

pub use self::{copies::*, id::*, isbn::*, title::*};
use crate::entity::common::IsDeleted;
use destructure::{Destructure, Mutation};

/// Inventory unit. `copies_available` never leaves `0..=copies_total`;
/// the storage layer enforces this through conditional updates, so the
/// entity itself carries no counting logic.
#[derive(Debug, Clone, Eq, PartialEq, Destructure, Mutation)]
pub struct Book {
    id: BookId,
    title: BookTitle,
    isbn: Isbn,
    copies_available: AvailableCopies,
    copies_total: TotalCopies,
    deleted: IsDeleted<Book>,
}

impl Book {
    pub fn new(
        id: BookId,
        title: BookTitle,
        isbn: Isbn,
        copies_available: AvailableCopies,
        copies_total: TotalCopies,
        deleted: IsDeleted<Book>,
    ) -> Self {
        Self {
            id,
            title,
            isbn,
            copies_available,
            copies_total,
            deleted,
        }
    }

    pub fn id(&self) -> &BookId {
        &self.id
    }

    pub fn title(&self) -> &BookTitle {
        &self.title
    }

    pub fn isbn(&self) -> &Isbn {
        &self.isbn
    }

    pub fn copies_available(&self) -> &AvailableCopies {
        &self.copies_available
    }

    pub fn copies_total(&self) -> &TotalCopies {
        &self.copies_total
    }

    pub fn is_active(&self) -> bool {
        !*self.deleted.as_ref()
    }
}
