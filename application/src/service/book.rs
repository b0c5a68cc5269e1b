use error_stack::Report;
use uuid::Uuid;

use kernel::interface::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use kernel::interface::query::{BookQuery, DependOnBookQuery};
use kernel::interface::update::{BookModifier, DependOnBookModifier};
use kernel::prelude::entity::{AvailableCopies, Book, BookId, IsDeleted};
use kernel::KernelError;

use crate::transfer::{
    BookDto, CreateBookDto, DeleteBookDto, GetAllBookDto, GetBookDto, UpdateBookDto,
};

#[async_trait::async_trait]
pub trait BookService:
    'static + Sync + Send + DependOnDatabaseConnection + DependOnBookQuery + DependOnBookModifier
{
    /// New titles enter with every copy on the shelf.
    async fn create_book(&self, dto: CreateBookDto) -> error_stack::Result<BookDto, KernelError> {
        if *dto.copies_total.as_ref() < 0 {
            return Err(Report::new(KernelError::Validation)
                .attach_printable("Total copies cannot be negative"));
        }

        let mut connection = self.database_connection().transact().await?;

        let book = Book::new(
            BookId::new(Uuid::new_v4()),
            dto.title,
            dto.isbn,
            AvailableCopies::new(*dto.copies_total.as_ref()),
            dto.copies_total,
            IsDeleted::default(),
        );
        self.book_modifier().create(&mut connection, &book).await?;

        connection.commit().await?;
        Ok(BookDto::from(book))
    }

    async fn get_book(&self, dto: GetBookDto) -> error_stack::Result<Option<BookDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;
        let book = self
            .book_query()
            .find_by_id(&mut connection, &dto.id)
            .await?;
        connection.commit().await?;
        Ok(book.map(BookDto::from))
    }

    async fn list_books(
        &self,
        dto: GetAllBookDto,
    ) -> error_stack::Result<Vec<BookDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;
        let books = self
            .book_query()
            .find_all(&mut connection, &dto.limit, &dto.offset)
            .await?;
        connection.commit().await?;
        Ok(books.into_iter().map(BookDto::from).collect())
    }

    /// Title and ISBN rewrite in place. A changed total shifts the
    /// available count by the same delta and fails with `Conflict` when
    /// the new total cannot cover the copies currently out on loan.
    async fn update_book(&self, dto: UpdateBookDto) -> error_stack::Result<BookDto, KernelError> {
        if let Some(total) = &dto.copies_total {
            if *total.as_ref() < 0 {
                return Err(Report::new(KernelError::Validation)
                    .attach_printable("Total copies cannot be negative"));
            }
        }

        let mut connection = self.database_connection().transact().await?;

        let mut book = self
            .book_query()
            .find_by_id(&mut connection, &dto.id)
            .await?
            .ok_or_else(|| {
                Report::new(KernelError::NotFound)
                    .attach_printable(format!("Book {} does not exist", dto.id.as_ref()))
            })?;

        if dto.title.is_some() || dto.isbn.is_some() {
            book.substitute(|b| {
                if let Some(title) = dto.title {
                    *b.title = title;
                }
                if let Some(isbn) = dto.isbn {
                    *b.isbn = isbn;
                }
            });
            self.book_modifier().update(&mut connection, &book).await?;
        }

        let updated = match dto.copies_total {
            Some(total) => self
                .book_modifier()
                .update_stock(&mut connection, &dto.id, &total)
                .await?
                .ok_or_else(|| {
                    Report::new(KernelError::Conflict).attach_printable(format!(
                        "New total for book {} cannot cover its outstanding loans",
                        dto.id.as_ref()
                    ))
                })?,
            None => book,
        };

        connection.commit().await?;
        Ok(BookDto::from(updated))
    }

    async fn remove_book(&self, dto: DeleteBookDto) -> error_stack::Result<(), KernelError> {
        let mut connection = self.database_connection().transact().await?;

        if self
            .book_modifier()
            .delete(&mut connection, &dto.id)
            .await?
            .is_none()
        {
            return match self.book_query().find_by_id(&mut connection, &dto.id).await? {
                None => Err(Report::new(KernelError::NotFound)
                    .attach_printable(format!("Book {} does not exist", dto.id.as_ref()))),
                Some(_) => Err(Report::new(KernelError::Conflict).attach_printable(format!(
                    "Book {} still has copies out on loan",
                    dto.id.as_ref()
                ))),
            };
        }

        connection.commit().await?;
        Ok(())
    }
}

impl<T> BookService for T where T: DependOnBookQuery + DependOnBookModifier {}
