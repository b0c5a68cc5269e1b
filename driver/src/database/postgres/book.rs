use sqlx::types::Uuid;
use sqlx::PgConnection;

use kernel::interface::query::BookQuery;
use kernel::interface::update::BookModifier;
use kernel::prelude::entity::{
    AvailableCopies, Book, BookId, BookTitle, IsDeleted, Isbn, SelectLimit, SelectOffset,
    TotalCopies,
};
use kernel::KernelError;

use crate::database::postgres::PostgresTransaction;
use crate::error::ConvertError;

pub struct PostgresBookRepository;

#[async_trait::async_trait]
impl BookQuery for PostgresBookRepository {
    type Transaction = PostgresTransaction;

    async fn find_by_id(
        &self,
        con: &mut PostgresTransaction,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        PgBookInternal::find_by_id(con.connection(), id).await
    }

    async fn find_all(
        &self,
        con: &mut PostgresTransaction,
        limit: &SelectLimit,
        offset: &SelectOffset,
    ) -> error_stack::Result<Vec<Book>, KernelError> {
        PgBookInternal::find_all(con.connection(), limit, offset).await
    }
}

#[async_trait::async_trait]
impl BookModifier for PostgresBookRepository {
    type Transaction = PostgresTransaction;

    async fn create(
        &self,
        con: &mut PostgresTransaction,
        book: &Book,
    ) -> error_stack::Result<(), KernelError> {
        PgBookInternal::create(con.connection(), book).await
    }

    async fn update(
        &self,
        con: &mut PostgresTransaction,
        book: &Book,
    ) -> error_stack::Result<(), KernelError> {
        PgBookInternal::update(con.connection(), book).await
    }

    async fn reserve_copy(
        &self,
        con: &mut PostgresTransaction,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        PgBookInternal::reserve_copy(con.connection(), id).await
    }

    async fn release_copy(
        &self,
        con: &mut PostgresTransaction,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        PgBookInternal::release_copy(con.connection(), id).await
    }

    async fn update_stock(
        &self,
        con: &mut PostgresTransaction,
        id: &BookId,
        total: &TotalCopies,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        PgBookInternal::update_stock(con.connection(), id, total).await
    }

    async fn delete(
        &self,
        con: &mut PostgresTransaction,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        PgBookInternal::delete(con.connection(), id).await
    }
}

#[derive(sqlx::FromRow)]
struct BookRow {
    id: Uuid,
    title: String,
    isbn: String,
    copies_available: i32,
    copies_total: i32,
    is_deleted: bool,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Book::new(
            BookId::new(row.id),
            BookTitle::new(row.title),
            Isbn::new(row.isbn),
            AvailableCopies::new(row.copies_available),
            TotalCopies::new(row.copies_total),
            IsDeleted::new(row.is_deleted),
        )
    }
}

pub(in crate::database) struct PgBookInternal;

impl PgBookInternal {
    async fn find_by_id(
        con: &mut PgConnection,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        let row = sqlx::query_as::<_, BookRow>(
            // language=postgresql
            r#"
            SELECT id, title, isbn, copies_available, copies_total, is_deleted
            FROM books
            WHERE id = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.map(Book::from))
    }

    async fn find_all(
        con: &mut PgConnection,
        limit: &SelectLimit,
        offset: &SelectOffset,
    ) -> error_stack::Result<Vec<Book>, KernelError> {
        let rows = sqlx::query_as::<_, BookRow>(
            // language=postgresql
            r#"
            SELECT id, title, isbn, copies_available, copies_total, is_deleted
            FROM books
            WHERE is_deleted = FALSE
            ORDER BY title, id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit.as_ref())
        .bind(offset.as_ref())
        .fetch_all(con)
        .await
        .convert_error()?;
        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn create(con: &mut PgConnection, book: &Book) -> error_stack::Result<(), KernelError> {
        sqlx::query(
            // language=postgresql
            r#"
            INSERT INTO books (id, title, isbn, copies_available, copies_total, is_deleted)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(book.id().as_ref())
        .bind(book.title().as_ref())
        .bind(book.isbn().as_ref())
        .bind(book.copies_available().as_ref())
        .bind(book.copies_total().as_ref())
        .bind(!book.is_active())
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }

    async fn update(con: &mut PgConnection, book: &Book) -> error_stack::Result<(), KernelError> {
        sqlx::query(
            // language=postgresql
            r#"
            UPDATE books
            SET title = $2, isbn = $3
            WHERE id = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(book.id().as_ref())
        .bind(book.title().as_ref())
        .bind(book.isbn().as_ref())
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }

    async fn reserve_copy(
        con: &mut PgConnection,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        let row = sqlx::query_as::<_, BookRow>(
            // language=postgresql
            r#"
            UPDATE books
            SET copies_available = copies_available - 1
            WHERE id = $1 AND is_deleted = FALSE AND copies_available > 0
            RETURNING id, title, isbn, copies_available, copies_total, is_deleted
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.map(Book::from))
    }

    async fn release_copy(
        con: &mut PgConnection,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        let row = sqlx::query_as::<_, BookRow>(
            // language=postgresql
            r#"
            UPDATE books
            SET copies_available = copies_available + 1
            WHERE id = $1 AND copies_available < copies_total
            RETURNING id, title, isbn, copies_available, copies_total, is_deleted
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.map(Book::from))
    }

    async fn update_stock(
        con: &mut PgConnection,
        id: &BookId,
        total: &TotalCopies,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        // Availability shifts by the same delta as the total, so copies
        // out on loan stay out on loan.
        let row = sqlx::query_as::<_, BookRow>(
            // language=postgresql
            r#"
            UPDATE books
            SET copies_available = copies_available + $2 - copies_total,
                copies_total     = $2
            WHERE id = $1 AND is_deleted = FALSE
              AND copies_available + $2 - copies_total >= 0
            RETURNING id, title, isbn, copies_available, copies_total, is_deleted
            "#,
        )
        .bind(id.as_ref())
        .bind(total.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.map(Book::from))
    }

    async fn delete(
        con: &mut PgConnection,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        let row = sqlx::query_as::<_, BookRow>(
            // language=postgresql
            r#"
            UPDATE books
            SET is_deleted = TRUE
            WHERE id = $1 AND is_deleted = FALSE
              AND NOT EXISTS (SELECT 1
                              FROM loans
                              WHERE loans.book_id = books.id
                                AND loans.returned_at IS NULL
                                AND loans.is_deleted = FALSE)
            RETURNING id, title, isbn, copies_available, copies_total, is_deleted
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.map(Book::from))
    }
}

#[cfg(test)]
mod test {
    use uuid::Uuid;

    use kernel::interface::database::DatabaseConnection;
    use kernel::interface::query::BookQuery;
    use kernel::interface::update::BookModifier;
    use kernel::prelude::entity::{
        AvailableCopies, Book, BookId, BookTitle, IsDeleted, Isbn, TotalCopies,
    };
    use kernel::KernelError;

    use crate::database::postgres::book::PostgresBookRepository;
    use crate::database::postgres::PostgresDatabase;

    fn new_book(id: &BookId, copies: i32) -> Book {
        Book::new(
            id.clone(),
            BookTitle::new("test"),
            Isbn::new(Uuid::new_v4().to_string()),
            AvailableCopies::new(copies),
            TotalCopies::new(copies),
            IsDeleted::default(),
        )
    }

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn copy_accounting() -> error_stack::Result<(), KernelError> {
        let db = PostgresDatabase::new().await?;
        let mut con = db.transact().await?;
        let id = BookId::new(Uuid::new_v4());

        let book = new_book(&id, 1);
        PostgresBookRepository.create(&mut con, &book).await?;

        let found = PostgresBookRepository.find_by_id(&mut con, &id).await?;
        assert_eq!(found, Some(book));

        let reserved = PostgresBookRepository
            .reserve_copy(&mut con, &id)
            .await?
            .unwrap();
        assert_eq!(reserved.copies_available().as_ref(), &0);

        // Second reservation finds no copy left.
        let reserved = PostgresBookRepository.reserve_copy(&mut con, &id).await?;
        assert!(reserved.is_none());

        let released = PostgresBookRepository
            .release_copy(&mut con, &id)
            .await?
            .unwrap();
        assert_eq!(released.copies_available().as_ref(), &1);

        // All copies are home again, nothing to release.
        let released = PostgresBookRepository.release_copy(&mut con, &id).await?;
        assert!(released.is_none());

        Ok(())
    }

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn stock_update_keeps_outstanding_loans() -> error_stack::Result<(), KernelError> {
        let db = PostgresDatabase::new().await?;
        let mut con = db.transact().await?;
        let id = BookId::new(Uuid::new_v4());

        PostgresBookRepository
            .create(&mut con, &new_book(&id, 3))
            .await?;
        PostgresBookRepository.reserve_copy(&mut con, &id).await?;
        PostgresBookRepository.reserve_copy(&mut con, &id).await?;

        // Two copies out. Shrinking to 2 leaves zero available.
        let updated = PostgresBookRepository
            .update_stock(&mut con, &id, &TotalCopies::new(2))
            .await?
            .unwrap();
        assert_eq!(updated.copies_available().as_ref(), &0);
        assert_eq!(updated.copies_total().as_ref(), &2);

        // Shrinking below the outstanding count is refused.
        let updated = PostgresBookRepository
            .update_stock(&mut con, &id, &TotalCopies::new(1))
            .await?;
        assert!(updated.is_none());

        Ok(())
    }

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn deleted_books_disappear_from_reads() -> error_stack::Result<(), KernelError> {
        let db = PostgresDatabase::new().await?;
        let mut con = db.transact().await?;
        let id = BookId::new(Uuid::new_v4());

        PostgresBookRepository
            .create(&mut con, &new_book(&id, 1))
            .await?;
        let deleted = PostgresBookRepository.delete(&mut con, &id).await?;
        assert!(deleted.is_some());

        let found = PostgresBookRepository.find_by_id(&mut con, &id).await?;
        assert!(found.is_none());

        // Already gone; a second delete matches nothing.
        let deleted = PostgresBookRepository.delete(&mut con, &id).await?;
        assert!(deleted.is_none());

        Ok(())
    }
}
