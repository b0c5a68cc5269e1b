use kernel::interface::query::BookQuery;
use kernel::interface::update::BookModifier;
use kernel::prelude::entity::{
    AvailableCopies, Book, BookId, IsDeleted, SelectLimit, SelectOffset, TotalCopies,
};
use kernel::KernelError;

use crate::database::memory::MemoryTransaction;

pub struct MemoryBookRepository;

#[async_trait::async_trait]
impl BookQuery for MemoryBookRepository {
    type Transaction = MemoryTransaction;

    async fn find_by_id(
        &self,
        con: &mut MemoryTransaction,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        Ok(con
            .state()
            .books
            .get(id.as_ref())
            .filter(|book| book.is_active())
            .cloned())
    }

    async fn find_all(
        &self,
        con: &mut MemoryTransaction,
        limit: &SelectLimit,
        offset: &SelectOffset,
    ) -> error_stack::Result<Vec<Book>, KernelError> {
        let mut books: Vec<Book> = con
            .state()
            .books
            .values()
            .filter(|book| book.is_active())
            .cloned()
            .collect();
        books.sort_by(|a, b| {
            a.title()
                .as_ref()
                .cmp(b.title().as_ref())
                .then_with(|| a.id().as_ref().cmp(b.id().as_ref()))
        });
        let offset = usize::try_from(*offset.as_ref()).unwrap_or(0);
        let limit = usize::try_from(*limit.as_ref()).unwrap_or(0);
        Ok(books.into_iter().skip(offset).take(limit).collect())
    }
}

#[async_trait::async_trait]
impl BookModifier for MemoryBookRepository {
    type Transaction = MemoryTransaction;

    async fn create(
        &self,
        con: &mut MemoryTransaction,
        book: &Book,
    ) -> error_stack::Result<(), KernelError> {
        con.state_mut()
            .books
            .insert(*book.id().as_ref(), book.clone());
        Ok(())
    }

    async fn update(
        &self,
        con: &mut MemoryTransaction,
        book: &Book,
    ) -> error_stack::Result<(), KernelError> {
        if let Some(stored) = con.state_mut().books.get_mut(book.id().as_ref()) {
            if stored.is_active() {
                stored.substitute(|stored| {
                    *stored.title = book.title().clone();
                    *stored.isbn = book.isbn().clone();
                });
            }
        }
        Ok(())
    }

    async fn reserve_copy(
        &self,
        con: &mut MemoryTransaction,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        let Some(stored) = con.state_mut().books.get_mut(id.as_ref()) else {
            return Ok(None);
        };
        let available = *stored.copies_available().as_ref();
        if !stored.is_active() || available <= 0 {
            return Ok(None);
        }
        stored.substitute(|stored| {
            *stored.copies_available = AvailableCopies::new(available - 1);
        });
        Ok(Some(stored.clone()))
    }

    async fn release_copy(
        &self,
        con: &mut MemoryTransaction,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        let Some(stored) = con.state_mut().books.get_mut(id.as_ref()) else {
            return Ok(None);
        };
        let available = *stored.copies_available().as_ref();
        if available >= *stored.copies_total().as_ref() {
            return Ok(None);
        }
        stored.substitute(|stored| {
            *stored.copies_available = AvailableCopies::new(available + 1);
        });
        Ok(Some(stored.clone()))
    }

    async fn update_stock(
        &self,
        con: &mut MemoryTransaction,
        id: &BookId,
        total: &TotalCopies,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        let Some(stored) = con.state_mut().books.get_mut(id.as_ref()) else {
            return Ok(None);
        };
        let shifted = *stored.copies_available().as_ref() + *total.as_ref()
            - *stored.copies_total().as_ref();
        if !stored.is_active() || shifted < 0 {
            return Ok(None);
        }
        stored.substitute(|stored| {
            *stored.copies_available = AvailableCopies::new(shifted);
            *stored.copies_total = total.clone();
        });
        Ok(Some(stored.clone()))
    }

    async fn delete(
        &self,
        con: &mut MemoryTransaction,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        let state = con.state_mut();
        let borrowed = state
            .loans
            .values()
            .any(|loan| loan.book_id() == id && loan.is_active());
        let Some(stored) = state.books.get_mut(id.as_ref()) else {
            return Ok(None);
        };
        if !stored.is_active() || borrowed {
            return Ok(None);
        }
        stored.substitute(|stored| {
            *stored.deleted = IsDeleted::new(true);
        });
        Ok(Some(stored.clone()))
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

    use crate::database::memory::{MemoryBookRepository, MemoryDatabase};

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

    #[tokio::test]
    async fn copies_never_go_negative() -> error_stack::Result<(), KernelError> {
        let db = MemoryDatabase::new();
        let mut con = db.transact().await?;
        let id = BookId::new(Uuid::new_v4());
        MemoryBookRepository
            .create(&mut con, &new_book(&id, 1))
            .await?;

        assert!(MemoryBookRepository
            .reserve_copy(&mut con, &id)
            .await?
            .is_some());
        assert!(MemoryBookRepository
            .reserve_copy(&mut con, &id)
            .await?
            .is_none());
        assert!(MemoryBookRepository
            .release_copy(&mut con, &id)
            .await?
            .is_some());
        assert!(MemoryBookRepository
            .release_copy(&mut con, &id)
            .await?
            .is_none());
        Ok(())
    }

    #[tokio::test]
    async fn stock_shrink_respects_outstanding_copies() -> error_stack::Result<(), KernelError> {
        let db = MemoryDatabase::new();
        let mut con = db.transact().await?;
        let id = BookId::new(Uuid::new_v4());
        MemoryBookRepository
            .create(&mut con, &new_book(&id, 3))
            .await?;
        MemoryBookRepository.reserve_copy(&mut con, &id).await?;
        MemoryBookRepository.reserve_copy(&mut con, &id).await?;

        let updated = MemoryBookRepository
            .update_stock(&mut con, &id, &TotalCopies::new(2))
            .await?
            .unwrap();
        assert_eq!(updated.copies_available().as_ref(), &0);

        assert!(MemoryBookRepository
            .update_stock(&mut con, &id, &TotalCopies::new(1))
            .await?
            .is_none());

        let found = MemoryBookRepository.find_by_id(&mut con, &id).await?;
        assert_eq!(found.unwrap().copies_total().as_ref(), &2);
        Ok(())
    }
}
