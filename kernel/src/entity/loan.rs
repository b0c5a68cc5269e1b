mod borrower;
mod id;
mod notes;
mod period;

pub use self::{borrower::*, id::*, notes::*, period::*};
use crate::entity::common::IsDeleted;
use crate::entity::BookId;
use destructure::{Destructure, Mutation};

/// One row per borrow event. Whether a loan is outstanding is derived
/// from `returned_at` rather than stored as a separate flag, so the two
/// can never disagree.
#[derive(Debug, Clone, Eq, PartialEq, Destructure, Mutation)]
pub struct Loan {
    id: LoanId,
    book_id: BookId,
    borrower_name: BorrowerName,
    borrower_email: BorrowerEmail,
    borrowed_at: BorrowedAt,
    due_date: DueDate,
    returned_at: Option<ReturnedAt>,
    notes: Option<LoanNotes>,
    deleted: IsDeleted<Loan>,
}

impl Loan {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: LoanId,
        book_id: BookId,
        borrower_name: BorrowerName,
        borrower_email: BorrowerEmail,
        borrowed_at: BorrowedAt,
        due_date: DueDate,
        returned_at: Option<ReturnedAt>,
        notes: Option<LoanNotes>,
        deleted: IsDeleted<Loan>,
    ) -> Self {
        Self {
            id,
            book_id,
            borrower_name,
            borrower_email,
            borrowed_at,
            due_date,
            returned_at,
            notes,
            deleted,
        }
    }

    pub fn id(&self) -> &LoanId {
        &self.id
    }

    pub fn book_id(&self) -> &BookId {
        &self.book_id
    }

    pub fn borrower_name(&self) -> &BorrowerName {
        &self.borrower_name
    }

    pub fn borrower_email(&self) -> &BorrowerEmail {
        &self.borrower_email
    }

    pub fn borrowed_at(&self) -> &BorrowedAt {
        &self.borrowed_at
    }

    pub fn due_date(&self) -> &DueDate {
        &self.due_date
    }

    pub fn returned_at(&self) -> Option<&ReturnedAt> {
        self.returned_at.as_ref()
    }

    pub fn notes(&self) -> Option<&LoanNotes> {
        self.notes.as_ref()
    }

    pub fn is_deleted(&self) -> bool {
        *self.deleted.as_ref()
    }

    /// Outstanding: not yet returned and not administratively removed.
    pub fn is_active(&self) -> bool {
        self.returned_at.is_none() && !self.is_deleted()
    }

    /// A return after the due date counts as overdue.
    pub fn was_returned_overdue(&self) -> bool {
        match &self.returned_at {
            Some(returned) => returned.as_ref() > self.due_date.as_ref(),
            None => false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::entity::BookId;
    use time::{Duration, OffsetDateTime};
    use uuid::Uuid;

    fn loan(returned_at: Option<ReturnedAt>) -> Loan {
        let now = OffsetDateTime::now_utc();
        Loan::new(
            LoanId::new(Uuid::new_v4()),
            BookId::new(Uuid::new_v4()),
            BorrowerName::new("Jane"),
            BorrowerEmail::new("jane@example.com"),
            BorrowedAt::new(now),
            DueDate::new(now + Duration::days(14)),
            returned_at,
            None,
            IsDeleted::default(),
        )
    }

    #[test]
    fn active_while_unreturned() {
        let loan = loan(None);
        assert!(loan.is_active());
        assert!(!loan.was_returned_overdue());
    }

    #[test]
    fn inactive_once_returned() {
        let now = OffsetDateTime::now_utc();
        let loan = loan(Some(ReturnedAt::new(now)));
        assert!(!loan.is_active());
    }

    #[test]
    fn overdue_when_returned_after_due_date() {
        let now = OffsetDateTime::now_utc();
        let loan = loan(Some(ReturnedAt::new(now + Duration::days(30))));
        assert!(loan.was_returned_overdue());
    }
}
