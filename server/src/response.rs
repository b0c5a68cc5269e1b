mod approval;
mod book;
mod loan;
mod queue;
mod user;

pub use self::{approval::*, book::*, loan::*, queue::*, user::*};
