mod approval;
mod book;
mod loan;
mod user;

pub use self::{approval::*, book::*, loan::*, user::*};
