mod approval;
mod book;
mod common;
mod loan;
mod user;

pub use self::{approval::*, book::*, common::*, loan::*, user::*};
