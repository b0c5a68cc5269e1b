mod flag;
mod operation;

pub use self::{flag::*, operation::*};
