mod memory;
mod postgres;
mod redis;

pub use self::{memory::*, postgres::*, redis::*};
