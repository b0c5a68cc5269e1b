mod approval;
mod book;
mod loan;
mod mq;
mod user;

pub use self::{approval::*, book::*, loan::*, mq::*, user::*};

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use kernel::interface::database::{DatabaseConnection, Transaction};
use kernel::prelude::entity::{ApprovalRequest, Book, Loan, User};
use kernel::KernelError;

/// Single-process storage with the same commit discipline as the
/// Postgres backend: a transaction works on a copy of the state and
/// publishes it on commit, while dropping it discards every write.
/// Transactions serialize on one lock, so each one observes the latest
/// committed state.
#[derive(Clone, Default)]
pub struct MemoryDatabase {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Clone, Default)]
pub(in crate::database) struct MemoryState {
    pub(in crate::database) books: HashMap<Uuid, Book>,
    pub(in crate::database) loans: HashMap<Uuid, Loan>,
    pub(in crate::database) users: HashMap<Uuid, User>,
    pub(in crate::database) approvals: HashMap<Uuid, ApprovalRequest>,
}

#[async_trait::async_trait]
impl DatabaseConnection for MemoryDatabase {
    type Transaction = MemoryTransaction;
    async fn transact(&self) -> error_stack::Result<Self::Transaction, KernelError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let working = MemoryState::clone(&guard);
        Ok(MemoryTransaction { guard, working })
    }
}

pub struct MemoryTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

impl MemoryTransaction {
    pub(in crate::database) fn state(&self) -> &MemoryState {
        &self.working
    }

    pub(in crate::database) fn state_mut(&mut self) -> &mut MemoryState {
        &mut self.working
    }
}

#[async_trait::async_trait]
impl Transaction for MemoryTransaction {
    async fn commit(self) -> error_stack::Result<(), KernelError> {
        let MemoryTransaction { mut guard, working } = self;
        *guard = working;
        Ok(())
    }

    async fn roll_back(self) -> error_stack::Result<(), KernelError> {
        Ok(())
    }
}
