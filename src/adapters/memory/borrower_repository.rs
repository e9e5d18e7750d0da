use crate::domain::{entities::Borrower, value_objects::BorrowerId};
use crate::ports::borrower_repository::{BorrowerRepository as BorrowerRepositoryTrait, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::error::InMemoryStoreError;

/// BorrowerRepositoryのインメモリ実装
///
/// 利用者をマップに保持し、状態を持つテストに使う。
pub struct BorrowerRepository {
    borrowers: Mutex<HashMap<BorrowerId, Borrower>>,
}

impl BorrowerRepository {
    pub fn new() -> Self {
        Self {
            borrowers: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for BorrowerRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BorrowerRepositoryTrait for BorrowerRepository {
    async fn create(&self, borrower: Borrower) -> Result<Borrower> {
        let mut borrowers = self
            .borrowers
            .lock()
            .map_err(|_| InMemoryStoreError::LockPoisoned)?;

        if borrowers.contains_key(&borrower.borrower_id) {
            return Err(Box::new(InMemoryStoreError::DuplicateId {
                entity: "Borrower",
                id: borrower.borrower_id.value().to_string(),
            }));
        }

        borrowers.insert(borrower.borrower_id, borrower.clone());
        Ok(borrower)
    }

    async fn find_by_id(&self, borrower_id: BorrowerId) -> Result<Option<Borrower>> {
        let borrowers = self
            .borrowers
            .lock()
            .map_err(|_| InMemoryStoreError::LockPoisoned)?;
        Ok(borrowers.get(&borrower_id).cloned())
    }

    async fn delete(&self, borrower_id: BorrowerId) -> Result<()> {
        let mut borrowers = self
            .borrowers
            .lock()
            .map_err(|_| InMemoryStoreError::LockPoisoned)?;
        borrowers.remove(&borrower_id);
        Ok(())
    }
}
