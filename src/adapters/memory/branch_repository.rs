use crate::domain::{entities::Branch, value_objects::BranchId};
use crate::ports::branch_repository::{BranchRepository as BranchRepositoryTrait, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::error::InMemoryStoreError;

/// BranchRepositoryのインメモリ実装
pub struct BranchRepository {
    branches: Mutex<HashMap<BranchId, Branch>>,
}

impl BranchRepository {
    pub fn new() -> Self {
        Self {
            branches: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for BranchRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BranchRepositoryTrait for BranchRepository {
    async fn create(&self, branch: Branch) -> Result<Branch> {
        let mut branches = self
            .branches
            .lock()
            .map_err(|_| InMemoryStoreError::LockPoisoned)?;

        if branches.contains_key(&branch.branch_id) {
            return Err(Box::new(InMemoryStoreError::DuplicateId {
                entity: "Branch",
                id: branch.branch_id.value().to_string(),
            }));
        }

        branches.insert(branch.branch_id, branch.clone());
        Ok(branch)
    }

    async fn find_by_id(&self, branch_id: BranchId) -> Result<Option<Branch>> {
        let branches = self
            .branches
            .lock()
            .map_err(|_| InMemoryStoreError::LockPoisoned)?;
        Ok(branches.get(&branch_id).cloned())
    }

    async fn delete(&self, branch_id: BranchId) -> Result<()> {
        let mut branches = self
            .branches
            .lock()
            .map_err(|_| InMemoryStoreError::LockPoisoned)?;
        branches.remove(&branch_id);
        Ok(())
    }
}
