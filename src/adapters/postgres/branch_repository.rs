use crate::domain::{entities::Branch, value_objects::BranchId};
use crate::ports::branch_repository::{BranchRepository as BranchRepositoryTrait, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row};

/// BranchRepositoryのPostgreSQL実装
pub struct BranchRepository {
    pool: PgPool,
}

impl BranchRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BranchRepositoryTrait for BranchRepository {
    async fn create(&self, branch: Branch) -> Result<Branch> {
        sqlx::query(
            r#"
            INSERT INTO branches (branch_id, name, address)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(branch.branch_id.value())
        .bind(&branch.name)
        .bind(&branch.address)
        .execute(&self.pool)
        .await?;

        Ok(branch)
    }

    async fn find_by_id(&self, branch_id: BranchId) -> Result<Option<Branch>> {
        let row = sqlx::query(
            r#"
            SELECT branch_id, name, address
            FROM branches
            WHERE branch_id = $1
            "#,
        )
        .bind(branch_id.value())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(Branch {
            branch_id: BranchId::from_uuid(row.try_get("branch_id")?),
            name: row.try_get("name")?,
            address: row.try_get("address")?,
        }))
    }

    async fn delete(&self, branch_id: BranchId) -> Result<()> {
        sqlx::query("DELETE FROM branches WHERE branch_id = $1")
            .bind(branch_id.value())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
