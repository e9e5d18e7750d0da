use crate::domain::{entities::Borrower, value_objects::BorrowerId};
use crate::ports::borrower_repository::{BorrowerRepository as BorrowerRepositoryTrait, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row};

/// PostgreSQL implementation of BorrowerRepository
pub struct BorrowerRepository {
    pool: PgPool,
}

impl BorrowerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BorrowerRepositoryTrait for BorrowerRepository {
    async fn create(&self, borrower: Borrower) -> Result<Borrower> {
        sqlx::query(
            r#"
            INSERT INTO borrowers (borrower_id, name, address, phone)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(borrower.borrower_id.value())
        .bind(&borrower.name)
        .bind(&borrower.address)
        .bind(&borrower.phone)
        .execute(&self.pool)
        .await?;

        Ok(borrower)
    }

    async fn find_by_id(&self, borrower_id: BorrowerId) -> Result<Option<Borrower>> {
        let row = sqlx::query(
            r#"
            SELECT borrower_id, name, address, phone
            FROM borrowers
            WHERE borrower_id = $1
            "#,
        )
        .bind(borrower_id.value())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(Borrower {
            borrower_id: BorrowerId::from_uuid(row.try_get("borrower_id")?),
            name: row.try_get("name")?,
            address: row.try_get("address")?,
            phone: row.try_get("phone")?,
        }))
    }

    /// Delete a borrower; their loans are removed by the foreign key cascade
    async fn delete(&self, borrower_id: BorrowerId) -> Result<()> {
        sqlx::query("DELETE FROM borrowers WHERE borrower_id = $1")
            .bind(borrower_id.value())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
