use crate::domain::{
    loan::Loan,
    value_objects::{BookId, BorrowerId, BranchId, CopyCount, LoanKey},
};
use crate::ports::copy_inventory::CopyInventory;
use crate::ports::loan_records::LoanRecords;
use crate::ports::unit_of_work::{
    Result, TransactionManager as TransactionManagerTrait, UnitOfWork as UnitOfWorkTrait,
};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};

fn invalid_data(message: String) -> Box<dyn std::error::Error + Send + Sync> {
    Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, message))
}

/// PostgreSQLの行データをLoanに変換する
fn map_row_to_loan(row: &PgRow) -> Result<Loan> {
    Ok(Loan {
        borrower_id: BorrowerId::from_uuid(row.try_get("borrower_id")?),
        book_id: BookId::from_uuid(row.try_get("book_id")?),
        branch_id: BranchId::from_uuid(row.try_get("branch_id")?),
        borrowed_at: row.try_get("borrowed_at")?,
        due_date: row.try_get("due_date")?,
        returned_on: None,
    })
}

/// PostgreSQL implementation of TransactionManager
///
/// Each unit of work wraps one database transaction taken from the pool.
pub struct TransactionManager {
    pool: PgPool,
}

impl TransactionManager {
    /// Create a new TransactionManager with a PostgreSQL connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionManagerTrait for TransactionManager {
    async fn begin(&self) -> Result<Box<dyn UnitOfWorkTrait>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(UnitOfWork { tx }))
    }
}

/// PostgreSQL implementation of UnitOfWork
///
/// Dropping the unit of work without calling `commit` rolls the transaction back.
/// Copy counts are read with `FOR UPDATE`, so a concurrent borrow of the same
/// (branch, book) waits until this transaction commits or rolls back.
pub struct UnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl CopyInventory for UnitOfWork {
    async fn get_copies(
        &mut self,
        branch_id: BranchId,
        book_id: BookId,
    ) -> crate::ports::copy_inventory::Result<CopyCount> {
        let copies: Option<i32> = sqlx::query_scalar(
            r#"
            SELECT no_of_copies
            FROM copies
            WHERE branch_id = $1 AND book_id = $2
            FOR UPDATE
            "#,
        )
        .bind(branch_id.value())
        .bind(book_id.value())
        .fetch_optional(&mut *self.tx)
        .await?;

        match copies {
            None => Ok(CopyCount::ZERO),
            Some(value) => CopyCount::try_from(value)
                .map_err(|_| invalid_data(format!("no_of_copies out of range: {}", value))),
        }
    }

    async fn set_copies(
        &mut self,
        branch_id: BranchId,
        book_id: BookId,
        copies: CopyCount,
    ) -> crate::ports::copy_inventory::Result<()> {
        let value = i32::try_from(copies.value())
            .map_err(|_| invalid_data(format!("no_of_copies out of range: {}", copies.value())))?;

        sqlx::query(
            r#"
            INSERT INTO copies (branch_id, book_id, no_of_copies)
            VALUES ($1, $2, $3)
            ON CONFLICT (branch_id, book_id)
            DO UPDATE SET no_of_copies = EXCLUDED.no_of_copies
            "#,
        )
        .bind(branch_id.value())
        .bind(book_id.value())
        .bind(value)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl LoanRecords for UnitOfWork {
    /// Insert a loan record
    ///
    /// A second active loan for the same (borrower, book, branch) violates the
    /// primary key and fails the transaction.
    async fn create(&mut self, loan: Loan) -> crate::ports::loan_records::Result<Loan> {
        sqlx::query(
            r#"
            INSERT INTO loans (borrower_id, book_id, branch_id, borrowed_at, due_date)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(loan.borrower_id.value())
        .bind(loan.book_id.value())
        .bind(loan.branch_id.value())
        .bind(loan.borrowed_at)
        .bind(loan.due_date)
        .execute(&mut *self.tx)
        .await?;

        Ok(loan)
    }

    /// Find the active loan for a key and lock its row
    ///
    /// A concurrent return of the same loan waits here; once the first one
    /// commits, the row is gone and the second sees no loan.
    async fn find_active(
        &mut self,
        key: LoanKey,
    ) -> crate::ports::loan_records::Result<Option<Loan>> {
        let row = sqlx::query(
            r#"
            SELECT borrower_id, book_id, branch_id, borrowed_at, due_date
            FROM loans
            WHERE borrower_id = $1 AND book_id = $2 AND branch_id = $3
            FOR UPDATE
            "#,
        )
        .bind(key.borrower_id.value())
        .bind(key.book_id.value())
        .bind(key.branch_id.value())
        .fetch_optional(&mut *self.tx)
        .await?;

        row.as_ref().map(map_row_to_loan).transpose()
    }

    async fn find_all_by_borrower(
        &mut self,
        borrower_id: BorrowerId,
    ) -> crate::ports::loan_records::Result<Vec<Loan>> {
        let rows = sqlx::query(
            r#"
            SELECT borrower_id, book_id, branch_id, borrowed_at, due_date
            FROM loans
            WHERE borrower_id = $1
            ORDER BY borrowed_at ASC, book_id ASC, branch_id ASC
            "#,
        )
        .bind(borrower_id.value())
        .fetch_all(&mut *self.tx)
        .await?;

        rows.iter().map(map_row_to_loan).collect()
    }

    /// Delete a loan record; fails if the row no longer exists
    async fn delete(&mut self, loan: &Loan) -> crate::ports::loan_records::Result<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM loans
            WHERE borrower_id = $1 AND book_id = $2 AND branch_id = $3
            "#,
        )
        .bind(loan.borrower_id.value())
        .bind(loan.book_id.value())
        .bind(loan.branch_id.value())
        .execute(&mut *self.tx)
        .await?;

        if result.rows_affected() != 1 {
            return Err(invalid_data(format!(
                "loan not found for borrower {}, book {}, branch {}",
                loan.borrower_id.value(),
                loan.book_id.value(),
                loan.branch_id.value()
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl UnitOfWorkTrait for UnitOfWork {
    fn copies(&mut self) -> &mut dyn CopyInventory {
        self
    }

    fn loans(&mut self) -> &mut dyn LoanRecords {
        self
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let UnitOfWork { tx } = *self;
        tx.commit().await?;
        Ok(())
    }
}
