use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{BookId, BorrowerId, BranchId, LoanKey};

/// コマンド：書籍を借りる
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowBook {
    pub borrower_id: BorrowerId,
    pub book_id: BookId,
    pub branch_id: BranchId,
    pub borrowed_at: DateTime<Utc>,
    pub due_date: NaiveDate,
}

impl BorrowBook {
    pub fn key(&self) -> LoanKey {
        LoanKey::new(self.borrower_id, self.book_id, self.branch_id)
    }
}

/// コマンド：書籍を返却する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnBook {
    pub borrower_id: BorrowerId,
    pub book_id: BookId,
    pub branch_id: BranchId,
    pub returned_on: NaiveDate,
}

impl ReturnBook {
    pub fn key(&self) -> LoanKey {
        LoanKey::new(self.borrower_id, self.book_id, self.branch_id)
    }
}
