use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::borrowing::ReturnOutcome;
use crate::domain::{
    commands::{BorrowBook, ReturnBook},
    entities::{Book, Borrower, Branch},
    loan::{self, Loan},
    value_objects::{BookId, BorrowerId, BranchId, CopyCount},
};

// ============================================================================
// Directory (利用者・書籍・分館)
// ============================================================================

/// 利用者登録リクエスト
#[derive(Debug, Deserialize)]
pub struct CreateBorrowerRequest {
    pub name: String,
    pub address: String,
    pub phone: String,
}

impl CreateBorrowerRequest {
    pub fn into_borrower(self) -> Borrower {
        Borrower::new(self.name, self.address, self.phone)
    }
}

/// 書籍登録リクエスト
#[derive(Debug, Deserialize)]
pub struct CreateBookRequest {
    pub title: String,
    pub author: Option<String>,
    pub publisher: Option<String>,
}

impl CreateBookRequest {
    pub fn into_book(self) -> Book {
        Book::new(self.title, self.author, self.publisher)
    }
}

/// 分館登録リクエスト
#[derive(Debug, Deserialize)]
pub struct CreateBranchRequest {
    pub name: String,
    pub address: String,
}

impl CreateBranchRequest {
    pub fn into_branch(self) -> Branch {
        Branch::new(self.name, self.address)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BorrowerResponse {
    pub borrower_id: Uuid,
    pub name: String,
    pub address: String,
    pub phone: String,
}

impl From<Borrower> for BorrowerResponse {
    fn from(borrower: Borrower) -> Self {
        Self {
            borrower_id: borrower.borrower_id.value(),
            name: borrower.name,
            address: borrower.address,
            phone: borrower.phone,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookResponse {
    pub book_id: Uuid,
    pub title: String,
    pub author: Option<String>,
    pub publisher: Option<String>,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            book_id: book.book_id.value(),
            title: book.title,
            author: book.author,
            publisher: book.publisher,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BranchResponse {
    pub branch_id: Uuid,
    pub name: String,
    pub address: String,
}

impl From<Branch> for BranchResponse {
    fn from(branch: Branch) -> Self {
        Self {
            branch_id: branch.branch_id.value(),
            name: branch.name,
            address: branch.address,
        }
    }
}

// ============================================================================
// 蔵書数
// ============================================================================

/// 設定できる蔵書数の上限（`copies.no_of_copies`はINTEGER列）
pub const MAX_COPIES: u32 = i32::MAX as u32;

/// 蔵書数設定リクエスト（PUT /branches/:branch_id/books/:book_id/copies）
#[derive(Debug, Deserialize)]
pub struct SetCopiesRequest {
    pub copies: u32,
}

impl SetCopiesRequest {
    /// 上限を超える場合はNone
    pub fn to_copy_count(&self) -> Option<CopyCount> {
        (self.copies <= MAX_COPIES).then(|| CopyCount::new(self.copies))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CopiesResponse {
    pub branch_id: Uuid,
    pub book_id: Uuid,
    pub copies: u32,
}

// ============================================================================
// 貸出・返却
// ============================================================================

/// 貸出リクエスト（POST /loans）
///
/// `borrowed_at`省略時は現在時刻、`due_date`省略時は貸出日から14日後。
#[derive(Debug, Deserialize)]
pub struct BorrowBookRequest {
    pub borrower_id: Uuid,
    pub book_id: Uuid,
    pub branch_id: Uuid,
    pub borrowed_at: Option<DateTime<Utc>>,
    pub due_date: Option<NaiveDate>,
}

impl BorrowBookRequest {
    pub fn to_command(&self, now: DateTime<Utc>) -> BorrowBook {
        let borrowed_at = self.borrowed_at.unwrap_or(now);
        BorrowBook {
            borrower_id: BorrowerId::from_uuid(self.borrower_id),
            book_id: BookId::from_uuid(self.book_id),
            branch_id: BranchId::from_uuid(self.branch_id),
            borrowed_at,
            due_date: self
                .due_date
                .unwrap_or_else(|| loan::default_due_date(borrowed_at)),
        }
    }
}

/// 返却リクエスト（POST /loans/return）
///
/// `returned_on`省略時は当日。
#[derive(Debug, Deserialize)]
pub struct ReturnBookRequest {
    pub borrower_id: Uuid,
    pub book_id: Uuid,
    pub branch_id: Uuid,
    pub returned_on: Option<NaiveDate>,
}

impl ReturnBookRequest {
    pub fn to_command(&self, today: NaiveDate) -> ReturnBook {
        ReturnBook {
            borrower_id: BorrowerId::from_uuid(self.borrower_id),
            book_id: BookId::from_uuid(self.book_id),
            branch_id: BranchId::from_uuid(self.branch_id),
            returned_on: self.returned_on.unwrap_or(today),
        }
    }
}

/// 貸出レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct LoanResponse {
    pub borrower_id: Uuid,
    pub book_id: Uuid,
    pub branch_id: Uuid,
    pub borrowed_at: DateTime<Utc>,
    pub due_date: NaiveDate,
}

impl From<Loan> for LoanResponse {
    fn from(loan: Loan) -> Self {
        Self {
            borrower_id: loan.borrower_id.value(),
            book_id: loan.book_id.value(),
            branch_id: loan.branch_id.value(),
            borrowed_at: loan.borrowed_at,
            due_date: loan.due_date,
        }
    }
}

/// 返却レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct BookReturnedResponse {
    pub borrower_id: Uuid,
    pub book_id: Uuid,
    pub branch_id: Uuid,
    pub accepted: bool,
    pub due_date: NaiveDate,
    pub returned_on: NaiveDate,
    pub was_overdue: bool,
}

impl BookReturnedResponse {
    /// 返却結果からレスポンスを組み立てる（NoActiveLoanの場合はNone）
    pub fn from_outcome(outcome: &ReturnOutcome) -> Option<Self> {
        let returned = outcome.returned()?;
        Some(Self {
            borrower_id: returned.loan.borrower_id.value(),
            book_id: returned.loan.book_id.value(),
            branch_id: returned.loan.branch_id.value(),
            accepted: outcome.is_accepted(),
            due_date: returned.loan.due_date,
            returned_on: returned.returned_on,
            was_overdue: returned.was_overdue,
        })
    }
}

/// エラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}
