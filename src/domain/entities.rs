use serde::{Deserialize, Serialize};

use super::{BookId, BorrowerId, BranchId};

/// 利用者
///
/// 貸出コンテキストは参照（BorrowerId）のみを保持し、ライフサイクルは管理しない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Borrower {
    pub borrower_id: BorrowerId,
    pub name: String,
    pub address: String,
    pub phone: String,
}

impl Borrower {
    pub fn new(name: impl Into<String>, address: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            borrower_id: BorrowerId::new(),
            name: name.into(),
            address: address.into(),
            phone: phone.into(),
        }
    }
}

/// 書籍（タイトル単位）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub book_id: BookId,
    pub title: String,
    pub author: Option<String>,
    pub publisher: Option<String>,
}

impl Book {
    pub fn new(title: impl Into<String>, author: Option<String>, publisher: Option<String>) -> Self {
        Self {
            book_id: BookId::new(),
            title: title.into(),
            author,
            publisher,
        }
    }
}

/// 分館
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub branch_id: BranchId,
    pub name: String,
    pub address: String,
}

impl Branch {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            branch_id: BranchId::new(),
            name: name.into(),
            address: address.into(),
        }
    }
}
