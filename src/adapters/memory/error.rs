use thiserror::Error;

/// インメモリアダプターのエラー
#[derive(Debug, Error)]
pub enum InMemoryStoreError {
    /// ロック保持中に別のスレッドがpanicした
    #[error("In-memory store lock poisoned")]
    LockPoisoned,

    /// 同じIDのエンティティが既に存在する
    #[error("{entity} already exists: {id}")]
    DuplicateId { entity: &'static str, id: String },

    /// 同じ (利用者, 書籍, 分館) の貸出が既に存在する
    #[error("Active loan already exists for borrower {borrower_id}, book {book_id}, branch {branch_id}")]
    DuplicateLoan {
        borrower_id: String,
        book_id: String,
        branch_id: String,
    },

    /// 他の作業単位が先に同じ (分館, 書籍) の冊数をcommitした
    #[error("Copy count for branch {branch_id}, book {book_id} was changed by another unit of work")]
    WriteConflict { branch_id: String, book_id: String },

    /// 削除する貸出が存在しない
    #[error("No active loan for borrower {borrower_id}, book {book_id}, branch {branch_id}")]
    LoanNotFound {
        borrower_id: String,
        book_id: String,
        branch_id: String,
    },
}
