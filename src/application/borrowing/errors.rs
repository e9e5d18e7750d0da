use thiserror::Error;

/// 貸出・返却アプリケーション層のエラー
///
/// 「貸出可能な冊数がない」「返却する貸出がない」はエラーではなく、
/// `BorrowOutcome` / `ReturnOutcome` で表現される。
#[derive(Debug, Error)]
pub enum BorrowingApplicationError {
    /// 利用者が存在しない
    #[error("Borrower not found")]
    BorrowerNotFound,

    /// 書籍が存在しない
    #[error("Book not found")]
    BookNotFound,

    /// 分館が存在しない
    #[error("Branch not found")]
    BranchNotFound,

    /// ドメイン層のエラー
    #[error("Domain error: {0}")]
    DomainError(String),

    /// 作業単位（蔵書数・貸出記録）のエラー
    ///
    /// この作業単位の変更はcommitされない。
    #[error("Transaction error")]
    TransactionError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// 利用者・書籍・分館リポジトリのエラー
    #[error("Directory error")]
    DirectoryError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, BorrowingApplicationError>;
