use crate::domain::{entities::Borrower, value_objects::BorrowerId};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 利用者リポジトリポート
///
/// 貸出コンテキストは利用者の存在確認にのみ使用する。
/// 利用者のライフサイクルは利用者コンテキストが管理する。
#[async_trait]
pub trait BorrowerRepository: Send + Sync {
    async fn create(&self, borrower: Borrower) -> Result<Borrower>;

    async fn find_by_id(&self, borrower_id: BorrowerId) -> Result<Option<Borrower>>;

    async fn delete(&self, borrower_id: BorrowerId) -> Result<()>;
}
