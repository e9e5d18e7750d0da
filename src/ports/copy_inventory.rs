use crate::domain::value_objects::{BookId, BranchId, CopyCount};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 蔵書数ストアポート
///
/// (分館, 書籍) ごとの貸出可能冊数を保持する。
/// 常に作業単位（UnitOfWork）の内側から操作される。
#[async_trait]
pub trait CopyInventory: Send {
    /// 貸出可能冊数を取得する
    ///
    /// 登録されていない組は0冊として扱う。
    async fn get_copies(&mut self, branch_id: BranchId, book_id: BookId) -> Result<CopyCount>;

    /// 貸出可能冊数を設定する
    async fn set_copies(
        &mut self,
        branch_id: BranchId,
        book_id: BookId,
        copies: CopyCount,
    ) -> Result<()>;
}
