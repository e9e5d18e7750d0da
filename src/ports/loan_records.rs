use crate::domain::loan::Loan;
use crate::domain::value_objects::{BorrowerId, LoanKey};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 貸出記録ストアポート
///
/// 貸出記録は (利用者, 書籍, 分館) をキーとして保持される。
/// キーの一意性はストア側が保証し、違反はエラーとして返す。
#[async_trait]
pub trait LoanRecords: Send {
    /// 貸出記録を作成する
    async fn create(&mut self, loan: Loan) -> Result<Loan>;

    /// キーで貸出中の記録を探す
    async fn find_active(&mut self, key: LoanKey) -> Result<Option<Loan>>;

    /// 利用者の貸出中の記録をすべて取得する
    ///
    /// 貸出日時、キーの順で返す。
    async fn find_all_by_borrower(&mut self, borrower_id: BorrowerId) -> Result<Vec<Loan>>;

    /// 貸出記録を削除する
    async fn delete(&mut self, loan: &Loan) -> Result<()>;
}
