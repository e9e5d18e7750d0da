use async_trait::async_trait;

use super::{copy_inventory::CopyInventory, loan_records::LoanRecords};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 作業単位ポート
///
/// 蔵書数と貸出記録への変更は、commitされるまで永続化されない。
/// commitせずにdropした場合、ステージされた変更はすべて破棄される（暗黙のロールバック）。
/// 同じ作業単位の中では自身の書き込みが読める（read-your-writes）。
#[async_trait]
pub trait UnitOfWork: Send {
    /// この作業単位の蔵書数ストア
    fn copies(&mut self) -> &mut dyn CopyInventory;

    /// この作業単位の貸出記録ストア
    fn loans(&mut self) -> &mut dyn LoanRecords;

    /// ステージされた変更をすべて永続化する（all-or-nothing）
    async fn commit(self: Box<Self>) -> Result<()>;
}

/// トランザクション管理ポート
///
/// 新しい作業単位を開始する。
#[async_trait]
pub trait TransactionManager: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>>;
}
