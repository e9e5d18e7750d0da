use crate::domain::{entities::Branch, value_objects::BranchId};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 分館リポジトリポート
#[async_trait]
pub trait BranchRepository: Send + Sync {
    async fn create(&self, branch: Branch) -> Result<Branch>;

    /// IDで分館を取得する
    ///
    /// 貸出中の分館一覧を組み立てる際にも使用される。
    async fn find_by_id(&self, branch_id: BranchId) -> Result<Option<Branch>>;

    async fn delete(&self, branch_id: BranchId) -> Result<()>;
}
