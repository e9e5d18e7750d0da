use crate::domain::{entities::Book, value_objects::BookId};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 書籍リポジトリポート
///
/// 貸出コンテキストとカタログコンテキストの境界を維持する。
/// 貸出コンテキストは書籍の存在確認にのみ使用する。
#[async_trait]
pub trait BookRepository: Send + Sync {
    async fn create(&self, book: Book) -> Result<Book>;

    async fn find_by_id(&self, book_id: BookId) -> Result<Option<Book>>;

    async fn delete(&self, book_id: BookId) -> Result<()>;
}
