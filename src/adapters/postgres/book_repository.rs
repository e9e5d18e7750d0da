use crate::domain::{entities::Book, value_objects::BookId};
use crate::ports::book_repository::{BookRepository as BookRepositoryTrait, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row};

/// BookRepositoryのPostgreSQL実装
pub struct BookRepository {
    pool: PgPool,
}

impl BookRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepositoryTrait for BookRepository {
    async fn create(&self, book: Book) -> Result<Book> {
        sqlx::query(
            r#"
            INSERT INTO books (book_id, title, author, publisher)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(book.book_id.value())
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.publisher)
        .execute(&self.pool)
        .await?;

        Ok(book)
    }

    async fn find_by_id(&self, book_id: BookId) -> Result<Option<Book>> {
        let row = sqlx::query(
            r#"
            SELECT book_id, title, author, publisher
            FROM books
            WHERE book_id = $1
            "#,
        )
        .bind(book_id.value())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(Book {
            book_id: BookId::from_uuid(row.try_get("book_id")?),
            title: row.try_get("title")?,
            author: row.try_get("author")?,
            publisher: row.try_get("publisher")?,
        }))
    }

    /// 書籍を削除する（蔵書数・貸出記録はカスケード削除）
    async fn delete(&self, book_id: BookId) -> Result<()> {
        sqlx::query("DELETE FROM books WHERE book_id = $1")
            .bind(book_id.value())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
