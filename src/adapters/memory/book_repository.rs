use crate::domain::{entities::Book, value_objects::BookId};
use crate::ports::book_repository::{BookRepository as BookRepositoryTrait, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::error::InMemoryStoreError;

/// BookRepositoryのインメモリ実装
///
/// 書籍を保存することで状態を持ったテストをサポート。
pub struct BookRepository {
    books: Mutex<HashMap<BookId, Book>>,
}

impl BookRepository {
    pub fn new() -> Self {
        Self {
            books: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for BookRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookRepositoryTrait for BookRepository {
    async fn create(&self, book: Book) -> Result<Book> {
        let mut books = self
            .books
            .lock()
            .map_err(|_| InMemoryStoreError::LockPoisoned)?;

        if books.contains_key(&book.book_id) {
            return Err(Box::new(InMemoryStoreError::DuplicateId {
                entity: "Book",
                id: book.book_id.value().to_string(),
            }));
        }

        books.insert(book.book_id, book.clone());
        Ok(book)
    }

    async fn find_by_id(&self, book_id: BookId) -> Result<Option<Book>> {
        let books = self
            .books
            .lock()
            .map_err(|_| InMemoryStoreError::LockPoisoned)?;
        Ok(books.get(&book_id).cloned())
    }

    async fn delete(&self, book_id: BookId) -> Result<()> {
        let mut books = self
            .books
            .lock()
            .map_err(|_| InMemoryStoreError::LockPoisoned)?;
        books.remove(&book_id);
        Ok(())
    }
}
