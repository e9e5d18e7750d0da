pub mod book_repository;
pub mod borrower_repository;
pub mod branch_repository;
pub mod error;
pub mod unit_of_work;

pub use book_repository::BookRepository;
pub use borrower_repository::BorrowerRepository;
pub use branch_repository::BranchRepository;
pub use error::InMemoryStoreError;
pub use unit_of_work::{TransactionManager, UnitOfWork};
