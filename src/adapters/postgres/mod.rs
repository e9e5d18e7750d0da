pub mod book_repository;
pub mod borrower_repository;
pub mod branch_repository;
pub mod database;
pub mod unit_of_work;

// パブリックに型を再エクスポート
pub use book_repository::BookRepository as PostgresBookRepository;
pub use borrower_repository::BorrowerRepository as PostgresBorrowerRepository;
pub use branch_repository::BranchRepository as PostgresBranchRepository;
pub use unit_of_work::TransactionManager as PostgresTransactionManager;
