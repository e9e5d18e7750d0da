pub mod book_repository;
pub mod borrower_repository;
pub mod branch_repository;
pub mod copy_inventory;
pub mod loan_records;
pub mod unit_of_work;

pub use book_repository::*;
pub use borrower_repository::*;
pub use branch_repository::*;
pub use copy_inventory::*;
pub use loan_records::*;
pub use unit_of_work::*;
