mod borrowing_service;
mod errors;

pub use borrowing_service::{
    BorrowOutcome, ReturnOutcome, ServiceDependencies, begin, borrow_book, borrowed_books,
    branches_with_loans, commit, return_book,
};
pub use errors::{BorrowingApplicationError, Result};
