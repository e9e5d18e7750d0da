pub mod borrowing;
