//! Repository implementations using SeaORM

pub mod book_repository;
pub mod branch_repository;

pub use book_repository::SeaOrmBookRepository;
pub use branch_repository::SeaOrmBranchRepository;
