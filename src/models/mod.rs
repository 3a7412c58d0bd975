pub mod book;
pub mod branch;

pub use book::{AvailabilityEntry, Book};
pub use branch::Branch;
