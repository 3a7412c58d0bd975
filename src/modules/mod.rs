//! Feature modules: Goodreads import and external integrations

pub mod import;
pub mod integrations;
