//! External catalogue integrations

pub mod catalogue;

pub use catalogue::{
    Catalogue, CatalogueConfig, CatalogueError, NlbCatalogueClient, TitleCandidate,
};
