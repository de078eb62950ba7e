pub mod config;
pub mod logic;
pub mod model;
pub mod seed;
pub mod store;

// Export logic types
pub use logic::{
    assortment_paths, AssortmentGraph, CatalogEngine, LinkedAssortments, ScopeLocks, VariantMatrix,
};

// Export all model types
pub use model::*;

// Export seed module
pub use seed::*;

// Export store types
pub use store::{CatalogStore, MemoryStore, PostgresStore};
