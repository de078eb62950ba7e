use crate::logic::assortment_graph::AssortmentGraph;
use crate::logic::locks::ScopeLocks;
use crate::logic::variant_matrix::VariantMatrix;
use crate::store::traits::CatalogStore;
use std::sync::Arc;

/// Facade bundling the variant matrix and the assortment graph over one
/// shared store and one advisory lock registry. Shared behind an `Arc` by
/// callers that fan out across tasks.
pub struct CatalogEngine<S: CatalogStore> {
    store: Arc<S>,
    locks: ScopeLocks,
    default_locale: String,
}

impl<S: CatalogStore> CatalogEngine<S> {
    pub fn new(store: Arc<S>, default_locale: impl Into<String>) -> Self {
        Self {
            store,
            locks: ScopeLocks::new(),
            default_locale: default_locale.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    /// Variant matrix operations for proxy products.
    pub fn variants(&self) -> VariantMatrix<'_, S> {
        VariantMatrix::new(&self.store, &self.locks)
    }

    /// Assortment graph operations and breadcrumb queries.
    pub fn assortments(&self) -> AssortmentGraph<'_, S> {
        AssortmentGraph::new(&self.store, &self.locks, &self.default_locale)
    }
}
