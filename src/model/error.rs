use crate::model::Id;
use thiserror::Error;

/// Failure taxonomy of the catalog engine. Every variant is a local
/// validation failure surfaced synchronously to the caller together with the
/// offending identifiers; `Storage` wraps unexpected store failures and must
/// never be conflated with the validation kinds.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A vector pair references a variation or option the proxy does not own.
    #[error("invalid vector for proxy '{proxy_id}': {detail}")]
    InvalidVector { proxy_id: Id, detail: String },

    /// The normalized vector is already assigned to a different product.
    /// Remapping requires an explicit removal first.
    #[error("vector already assigned to product '{existing_product_id}' under proxy '{proxy_id}'")]
    DuplicateVector {
        proxy_id: Id,
        existing_product_id: Id,
    },

    /// Assignment, link, assortment, variation or product is absent.
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: Id },

    /// Inserting the edge would make the assortment graph cyclic.
    #[error("linking '{parent_id}' -> '{child_id}' would create a cycle")]
    CycleDetected { parent_id: Id, child_id: Id },

    /// The exact parent/child pair (or assortment/product pair) already exists.
    #[error("'{parent_id}' is already linked to '{child_id}'")]
    DuplicateLink { parent_id: Id, child_id: Id },

    /// A reorder payload does not exactly match the current sibling set.
    /// Partial reorders are rejected so siblings are never silently stranded.
    #[error("reorder payload does not match the sibling set of '{scope_id}': {detail}")]
    IncompleteReorder { scope_id: Id, detail: String },

    /// Unexpected failure in the catalog store.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl CatalogError {
    /// Machine-readable kind string carried on the wire; the admin UI keys
    /// form-level failure rendering off these.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidVector { .. } => "InvalidVector",
            Self::DuplicateVector { .. } => "DuplicateVector",
            Self::NotFound { .. } => "NotFound",
            Self::CycleDetected { .. } => "CycleDetected",
            Self::DuplicateLink { .. } => "DuplicateLink",
            Self::IncompleteReorder { .. } => "IncompleteReorder",
            Self::Storage(_) => "StorageError",
        }
    }

    pub fn not_found(entity: &'static str, id: impl Into<Id>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn invalid_vector(proxy_id: impl Into<Id>, detail: impl Into<String>) -> Self {
        Self::InvalidVector {
            proxy_id: proxy_id.into(),
            detail: detail.into(),
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
