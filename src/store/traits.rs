use crate::model::{
    Assortment, AssortmentFilter, AssortmentLink, AssortmentProduct, Id, Product,
    ProductVariation, ProductVariationAssignment,
};
use anyhow::Result;

/// Identity store for products. Product CRUD beyond identity (pricing,
/// media, commerce texts) lives outside the engine; the engine only needs
/// lookup, status and cascade removal.
#[async_trait::async_trait]
pub trait ProductStore: Send + Sync {
    async fn get_product(&self, id: &Id) -> Result<Option<Product>>;
    async fn get_product_by_slug(&self, slug: &str) -> Result<Option<Product>>;
    /// Ordered by sequence, then creation time.
    async fn list_products(&self) -> Result<Vec<Product>>;
    async fn upsert_product(&self, product: Product) -> Result<()>;
    /// Removes the product together with its variations, its assignment
    /// matrix and its assortment memberships, as one atomic operation.
    async fn delete_product(&self, id: &Id) -> Result<bool>;
}

#[async_trait::async_trait]
pub trait VariationStore: Send + Sync {
    async fn get_variation(&self, id: &Id) -> Result<Option<ProductVariation>>;
    /// Variations of a proxy in creation order.
    async fn list_variations(&self, product_id: &Id) -> Result<Vec<ProductVariation>>;
    async fn upsert_variation(&self, variation: ProductVariation) -> Result<()>;
    /// Removes the variation and every assignment whose vector references
    /// it, as one atomic operation.
    async fn delete_variation(&self, id: &Id) -> Result<bool>;
    /// Removes one option and every assignment whose vector uses the
    /// (variation, value) pair, as one atomic operation.
    async fn delete_variation_option(&self, variation_id: &Id, option_value: &str)
        -> Result<bool>;
}

/// The assignment matrix, keyed by (proxy, canonical vector key).
#[async_trait::async_trait]
pub trait AssignmentStore: Send + Sync {
    async fn get_assignment(
        &self,
        proxy_id: &Id,
        vector_key: &str,
    ) -> Result<Option<ProductVariationAssignment>>;
    async fn list_assignments(&self, proxy_id: &Id)
        -> Result<Vec<ProductVariationAssignment>>;
    async fn upsert_assignment(&self, assignment: ProductVariationAssignment) -> Result<()>;
    async fn delete_assignment(&self, proxy_id: &Id, vector_key: &str) -> Result<bool>;
}

#[async_trait::async_trait]
pub trait AssortmentStore: Send + Sync {
    async fn get_assortment(&self, id: &Id) -> Result<Option<Assortment>>;
    async fn get_assortment_by_slug(&self, slug: &str) -> Result<Option<Assortment>>;
    /// Ordered by sequence, then creation time.
    async fn list_assortments(&self) -> Result<Vec<Assortment>>;
    async fn upsert_assortment(&self, assortment: Assortment) -> Result<()>;
    /// Removes the node plus every link touching it (both directions), its
    /// product memberships and its filter assignments, as one atomic
    /// operation.
    async fn delete_assortment(&self, id: &Id) -> Result<bool>;
    async fn base_assortment(&self) -> Result<Option<Assortment>>;
    /// Atomic demote+promote: afterwards exactly the given assortment is
    /// base. Returns false when the id is unknown (nothing is changed).
    async fn set_base_assortment(&self, id: &Id) -> Result<bool>;
}

#[async_trait::async_trait]
pub trait AssortmentLinkStore: Send + Sync {
    async fn get_link(&self, id: &Id) -> Result<Option<AssortmentLink>>;
    /// Child links of a parent, ordered by sort key then creation time.
    async fn links_for_parent(&self, parent_id: &Id) -> Result<Vec<AssortmentLink>>;
    /// Parent edges of a child, for upward traversal.
    async fn links_for_child(&self, child_id: &Id) -> Result<Vec<AssortmentLink>>;
    async fn upsert_link(&self, link: AssortmentLink) -> Result<()>;
    /// Atomically rewrites the sort keys of the given links.
    async fn update_link_sort_keys(&self, entries: Vec<(Id, i32)>) -> Result<()>;
    async fn delete_link(&self, id: &Id) -> Result<bool>;
}

#[async_trait::async_trait]
pub trait AssortmentProductStore: Send + Sync {
    async fn get_assortment_product(&self, id: &Id) -> Result<Option<AssortmentProduct>>;
    /// Memberships of an assortment, ordered by sort key then creation time.
    async fn products_for_assortment(&self, assortment_id: &Id)
        -> Result<Vec<AssortmentProduct>>;
    /// Memberships of a product across assortments; the entry points of
    /// breadcrumb resolution.
    async fn assortments_for_product(&self, product_id: &Id) -> Result<Vec<AssortmentProduct>>;
    async fn upsert_assortment_product(&self, entry: AssortmentProduct) -> Result<()>;
    async fn update_assortment_product_sort_keys(&self, entries: Vec<(Id, i32)>) -> Result<()>;
    async fn delete_assortment_product(&self, id: &Id) -> Result<bool>;
}

#[async_trait::async_trait]
pub trait AssortmentFilterStore: Send + Sync {
    async fn get_assortment_filter(&self, id: &Id) -> Result<Option<AssortmentFilter>>;
    async fn filters_for_assortment(&self, assortment_id: &Id)
        -> Result<Vec<AssortmentFilter>>;
    async fn upsert_assortment_filter(&self, entry: AssortmentFilter) -> Result<()>;
    async fn update_assortment_filter_sort_keys(&self, entries: Vec<(Id, i32)>) -> Result<()>;
    async fn delete_assortment_filter(&self, id: &Id) -> Result<bool>;
}

pub trait CatalogStore:
    ProductStore
    + VariationStore
    + AssignmentStore
    + AssortmentStore
    + AssortmentLinkStore
    + AssortmentProductStore
    + AssortmentFilterStore
    + Send
    + Sync
{
}
