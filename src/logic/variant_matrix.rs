use crate::logic::locks::ScopeLocks;
use crate::logic::ordering::next_sequence;
use crate::logic::vector::{is_superset, normalize_vector};
use crate::model::{
    canonical_vector_key, CatalogError, CatalogResult, Id, LocalizedText, Product,
    ProductVariation, ProductVariationAssignment, VariationOption, VectorInput,
};
use crate::store::traits::CatalogStore;
use chrono::Utc;
use log::{debug, info};

/// Maintains and queries the vector → product matrix of each configurable
/// proxy. Mutations hold the proxy's scope lock across validation and write;
/// `resolve` is a pure query.
pub struct VariantMatrix<'a, S: CatalogStore> {
    store: &'a S,
    locks: &'a ScopeLocks,
}

impl<'a, S: CatalogStore> VariantMatrix<'a, S> {
    pub fn new(store: &'a S, locks: &'a ScopeLocks) -> Self {
        Self { store, locks }
    }

    /// Upsert one matrix cell. Idempotent when the identical vector →
    /// product pair is resubmitted; remapping an occupied vector requires an
    /// explicit removal first.
    pub async fn add_assignment(
        &self,
        proxy_id: &Id,
        product_id: &Id,
        vectors: &[VectorInput],
    ) -> CatalogResult<ProductVariationAssignment> {
        let _guard = self.locks.acquire(proxy_id).await;

        self.require_proxy(proxy_id).await?;
        let target = self
            .store
            .get_product(product_id)
            .await?
            .ok_or_else(|| CatalogError::not_found("product", product_id.clone()))?;

        let variations = self.store.list_variations(proxy_id).await?;
        let pairs = normalize_vector(proxy_id, &variations, vectors)?;
        let vector_key = canonical_vector_key(&pairs);

        if let Some(existing) = self.store.get_assignment(proxy_id, &vector_key).await? {
            if existing.product_id == *product_id {
                debug!(
                    "assignment under proxy {} already maps to {}",
                    proxy_id, product_id
                );
                return Ok(existing);
            }
            return Err(CatalogError::DuplicateVector {
                proxy_id: proxy_id.clone(),
                existing_product_id: existing.product_id,
            });
        }

        let assignment =
            ProductVariationAssignment::new(proxy_id.clone(), target.id.clone(), pairs);
        self.store.upsert_assignment(assignment.clone()).await?;
        info!(
            "assigned vector {} -> product {} under proxy {}",
            vector_key, product_id, proxy_id
        );

        Ok(assignment)
    }

    /// Exact-match removal by normalized vector.
    pub async fn remove_assignment(
        &self,
        proxy_id: &Id,
        vectors: &[VectorInput],
    ) -> CatalogResult<ProductVariationAssignment> {
        let _guard = self.locks.acquire(proxy_id).await;

        self.require_proxy(proxy_id).await?;
        let variations = self.store.list_variations(proxy_id).await?;
        let pairs = normalize_vector(proxy_id, &variations, vectors)?;
        let vector_key = canonical_vector_key(&pairs);

        let assignment = self
            .store
            .get_assignment(proxy_id, &vector_key)
            .await?
            .ok_or_else(|| CatalogError::not_found("assignment", vector_key.clone()))?;

        self.store.delete_assignment(proxy_id, &vector_key).await?;

        Ok(assignment)
    }

    /// Candidates whose assignment vectors are supersets of the given pairs,
    /// in assignment creation order. A full vector (one pair per variation
    /// the proxy defines) matches at most one product. An empty vector
    /// matches every assignment.
    pub async fn resolve(
        &self,
        proxy_id: &Id,
        vectors: &[VectorInput],
        include_inactive: bool,
    ) -> CatalogResult<Vec<Product>> {
        self.require_proxy(proxy_id).await?;

        let pairs = if vectors.is_empty() {
            Vec::new()
        } else {
            let variations = self.store.list_variations(proxy_id).await?;
            normalize_vector(proxy_id, &variations, vectors)?
        };

        let mut products = Vec::new();
        for assignment in self.store.list_assignments(proxy_id).await? {
            if !is_superset(&assignment.vector, &pairs) {
                continue;
            }
            let Some(product) = self.store.get_product(&assignment.product_id).await? else {
                continue;
            };
            if include_inactive || product.is_active() {
                products.push(product);
            }
        }

        Ok(products)
    }

    /// Create a variation axis on a proxy. Keys are unique per proxy;
    /// creation order is the listing order.
    pub async fn create_variation(
        &self,
        proxy_id: &Id,
        key: &str,
        texts: Vec<LocalizedText>,
    ) -> CatalogResult<ProductVariation> {
        let _guard = self.locks.acquire(proxy_id).await;

        self.require_proxy(proxy_id).await?;
        let variations = self.store.list_variations(proxy_id).await?;
        if variations.iter().any(|v| v.key == key) {
            return Err(CatalogError::invalid_vector(
                proxy_id.clone(),
                format!("variation key '{}' already exists", key),
            ));
        }

        let sequence = next_sequence(variations.iter().map(|v| v.sequence));
        let mut variation = ProductVariation::new(proxy_id.clone(), key, sequence);
        variation.texts = texts;
        self.store.upsert_variation(variation.clone()).await?;

        Ok(variation)
    }

    /// Remove a variation and every assignment whose vector references it.
    pub async fn remove_variation(&self, variation_id: &Id) -> CatalogResult<ProductVariation> {
        let variation = self
            .store
            .get_variation(variation_id)
            .await?
            .ok_or_else(|| CatalogError::not_found("variation", variation_id.clone()))?;

        let _guard = self.locks.acquire(&variation.product_id).await;
        if !self.store.delete_variation(variation_id).await? {
            return Err(CatalogError::not_found("variation", variation_id.clone()));
        }
        info!(
            "removed variation {} from proxy {}",
            variation_id, variation.product_id
        );

        Ok(variation)
    }

    /// Append an option to a variation. Values are unique per variation;
    /// options keep creation order.
    pub async fn create_variation_option(
        &self,
        variation_id: &Id,
        value: &str,
        texts: Vec<LocalizedText>,
    ) -> CatalogResult<VariationOption> {
        let scope = self
            .store
            .get_variation(variation_id)
            .await?
            .ok_or_else(|| CatalogError::not_found("variation", variation_id.clone()))?
            .product_id;

        let _guard = self.locks.acquire(&scope).await;

        // Re-read under the scope lock.
        let mut variation = self
            .store
            .get_variation(variation_id)
            .await?
            .ok_or_else(|| CatalogError::not_found("variation", variation_id.clone()))?;

        if variation.has_option(value) {
            return Err(CatalogError::invalid_vector(
                variation.product_id.clone(),
                format!(
                    "option '{}' already exists on variation '{}'",
                    value, variation.key
                ),
            ));
        }

        let mut option = VariationOption::new(value, variation.next_option_sequence());
        option.texts = texts;
        variation.options.push(option.clone());
        variation.updated_at = Utc::now();
        self.store.upsert_variation(variation).await?;

        Ok(option)
    }

    /// Remove an option and every assignment whose vector uses the pair.
    pub async fn remove_variation_option(
        &self,
        variation_id: &Id,
        value: &str,
    ) -> CatalogResult<()> {
        let variation = self
            .store
            .get_variation(variation_id)
            .await?
            .ok_or_else(|| CatalogError::not_found("variation", variation_id.clone()))?;

        let _guard = self.locks.acquire(&variation.product_id).await;
        if !self
            .store
            .delete_variation_option(variation_id, value)
            .await?
        {
            return Err(CatalogError::not_found("variation option", value.to_string()));
        }

        Ok(())
    }

    /// Variations of a proxy in creation order.
    pub async fn list_variations(&self, proxy_id: &Id) -> CatalogResult<Vec<ProductVariation>> {
        self.require_product(proxy_id).await?;
        Ok(self.store.list_variations(proxy_id).await?)
    }

    /// Options of a variation in creation order.
    pub async fn list_options(&self, variation_id: &Id) -> CatalogResult<Vec<VariationOption>> {
        let variation = self
            .store
            .get_variation(variation_id)
            .await?
            .ok_or_else(|| CatalogError::not_found("variation", variation_id.clone()))?;

        let mut options = variation.options;
        options.sort_by_key(|o| o.sequence);
        Ok(options)
    }

    /// Assignments of a proxy in creation order.
    pub async fn list_assignments(
        &self,
        proxy_id: &Id,
    ) -> CatalogResult<Vec<ProductVariationAssignment>> {
        self.require_product(proxy_id).await?;
        Ok(self.store.list_assignments(proxy_id).await?)
    }

    async fn require_product(&self, id: &Id) -> CatalogResult<Product> {
        self.store
            .get_product(id)
            .await?
            .ok_or_else(|| CatalogError::not_found("product", id.clone()))
    }

    async fn require_proxy(&self, proxy_id: &Id) -> CatalogResult<Product> {
        let product = self.require_product(proxy_id).await?;
        if !product.is_proxy() {
            return Err(CatalogError::invalid_vector(
                proxy_id.clone(),
                format!("product '{}' is not a configurable proxy", product.slug),
            ));
        }
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProductKind;
    use crate::store::memory::MemoryStore;
    use crate::store::traits::ProductStore;

    struct Fixture {
        store: MemoryStore,
        locks: ScopeLocks,
        proxy_id: Id,
        red_id: Id,
        blue_id: Id,
    }

    impl Fixture {
        async fn new() -> Self {
            let store = MemoryStore::new();

            let mut proxy = Product::new(ProductKind::Configurable, "shirt");
            proxy.activate();
            let proxy_id = proxy.id.clone();
            store.upsert_product(proxy).await.unwrap();

            let mut red = Product::new(ProductKind::Simple, "shirt-red");
            red.activate();
            let red_id = red.id.clone();
            store.upsert_product(red).await.unwrap();

            let mut blue = Product::new(ProductKind::Simple, "shirt-blue");
            blue.activate();
            let blue_id = blue.id.clone();
            store.upsert_product(blue).await.unwrap();

            Self {
                store,
                locks: ScopeLocks::new(),
                proxy_id,
                red_id,
                blue_id,
            }
        }

        fn matrix(&self) -> VariantMatrix<'_, MemoryStore> {
            VariantMatrix::new(&self.store, &self.locks)
        }

        /// color ∈ {red, blue} on the proxy.
        async fn with_color(self) -> Self {
            let matrix = self.matrix();
            let variation = matrix
                .create_variation(&self.proxy_id, "color", vec![])
                .await
                .unwrap();
            matrix
                .create_variation_option(&variation.id, "red", vec![])
                .await
                .unwrap();
            matrix
                .create_variation_option(&variation.id, "blue", vec![])
                .await
                .unwrap();
            self
        }
    }

    #[tokio::test]
    async fn assign_and_resolve_single_variation() {
        let fx = Fixture::new().await.with_color().await;
        let matrix = fx.matrix();

        matrix
            .add_assignment(&fx.proxy_id, &fx.red_id, &[VectorInput::new("color", "red")])
            .await
            .unwrap();

        let hits = matrix
            .resolve(&fx.proxy_id, &[VectorInput::new("color", "red")], false)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, fx.red_id);

        let err = matrix
            .resolve(&fx.proxy_id, &[VectorInput::new("color", "green")], false)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "InvalidVector");
    }

    #[tokio::test]
    async fn remap_requires_removal_first() {
        let fx = Fixture::new().await.with_color().await;
        let matrix = fx.matrix();
        let vector = [VectorInput::new("color", "red")];

        matrix
            .add_assignment(&fx.proxy_id, &fx.red_id, &vector)
            .await
            .unwrap();

        // Identical resubmission is idempotent.
        matrix
            .add_assignment(&fx.proxy_id, &fx.red_id, &vector)
            .await
            .unwrap();
        assert_eq!(matrix.list_assignments(&fx.proxy_id).await.unwrap().len(), 1);

        let err = matrix
            .add_assignment(&fx.proxy_id, &fx.blue_id, &vector)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "DuplicateVector");

        matrix.remove_assignment(&fx.proxy_id, &vector).await.unwrap();
        matrix
            .add_assignment(&fx.proxy_id, &fx.blue_id, &vector)
            .await
            .unwrap();

        let hits = matrix.resolve(&fx.proxy_id, &vector, false).await.unwrap();
        assert_eq!(hits[0].id, fx.blue_id);
    }

    #[tokio::test]
    async fn resolve_is_order_independent_over_two_variations() {
        let fx = Fixture::new().await.with_color().await;
        let matrix = fx.matrix();

        let size = matrix
            .create_variation(&fx.proxy_id, "size", vec![])
            .await
            .unwrap();
        matrix
            .create_variation_option(&size.id, "xl", vec![])
            .await
            .unwrap();

        matrix
            .add_assignment(
                &fx.proxy_id,
                &fx.red_id,
                &[
                    VectorInput::new("color", "red"),
                    VectorInput::new("size", "xl"),
                ],
            )
            .await
            .unwrap();

        let forward = matrix
            .resolve(
                &fx.proxy_id,
                &[
                    VectorInput::new("color", "red"),
                    VectorInput::new("size", "xl"),
                ],
                false,
            )
            .await
            .unwrap();
        let reversed = matrix
            .resolve(
                &fx.proxy_id,
                &[
                    VectorInput::new("size", "xl"),
                    VectorInput::new("color", "red"),
                ],
                false,
            )
            .await
            .unwrap();

        assert_eq!(forward.len(), 1);
        assert_eq!(
            forward.iter().map(|p| &p.id).collect::<Vec<_>>(),
            reversed.iter().map(|p| &p.id).collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn partial_vector_narrows_candidates() {
        let fx = Fixture::new().await.with_color().await;
        let matrix = fx.matrix();

        let size = matrix
            .create_variation(&fx.proxy_id, "size", vec![])
            .await
            .unwrap();
        for value in ["m", "xl"] {
            matrix
                .create_variation_option(&size.id, value, vec![])
                .await
                .unwrap();
        }

        matrix
            .add_assignment(
                &fx.proxy_id,
                &fx.red_id,
                &[
                    VectorInput::new("color", "red"),
                    VectorInput::new("size", "m"),
                ],
            )
            .await
            .unwrap();
        matrix
            .add_assignment(
                &fx.proxy_id,
                &fx.blue_id,
                &[
                    VectorInput::new("color", "blue"),
                    VectorInput::new("size", "m"),
                ],
            )
            .await
            .unwrap();

        let by_size = matrix
            .resolve(&fx.proxy_id, &[VectorInput::new("size", "m")], false)
            .await
            .unwrap();
        assert_eq!(by_size.len(), 2);

        let by_color = matrix
            .resolve(&fx.proxy_id, &[VectorInput::new("color", "blue")], false)
            .await
            .unwrap();
        assert_eq!(by_color.len(), 1);
        assert_eq!(by_color[0].id, fx.blue_id);
    }

    #[tokio::test]
    async fn inactive_targets_are_hidden_by_default() {
        let fx = Fixture::new().await.with_color().await;
        let matrix = fx.matrix();
        let vector = [VectorInput::new("color", "red")];

        matrix
            .add_assignment(&fx.proxy_id, &fx.red_id, &vector)
            .await
            .unwrap();

        let mut red = fx.store.get_product(&fx.red_id).await.unwrap().unwrap();
        red.deactivate();
        fx.store.upsert_product(red).await.unwrap();

        assert!(matrix
            .resolve(&fx.proxy_id, &vector, false)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(
            matrix.resolve(&fx.proxy_id, &vector, true).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn assignment_round_trip_restores_prior_state() {
        let fx = Fixture::new().await.with_color().await;
        let matrix = fx.matrix();
        let vector = [VectorInput::new("color", "red")];

        matrix
            .add_assignment(&fx.proxy_id, &fx.red_id, &vector)
            .await
            .unwrap();
        matrix.remove_assignment(&fx.proxy_id, &vector).await.unwrap();

        assert!(matrix
            .list_assignments(&fx.proxy_id)
            .await
            .unwrap()
            .is_empty());

        let err = matrix
            .remove_assignment(&fx.proxy_id, &vector)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "NotFound");
    }

    #[tokio::test]
    async fn variations_and_options_list_in_creation_order() {
        let fx = Fixture::new().await;
        let matrix = fx.matrix();

        matrix
            .create_variation(&fx.proxy_id, "color", vec![])
            .await
            .unwrap();
        let size = matrix
            .create_variation(&fx.proxy_id, "size", vec![])
            .await
            .unwrap();

        let keys: Vec<String> = matrix
            .list_variations(&fx.proxy_id)
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.key)
            .collect();
        assert_eq!(keys, vec!["color", "size"]);

        for value in ["s", "m", "l"] {
            matrix
                .create_variation_option(&size.id, value, vec![])
                .await
                .unwrap();
        }
        let values: Vec<String> = matrix
            .list_options(&size.id)
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.value)
            .collect();
        assert_eq!(values, vec!["s", "m", "l"]);

        let err = matrix
            .create_variation(&fx.proxy_id, "color", vec![])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "InvalidVector");
    }

    #[tokio::test]
    async fn removing_a_variation_cascades_assignments() {
        let fx = Fixture::new().await.with_color().await;
        let matrix = fx.matrix();

        matrix
            .add_assignment(&fx.proxy_id, &fx.red_id, &[VectorInput::new("color", "red")])
            .await
            .unwrap();

        let color = matrix.list_variations(&fx.proxy_id).await.unwrap().remove(0);
        matrix.remove_variation(&color.id).await.unwrap();

        assert!(matrix
            .list_assignments(&fx.proxy_id)
            .await
            .unwrap()
            .is_empty());
        assert!(matrix
            .list_variations(&fx.proxy_id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn non_proxy_products_cannot_hold_assignments() {
        let fx = Fixture::new().await;
        let matrix = fx.matrix();

        let err = matrix
            .add_assignment(&fx.red_id, &fx.blue_id, &[VectorInput::new("color", "red")])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "InvalidVector");

        let err = matrix
            .resolve(&"missing".to_string(), &[], false)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "NotFound");
    }
}
