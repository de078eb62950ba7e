use crate::model::{
    Assortment, AssortmentFilter, AssortmentLink, AssortmentProduct, Id, Product,
    ProductVariation, ProductVariationAssignment,
};
use crate::store::traits::{
    AssignmentStore, AssortmentFilterStore, AssortmentLinkStore, AssortmentProductStore,
    AssortmentStore, CatalogStore, ProductStore, VariationStore,
};
use anyhow::{anyhow, Result};
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Everything the in-memory backend holds, behind a single lock. Every
/// store operation is one critical section, so multi-row cascades and batch
/// reorders are atomic by construction.
#[derive(Debug, Default)]
struct CatalogState {
    products: HashMap<Id, Product>,
    variations: HashMap<Id, ProductVariation>,
    /// Keyed by (proxy id, canonical vector key).
    assignments: HashMap<(Id, String), ProductVariationAssignment>,
    assortments: HashMap<Id, Assortment>,
    links: HashMap<Id, AssortmentLink>,
    assortment_products: HashMap<Id, AssortmentProduct>,
    assortment_filters: HashMap<Id, AssortmentFilter>,
}

/// In-memory catalog store. The default backend for tests, seed runs and
/// environments without PostgreSQL.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<CatalogState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ProductStore for MemoryStore {
    async fn get_product(&self, id: &Id) -> Result<Option<Product>> {
        Ok(self.state.read().products.get(id).cloned())
    }

    async fn get_product_by_slug(&self, slug: &str) -> Result<Option<Product>> {
        Ok(self
            .state
            .read()
            .products
            .values()
            .find(|p| p.slug == slug)
            .cloned())
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        let mut products: Vec<Product> = self.state.read().products.values().cloned().collect();
        products.sort_by(|a, b| {
            a.sequence
                .cmp(&b.sequence)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(products)
    }

    async fn upsert_product(&self, product: Product) -> Result<()> {
        self.state.write().products.insert(product.id.clone(), product);
        Ok(())
    }

    async fn delete_product(&self, id: &Id) -> Result<bool> {
        let mut state = self.state.write();
        if state.products.remove(id).is_none() {
            return Ok(false);
        }
        state.variations.retain(|_, v| &v.product_id != id);
        state
            .assignments
            .retain(|_, a| &a.proxy_id != id && &a.product_id != id);
        state.assortment_products.retain(|_, m| &m.product_id != id);
        Ok(true)
    }
}

#[async_trait::async_trait]
impl VariationStore for MemoryStore {
    async fn get_variation(&self, id: &Id) -> Result<Option<ProductVariation>> {
        Ok(self.state.read().variations.get(id).cloned())
    }

    async fn list_variations(&self, product_id: &Id) -> Result<Vec<ProductVariation>> {
        let mut variations: Vec<ProductVariation> = self
            .state
            .read()
            .variations
            .values()
            .filter(|v| &v.product_id == product_id)
            .cloned()
            .collect();
        variations.sort_by(|a, b| {
            a.sequence
                .cmp(&b.sequence)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(variations)
    }

    async fn upsert_variation(&self, variation: ProductVariation) -> Result<()> {
        self.state
            .write()
            .variations
            .insert(variation.id.clone(), variation);
        Ok(())
    }

    async fn delete_variation(&self, id: &Id) -> Result<bool> {
        let mut state = self.state.write();
        let Some(variation) = state.variations.remove(id) else {
            return Ok(false);
        };
        // Assignments whose vector references the removed variation are gone
        // with it; partial vectors over the remaining variations survive.
        state.assignments.retain(|_, a| {
            a.proxy_id != variation.product_id || !a.vector.iter().any(|p| &p.variation_id == id)
        });
        Ok(true)
    }

    async fn delete_variation_option(
        &self,
        variation_id: &Id,
        option_value: &str,
    ) -> Result<bool> {
        let mut state = self.state.write();
        let Some(variation) = state.variations.get_mut(variation_id) else {
            return Ok(false);
        };
        let before = variation.options.len();
        variation.options.retain(|o| o.value != option_value);
        if variation.options.len() == before {
            return Ok(false);
        }
        variation.updated_at = Utc::now();
        let proxy_id = variation.product_id.clone();
        state.assignments.retain(|_, a| {
            a.proxy_id != proxy_id
                || !a
                    .vector
                    .iter()
                    .any(|p| &p.variation_id == variation_id && p.option_value == option_value)
        });
        Ok(true)
    }
}

#[async_trait::async_trait]
impl AssignmentStore for MemoryStore {
    async fn get_assignment(
        &self,
        proxy_id: &Id,
        vector_key: &str,
    ) -> Result<Option<ProductVariationAssignment>> {
        Ok(self
            .state
            .read()
            .assignments
            .get(&(proxy_id.clone(), vector_key.to_string()))
            .cloned())
    }

    async fn list_assignments(
        &self,
        proxy_id: &Id,
    ) -> Result<Vec<ProductVariationAssignment>> {
        let mut assignments: Vec<ProductVariationAssignment> = self
            .state
            .read()
            .assignments
            .values()
            .filter(|a| &a.proxy_id == proxy_id)
            .cloned()
            .collect();
        assignments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(assignments)
    }

    async fn upsert_assignment(&self, assignment: ProductVariationAssignment) -> Result<()> {
        let key = (assignment.proxy_id.clone(), assignment.vector_key());
        self.state.write().assignments.insert(key, assignment);
        Ok(())
    }

    async fn delete_assignment(&self, proxy_id: &Id, vector_key: &str) -> Result<bool> {
        Ok(self
            .state
            .write()
            .assignments
            .remove(&(proxy_id.clone(), vector_key.to_string()))
            .is_some())
    }
}

#[async_trait::async_trait]
impl AssortmentStore for MemoryStore {
    async fn get_assortment(&self, id: &Id) -> Result<Option<Assortment>> {
        Ok(self.state.read().assortments.get(id).cloned())
    }

    async fn get_assortment_by_slug(&self, slug: &str) -> Result<Option<Assortment>> {
        Ok(self
            .state
            .read()
            .assortments
            .values()
            .find(|a| a.slug == slug)
            .cloned())
    }

    async fn list_assortments(&self) -> Result<Vec<Assortment>> {
        let mut assortments: Vec<Assortment> =
            self.state.read().assortments.values().cloned().collect();
        assortments.sort_by(|a, b| {
            a.sequence
                .cmp(&b.sequence)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(assortments)
    }

    async fn upsert_assortment(&self, assortment: Assortment) -> Result<()> {
        self.state
            .write()
            .assortments
            .insert(assortment.id.clone(), assortment);
        Ok(())
    }

    async fn delete_assortment(&self, id: &Id) -> Result<bool> {
        let mut state = self.state.write();
        if state.assortments.remove(id).is_none() {
            return Ok(false);
        }
        state
            .links
            .retain(|_, l| &l.parent_assortment_id != id && &l.child_assortment_id != id);
        state
            .assortment_products
            .retain(|_, m| &m.assortment_id != id);
        state
            .assortment_filters
            .retain(|_, f| &f.assortment_id != id);
        Ok(true)
    }

    async fn base_assortment(&self) -> Result<Option<Assortment>> {
        Ok(self
            .state
            .read()
            .assortments
            .values()
            .find(|a| a.is_base)
            .cloned())
    }

    async fn set_base_assortment(&self, id: &Id) -> Result<bool> {
        let mut state = self.state.write();
        if !state.assortments.contains_key(id) {
            return Ok(false);
        }
        let now = Utc::now();
        for assortment in state.assortments.values_mut() {
            let should_be_base = &assortment.id == id;
            if assortment.is_base != should_be_base {
                assortment.is_base = should_be_base;
                assortment.updated_at = now;
            }
        }
        Ok(true)
    }
}

#[async_trait::async_trait]
impl AssortmentLinkStore for MemoryStore {
    async fn get_link(&self, id: &Id) -> Result<Option<AssortmentLink>> {
        Ok(self.state.read().links.get(id).cloned())
    }

    async fn links_for_parent(&self, parent_id: &Id) -> Result<Vec<AssortmentLink>> {
        let mut links: Vec<AssortmentLink> = self
            .state
            .read()
            .links
            .values()
            .filter(|l| &l.parent_assortment_id == parent_id)
            .cloned()
            .collect();
        links.sort_by(|a, b| {
            a.sort_key
                .cmp(&b.sort_key)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(links)
    }

    async fn links_for_child(&self, child_id: &Id) -> Result<Vec<AssortmentLink>> {
        let mut links: Vec<AssortmentLink> = self
            .state
            .read()
            .links
            .values()
            .filter(|l| &l.child_assortment_id == child_id)
            .cloned()
            .collect();
        links.sort_by(|a, b| {
            a.sort_key
                .cmp(&b.sort_key)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(links)
    }

    async fn upsert_link(&self, link: AssortmentLink) -> Result<()> {
        self.state.write().links.insert(link.id.clone(), link);
        Ok(())
    }

    async fn update_link_sort_keys(&self, entries: Vec<(Id, i32)>) -> Result<()> {
        let mut state = self.state.write();
        for (id, _) in &entries {
            if !state.links.contains_key(id) {
                return Err(anyhow!("assortment link '{}' not found", id));
            }
        }
        for (id, sort_key) in entries {
            if let Some(link) = state.links.get_mut(&id) {
                link.sort_key = sort_key;
            }
        }
        Ok(())
    }

    async fn delete_link(&self, id: &Id) -> Result<bool> {
        Ok(self.state.write().links.remove(id).is_some())
    }
}

#[async_trait::async_trait]
impl AssortmentProductStore for MemoryStore {
    async fn get_assortment_product(&self, id: &Id) -> Result<Option<AssortmentProduct>> {
        Ok(self.state.read().assortment_products.get(id).cloned())
    }

    async fn products_for_assortment(
        &self,
        assortment_id: &Id,
    ) -> Result<Vec<AssortmentProduct>> {
        let mut entries: Vec<AssortmentProduct> = self
            .state
            .read()
            .assortment_products
            .values()
            .filter(|m| &m.assortment_id == assortment_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| {
            a.sort_key
                .cmp(&b.sort_key)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(entries)
    }

    async fn assortments_for_product(&self, product_id: &Id) -> Result<Vec<AssortmentProduct>> {
        let mut entries: Vec<AssortmentProduct> = self
            .state
            .read()
            .assortment_products
            .values()
            .filter(|m| &m.product_id == product_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(entries)
    }

    async fn upsert_assortment_product(&self, entry: AssortmentProduct) -> Result<()> {
        self.state
            .write()
            .assortment_products
            .insert(entry.id.clone(), entry);
        Ok(())
    }

    async fn update_assortment_product_sort_keys(&self, entries: Vec<(Id, i32)>) -> Result<()> {
        let mut state = self.state.write();
        for (id, _) in &entries {
            if !state.assortment_products.contains_key(id) {
                return Err(anyhow!("assortment product '{}' not found", id));
            }
        }
        for (id, sort_key) in entries {
            if let Some(entry) = state.assortment_products.get_mut(&id) {
                entry.sort_key = sort_key;
            }
        }
        Ok(())
    }

    async fn delete_assortment_product(&self, id: &Id) -> Result<bool> {
        Ok(self.state.write().assortment_products.remove(id).is_some())
    }
}

#[async_trait::async_trait]
impl AssortmentFilterStore for MemoryStore {
    async fn get_assortment_filter(&self, id: &Id) -> Result<Option<AssortmentFilter>> {
        Ok(self.state.read().assortment_filters.get(id).cloned())
    }

    async fn filters_for_assortment(
        &self,
        assortment_id: &Id,
    ) -> Result<Vec<AssortmentFilter>> {
        let mut entries: Vec<AssortmentFilter> = self
            .state
            .read()
            .assortment_filters
            .values()
            .filter(|f| &f.assortment_id == assortment_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| {
            a.sort_key
                .cmp(&b.sort_key)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(entries)
    }

    async fn upsert_assortment_filter(&self, entry: AssortmentFilter) -> Result<()> {
        self.state
            .write()
            .assortment_filters
            .insert(entry.id.clone(), entry);
        Ok(())
    }

    async fn update_assortment_filter_sort_keys(&self, entries: Vec<(Id, i32)>) -> Result<()> {
        let mut state = self.state.write();
        for (id, _) in &entries {
            if !state.assortment_filters.contains_key(id) {
                return Err(anyhow!("assortment filter '{}' not found", id));
            }
        }
        for (id, sort_key) in entries {
            if let Some(entry) = state.assortment_filters.get_mut(&id) {
                entry.sort_key = sort_key;
            }
        }
        Ok(())
    }

    async fn delete_assortment_filter(&self, id: &Id) -> Result<bool> {
        Ok(self.state.write().assortment_filters.remove(id).is_some())
    }
}

impl CatalogStore for MemoryStore {}
