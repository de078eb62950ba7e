use crate::logic::locks::ScopeLocks;
use crate::logic::ordering::{next_sort_key, validate_full_reorder};
use crate::logic::paths::assortment_paths;
use crate::model::{
    Assortment, AssortmentFilter, AssortmentLink, AssortmentPath, AssortmentProduct,
    CatalogError, CatalogResult, FilterSortKey, Id, LinkSortKey, ProductSortKey,
};
use crate::store::traits::CatalogStore;
use log::info;
use serde::Serialize;
use std::collections::HashSet;

/// Parent and child neighbors of an assortment, children in sibling order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedAssortments {
    pub parents: Vec<Assortment>,
    pub children: Vec<Assortment>,
}

/// Maintains the assortment DAG (links, product memberships, filter
/// assignments, the base singleton) and answers breadcrumb and children
/// queries. Mutations hold the parent scope's lock; queries are pure.
pub struct AssortmentGraph<'a, S: CatalogStore> {
    store: &'a S,
    locks: &'a ScopeLocks,
    default_locale: &'a str,
}

impl<'a, S: CatalogStore> AssortmentGraph<'a, S> {
    pub fn new(store: &'a S, locks: &'a ScopeLocks, default_locale: &'a str) -> Self {
        Self {
            store,
            locks,
            default_locale,
        }
    }

    /// Insert an edge parent → child. Rejected when the pair already exists
    /// or when the child is the parent itself or one of its ancestors. The
    /// new link is ordered after the current siblings.
    pub async fn link(
        &self,
        parent_id: &Id,
        child_id: &Id,
        tags: Vec<String>,
    ) -> CatalogResult<AssortmentLink> {
        let _guard = self.locks.acquire(parent_id).await;

        self.require_assortment(parent_id).await?;
        self.require_assortment(child_id).await?;

        if self.is_ancestor_or_self(child_id, parent_id).await? {
            return Err(CatalogError::CycleDetected {
                parent_id: parent_id.clone(),
                child_id: child_id.clone(),
            });
        }

        let siblings = self.store.links_for_parent(parent_id).await?;
        if siblings.iter().any(|l| l.child_assortment_id == *child_id) {
            return Err(CatalogError::DuplicateLink {
                parent_id: parent_id.clone(),
                child_id: child_id.clone(),
            });
        }

        let sort_key = next_sort_key(siblings.iter().map(|l| l.sort_key));
        let mut link = AssortmentLink::new(parent_id.clone(), child_id.clone(), sort_key);
        link.tags = tags;
        self.store.upsert_link(link.clone()).await?;
        info!("linked assortment {} under {}", child_id, parent_id);

        Ok(link)
    }

    /// Remove the edge only; the child keeps its other parents and its own
    /// subtree.
    pub async fn unlink(&self, link_id: &Id) -> CatalogResult<AssortmentLink> {
        let link = self
            .store
            .get_link(link_id)
            .await?
            .ok_or_else(|| CatalogError::not_found("assortment link", link_id.clone()))?;

        let _guard = self.locks.acquire(&link.parent_assortment_id).await;
        if !self.store.delete_link(link_id).await? {
            return Err(CatalogError::not_found("assortment link", link_id.clone()));
        }

        Ok(link)
    }

    /// Atomic full-set rewrite of one parent's child-link ordering.
    pub async fn reorder_links(
        &self,
        sort_keys: &[LinkSortKey],
    ) -> CatalogResult<Vec<AssortmentLink>> {
        let Some(first) = sort_keys.first() else {
            return Err(CatalogError::IncompleteReorder {
                scope_id: Id::default(),
                detail: "empty reorder payload".to_string(),
            });
        };
        let anchor = self
            .store
            .get_link(&first.assortment_link_id)
            .await?
            .ok_or_else(|| {
                CatalogError::not_found("assortment link", first.assortment_link_id.clone())
            })?;
        let scope = anchor.parent_assortment_id;

        let _guard = self.locks.acquire(&scope).await;

        let current_ids: Vec<Id> = self
            .store
            .links_for_parent(&scope)
            .await?
            .iter()
            .map(|l| l.id.clone())
            .collect();
        let supplied_ids: Vec<Id> = sort_keys
            .iter()
            .map(|e| e.assortment_link_id.clone())
            .collect();
        validate_full_reorder(&scope, &current_ids, &supplied_ids)?;

        let entries: Vec<(Id, i32)> = sort_keys
            .iter()
            .map(|e| (e.assortment_link_id.clone(), e.sort_key))
            .collect();
        self.store.update_link_sort_keys(entries).await?;

        Ok(self.store.links_for_parent(&scope).await?)
    }

    /// Attach a product to an assortment, ordered after current members.
    pub async fn add_product(
        &self,
        assortment_id: &Id,
        product_id: &Id,
        tags: Vec<String>,
    ) -> CatalogResult<AssortmentProduct> {
        let _guard = self.locks.acquire(assortment_id).await;

        self.require_assortment(assortment_id).await?;
        self.store
            .get_product(product_id)
            .await?
            .ok_or_else(|| CatalogError::not_found("product", product_id.clone()))?;

        let memberships = self.store.products_for_assortment(assortment_id).await?;
        if memberships.iter().any(|m| m.product_id == *product_id) {
            return Err(CatalogError::DuplicateLink {
                parent_id: assortment_id.clone(),
                child_id: product_id.clone(),
            });
        }

        let sort_key = next_sort_key(memberships.iter().map(|m| m.sort_key));
        let mut entry =
            AssortmentProduct::new(assortment_id.clone(), product_id.clone(), sort_key);
        entry.tags = tags;
        self.store.upsert_assortment_product(entry.clone()).await?;

        Ok(entry)
    }

    pub async fn remove_product(
        &self,
        assortment_product_id: &Id,
    ) -> CatalogResult<AssortmentProduct> {
        let entry = self
            .store
            .get_assortment_product(assortment_product_id)
            .await?
            .ok_or_else(|| {
                CatalogError::not_found("assortment product", assortment_product_id.clone())
            })?;

        let _guard = self.locks.acquire(&entry.assortment_id).await;
        if !self
            .store
            .delete_assortment_product(assortment_product_id)
            .await?
        {
            return Err(CatalogError::not_found(
                "assortment product",
                assortment_product_id.clone(),
            ));
        }

        Ok(entry)
    }

    /// Atomic full-set rewrite of one assortment's membership ordering.
    pub async fn reorder_products(
        &self,
        sort_keys: &[ProductSortKey],
    ) -> CatalogResult<Vec<AssortmentProduct>> {
        let Some(first) = sort_keys.first() else {
            return Err(CatalogError::IncompleteReorder {
                scope_id: Id::default(),
                detail: "empty reorder payload".to_string(),
            });
        };
        let anchor = self
            .store
            .get_assortment_product(&first.assortment_product_id)
            .await?
            .ok_or_else(|| {
                CatalogError::not_found(
                    "assortment product",
                    first.assortment_product_id.clone(),
                )
            })?;
        let scope = anchor.assortment_id;

        let _guard = self.locks.acquire(&scope).await;

        let current_ids: Vec<Id> = self
            .store
            .products_for_assortment(&scope)
            .await?
            .iter()
            .map(|m| m.id.clone())
            .collect();
        let supplied_ids: Vec<Id> = sort_keys
            .iter()
            .map(|e| e.assortment_product_id.clone())
            .collect();
        validate_full_reorder(&scope, &current_ids, &supplied_ids)?;

        let entries: Vec<(Id, i32)> = sort_keys
            .iter()
            .map(|e| (e.assortment_product_id.clone(), e.sort_key))
            .collect();
        self.store.update_assortment_product_sort_keys(entries).await?;

        Ok(self.store.products_for_assortment(&scope).await?)
    }

    /// Assign a filter to an assortment, ordered after current assignments.
    pub async fn add_filter(
        &self,
        assortment_id: &Id,
        filter_id: &Id,
    ) -> CatalogResult<AssortmentFilter> {
        let _guard = self.locks.acquire(assortment_id).await;

        self.require_assortment(assortment_id).await?;

        let assignments = self.store.filters_for_assortment(assortment_id).await?;
        if assignments.iter().any(|f| f.filter_id == *filter_id) {
            return Err(CatalogError::DuplicateLink {
                parent_id: assortment_id.clone(),
                child_id: filter_id.clone(),
            });
        }

        let sort_key = next_sort_key(assignments.iter().map(|f| f.sort_key));
        let entry = AssortmentFilter::new(assortment_id.clone(), filter_id.clone(), sort_key);
        self.store.upsert_assortment_filter(entry.clone()).await?;

        Ok(entry)
    }

    pub async fn remove_filter(
        &self,
        assortment_filter_id: &Id,
    ) -> CatalogResult<AssortmentFilter> {
        let entry = self
            .store
            .get_assortment_filter(assortment_filter_id)
            .await?
            .ok_or_else(|| {
                CatalogError::not_found("assortment filter", assortment_filter_id.clone())
            })?;

        let _guard = self.locks.acquire(&entry.assortment_id).await;
        if !self
            .store
            .delete_assortment_filter(assortment_filter_id)
            .await?
        {
            return Err(CatalogError::not_found(
                "assortment filter",
                assortment_filter_id.clone(),
            ));
        }

        Ok(entry)
    }

    /// Atomic full-set rewrite of one assortment's filter ordering.
    pub async fn reorder_filters(
        &self,
        sort_keys: &[FilterSortKey],
    ) -> CatalogResult<Vec<AssortmentFilter>> {
        let Some(first) = sort_keys.first() else {
            return Err(CatalogError::IncompleteReorder {
                scope_id: Id::default(),
                detail: "empty reorder payload".to_string(),
            });
        };
        let anchor = self
            .store
            .get_assortment_filter(&first.assortment_filter_id)
            .await?
            .ok_or_else(|| {
                CatalogError::not_found(
                    "assortment filter",
                    first.assortment_filter_id.clone(),
                )
            })?;
        let scope = anchor.assortment_id;

        let _guard = self.locks.acquire(&scope).await;

        let current_ids: Vec<Id> = self
            .store
            .filters_for_assortment(&scope)
            .await?
            .iter()
            .map(|f| f.id.clone())
            .collect();
        let supplied_ids: Vec<Id> = sort_keys
            .iter()
            .map(|e| e.assortment_filter_id.clone())
            .collect();
        validate_full_reorder(&scope, &current_ids, &supplied_ids)?;

        let entries: Vec<(Id, i32)> = sort_keys
            .iter()
            .map(|e| (e.assortment_filter_id.clone(), e.sort_key))
            .collect();
        self.store.update_assortment_filter_sort_keys(entries).await?;

        Ok(self.store.filters_for_assortment(&scope).await?)
    }

    /// Promote the target to base and demote the previous holder in one
    /// atomic store operation; never zero or two bases observable.
    pub async fn set_base(&self, assortment_id: &Id) -> CatalogResult<Assortment> {
        if !self.store.set_base_assortment(assortment_id).await? {
            return Err(CatalogError::not_found("assortment", assortment_id.clone()));
        }
        info!("assortment {} is now the base", assortment_id);

        self.require_assortment(assortment_id).await
    }

    pub async fn base(&self) -> CatalogResult<Option<Assortment>> {
        Ok(self.store.base_assortment().await?)
    }

    /// Direct children in sibling order. `include_leaves = false` drops
    /// children without child links of their own.
    pub async fn children(
        &self,
        assortment_id: &Id,
        include_inactive: bool,
        include_leaves: bool,
    ) -> CatalogResult<Vec<Assortment>> {
        self.require_assortment(assortment_id).await?;

        let mut children = Vec::new();
        for link in self.store.links_for_parent(assortment_id).await? {
            let Some(child) = self.store.get_assortment(&link.child_assortment_id).await? else {
                continue;
            };
            if !include_inactive && !child.is_active() {
                continue;
            }
            if !include_leaves
                && self.store.links_for_parent(&child.id).await?.is_empty()
            {
                continue;
            }
            children.push(child);
        }

        Ok(children)
    }

    /// Both link directions of a node: its parents and its ordered children.
    pub async fn linked_assortments(
        &self,
        assortment_id: &Id,
    ) -> CatalogResult<LinkedAssortments> {
        self.require_assortment(assortment_id).await?;

        let mut parents = Vec::new();
        for link in self.store.links_for_child(assortment_id).await? {
            if let Some(parent) = self.store.get_assortment(&link.parent_assortment_id).await? {
                parents.push(parent);
            }
        }

        let mut children = Vec::new();
        for link in self.store.links_for_parent(assortment_id).await? {
            if let Some(child) = self.store.get_assortment(&link.child_assortment_id).await? {
                children.push(child);
            }
        }

        Ok(LinkedAssortments { parents, children })
    }

    /// Ordered product memberships of an assortment.
    pub async fn products(&self, assortment_id: &Id) -> CatalogResult<Vec<AssortmentProduct>> {
        self.require_assortment(assortment_id).await?;
        Ok(self.store.products_for_assortment(assortment_id).await?)
    }

    /// Ordered filter assignments of an assortment.
    pub async fn filters(&self, assortment_id: &Id) -> CatalogResult<Vec<AssortmentFilter>> {
        self.require_assortment(assortment_id).await?;
        Ok(self.store.filters_for_assortment(assortment_id).await?)
    }

    /// Remove a node together with its links on both sides, memberships and
    /// filter assignments, in one atomic store operation. Former children
    /// keep their other parents or become roots.
    pub async fn remove_assortment(&self, assortment_id: &Id) -> CatalogResult<Assortment> {
        let assortment = self.require_assortment(assortment_id).await?;

        let _guard = self.locks.acquire(assortment_id).await;
        if !self.store.delete_assortment(assortment_id).await? {
            return Err(CatalogError::not_found("assortment", assortment_id.clone()));
        }
        info!("removed assortment {} and its links", assortment_id);

        Ok(assortment)
    }

    /// Breadcrumb chains for an assortment, root → target.
    pub async fn paths_for_assortment(
        &self,
        assortment_id: &Id,
        force_locale: Option<&str>,
    ) -> CatalogResult<Vec<AssortmentPath>> {
        let assortment = self.require_assortment(assortment_id).await?;
        let locale = force_locale.unwrap_or(self.default_locale);
        assortment_paths(self.store, &assortment, locale).await
    }

    /// Breadcrumb chains for a product: one traversal per assortment the
    /// product is a member of, in membership order.
    pub async fn paths_for_product(
        &self,
        product_id: &Id,
        force_locale: Option<&str>,
    ) -> CatalogResult<Vec<AssortmentPath>> {
        self.store
            .get_product(product_id)
            .await?
            .ok_or_else(|| CatalogError::not_found("product", product_id.clone()))?;

        let locale = force_locale.unwrap_or(self.default_locale);
        let mut paths = Vec::new();
        for membership in self.store.assortments_for_product(product_id).await? {
            let Some(assortment) = self
                .store
                .get_assortment(&membership.assortment_id)
                .await?
            else {
                continue;
            };
            paths.extend(assortment_paths(self.store, &assortment, locale).await?);
        }

        Ok(paths)
    }

    async fn require_assortment(&self, id: &Id) -> CatalogResult<Assortment> {
        self.store
            .get_assortment(id)
            .await?
            .ok_or_else(|| CatalogError::not_found("assortment", id.clone()))
    }

    /// True when `candidate` is `node` itself or an ancestor of `node`.
    async fn is_ancestor_or_self(&self, candidate: &Id, node: &Id) -> CatalogResult<bool> {
        if candidate == node {
            return Ok(true);
        }

        let mut visited: HashSet<Id> = HashSet::new();
        let mut stack = vec![node.clone()];
        while let Some(current) = stack.pop() {
            if !visited.insert(current.clone()) {
                continue;
            }
            for link in self.store.links_for_child(&current).await? {
                if link.parent_assortment_id == *candidate {
                    return Ok(true);
                }
                stack.push(link.parent_assortment_id);
            }
        }

        Ok(false)
    }
}
