use crate::model::{generate_id, Id, LocalizedText};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssortmentStatus {
    Active,   // visible to default queries
    Inactive, // hidden unless explicitly requested
}

/// A node in the assortment graph. Multi-parent: the same assortment may be
/// linked from several parents, so the structure is a DAG, not a tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assortment {
    pub id: Id,
    pub status: AssortmentStatus,
    pub is_root: bool,
    /// At most one assortment is base system-wide; promoting a new base
    /// demotes the previous holder in the same operation.
    pub is_base: bool,
    pub slug: String,
    pub sequence: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub texts: Vec<LocalizedText>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Assortment {
    pub fn new(slug: impl Into<String>) -> Self {
        Self::new_with_id(generate_id(), slug)
    }

    pub fn new_with_id(id: Id, slug: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            status: AssortmentStatus::Active,
            is_root: false,
            is_base: false,
            slug: slug.into(),
            sequence: 0,
            tags: Vec::new(),
            texts: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == AssortmentStatus::Active
    }

    pub fn activate(&mut self) {
        self.status = AssortmentStatus::Active;
        self.updated_at = Utc::now();
    }

    pub fn deactivate(&mut self) {
        self.status = AssortmentStatus::Inactive;
        self.updated_at = Utc::now();
    }
}

/// Directed parent → child edge with manual ordering among the parent's
/// children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssortmentLink {
    pub id: Id,
    pub parent_assortment_id: Id,
    pub child_assortment_id: Id,
    pub sort_key: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl AssortmentLink {
    pub fn new(parent_assortment_id: Id, child_assortment_id: Id, sort_key: i32) -> Self {
        Self {
            id: generate_id(),
            parent_assortment_id,
            child_assortment_id,
            sort_key,
            tags: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

/// Ordered product membership of an assortment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssortmentProduct {
    pub id: Id,
    pub assortment_id: Id,
    pub product_id: Id,
    pub sort_key: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl AssortmentProduct {
    pub fn new(assortment_id: Id, product_id: Id, sort_key: i32) -> Self {
        Self {
            id: generate_id(),
            assortment_id,
            product_id,
            sort_key,
            tags: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

/// Ordered filter assignment of an assortment. Filters themselves live
/// outside the engine; only the assignment and its ordering are owned here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssortmentFilter {
    pub id: Id,
    pub assortment_id: Id,
    pub filter_id: Id,
    pub sort_key: i32,
    pub created_at: DateTime<Utc>,
}

impl AssortmentFilter {
    pub fn new(assortment_id: Id, filter_id: Id, sort_key: i32) -> Self {
        Self {
            id: generate_id(),
            assortment_id,
            filter_id,
            sort_key,
            created_at: Utc::now(),
        }
    }
}

// Reorder payload entries. Wire field names are fixed by the consuming
// contract; reorders always carry the complete sibling set.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSortKey {
    pub assortment_link_id: Id,
    pub sort_key: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSortKey {
    pub assortment_product_id: Id,
    pub sort_key: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSortKey {
    pub assortment_filter_id: Id,
    pub sort_key: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reorder_payloads_use_contract_field_names() {
        let entry = LinkSortKey {
            assortment_link_id: "l-1".to_string(),
            sort_key: 3,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["assortmentLinkId"], "l-1");
        assert_eq!(json["sortKey"], 3);

        let entry = ProductSortKey {
            assortment_product_id: "ap-1".to_string(),
            sort_key: 1,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["assortmentProductId"], "ap-1");
    }

    #[test]
    fn new_assortment_starts_active_without_flags() {
        let assortment = Assortment::new("winter-sale");
        assert!(assortment.is_active());
        assert!(!assortment.is_root);
        assert!(!assortment.is_base);
    }
}
