use crate::model::{generate_id, Id, LocalizedText};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductKind {
    Simple,
    Configurable,
    Bundle,
    Plan,
    Tokenized,
}

impl ProductKind {
    /// Proxy kinds never fulfill orders themselves; they own variations and
    /// an assignment matrix resolving to concrete products.
    pub fn is_proxy(&self) -> bool {
        matches!(self, Self::Configurable | Self::Bundle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    Draft,
    Active,
    Inactive,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Id,
    pub kind: ProductKind,
    pub status: ProductStatus,
    pub slug: String,
    pub sequence: i64, // stable listing order, assigned at creation
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub texts: Vec<LocalizedText>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(kind: ProductKind, slug: impl Into<String>) -> Self {
        Self::new_with_id(generate_id(), kind, slug)
    }

    pub fn new_with_id(id: Id, kind: ProductKind, slug: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            kind,
            status: ProductStatus::Draft,
            slug: slug.into(),
            sequence: 0,
            tags: Vec::new(),
            texts: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == ProductStatus::Active
    }

    pub fn is_proxy(&self) -> bool {
        self.kind.is_proxy()
    }

    pub fn activate(&mut self) {
        self.status = ProductStatus::Active;
        self.updated_at = Utc::now();
    }

    pub fn deactivate(&mut self) {
        self.status = ProductStatus::Inactive;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proxy_kinds() {
        assert!(ProductKind::Configurable.is_proxy());
        assert!(ProductKind::Bundle.is_proxy());
        assert!(!ProductKind::Simple.is_proxy());
        assert!(!ProductKind::Plan.is_proxy());
    }

    #[test]
    fn status_transitions_touch_updated_at() {
        let mut product = Product::new(ProductKind::Simple, "blue-shirt");
        assert_eq!(product.status, ProductStatus::Draft);

        product.activate();
        assert!(product.is_active());
        assert!(product.updated_at >= product.created_at);

        product.deactivate();
        assert!(!product.is_active());
    }

    #[test]
    fn status_serializes_with_wire_casing() {
        let json = serde_json::to_string(&ProductStatus::Active).unwrap();
        assert_eq!(json, "\"ACTIVE\"");
        let json = serde_json::to_string(&ProductKind::Configurable).unwrap();
        assert_eq!(json, "\"CONFIGURABLE\"");
    }
}
