use crate::model::{generate_id, Id, LocalizedText};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One selectable option of a variation ("red", "xl"). Values are unique
/// within their variation; options keep creation order and are not
/// reorderable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariationOption {
    pub value: String,
    pub sequence: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub texts: Vec<LocalizedText>,
}

impl VariationOption {
    pub fn new(value: impl Into<String>, sequence: i64) -> Self {
        Self {
            value: value.into(),
            sequence,
            texts: Vec::new(),
        }
    }
}

/// A variation axis owned by a proxy product ("color", "size"). Options are
/// embedded because they have no life outside their variation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductVariation {
    pub id: Id,
    pub product_id: Id, // owning proxy
    pub key: String,    // unique per proxy
    pub sequence: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub texts: Vec<LocalizedText>,
    pub options: Vec<VariationOption>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductVariation {
    pub fn new(product_id: Id, key: impl Into<String>, sequence: i64) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id(),
            product_id,
            key: key.into(),
            sequence,
            texts: Vec::new(),
            options: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn option(&self, value: &str) -> Option<&VariationOption> {
        self.options.iter().find(|o| o.value == value)
    }

    pub fn has_option(&self, value: &str) -> bool {
        self.option(value).is_some()
    }

    pub fn next_option_sequence(&self) -> i64 {
        self.options.iter().map(|o| o.sequence).max().unwrap_or(0) + 1
    }
}

/// One (variation, option) selection as supplied on the wire. `key` accepts
/// either the variation key or its id; storage is always by variation id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorInput {
    pub key: String,
    pub value: String,
}

impl VectorInput {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Canonical (variation id, option value) pair. Vectors are kept sorted by
/// variation id so presentation order of selections never affects matching.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorPair {
    pub variation_id: Id,
    pub option_value: String,
}

impl VectorPair {
    pub fn new(variation_id: Id, option_value: impl Into<String>) -> Self {
        Self {
            variation_id,
            option_value: option_value.into(),
        }
    }
}

/// One cell of a proxy's assignment matrix: a canonical vector mapped to
/// exactly one concrete product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductVariationAssignment {
    pub id: Id,
    pub proxy_id: Id,
    pub product_id: Id,
    /// Pairs sorted by variation id (canonical form).
    pub vector: Vec<VectorPair>,
    pub created_at: DateTime<Utc>,
}

impl ProductVariationAssignment {
    /// Build an assignment, normalizing the vector to canonical order.
    pub fn new(proxy_id: Id, product_id: Id, mut vector: Vec<VectorPair>) -> Self {
        vector.sort();
        Self {
            id: generate_id(),
            proxy_id,
            product_id,
            vector,
            created_at: Utc::now(),
        }
    }

    /// Canonical composite key of the vector, used as the matrix map key.
    /// JSON of the sorted pairs is unambiguous for arbitrary option values.
    pub fn vector_key(&self) -> String {
        canonical_vector_key(&self.vector)
    }
}

/// Canonical string form of a pair set. Callers must pass pairs already
/// sorted, or sort a copy first; `ProductVariationAssignment::new` keeps the
/// stored vector sorted at all times.
pub fn canonical_vector_key(pairs: &[VectorPair]) -> String {
    let tuples: Vec<(&str, &str)> = pairs
        .iter()
        .map(|p| (p.variation_id.as_str(), p.option_value.as_str()))
        .collect();
    // Infallible for a vec of string tuples.
    serde_json::to_string(&tuples).unwrap_or_default()
}
