use crate::model::Id;
use serde::{Deserialize, Serialize};

/// One breadcrumb chain for a product or assortment, ordered root → target.
/// A target reachable from several roots yields several paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssortmentPath {
    /// Locale the link texts were resolved for.
    pub locale: String,
    pub links: Vec<AssortmentPathLink>,
}

impl AssortmentPath {
    /// Assortment ids of the chain, root first. Convenience for assertions
    /// and for callers that only need the shape of the path.
    pub fn assortment_ids(&self) -> Vec<Id> {
        self.links.iter().map(|l| l.assortment_id.clone()).collect()
    }
}

/// One hop of a breadcrumb chain, denormalized so the admin UI renders
/// without re-fetching the assortment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssortmentPathLink {
    pub assortment_id: Id,
    pub slug: String,
    /// Localized title for the requested locale, falling back to the slug
    /// when no text matches.
    pub title: String,
    /// Edge from the previous (parent) entry into this one; `None` on the
    /// root entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_id: Option<Id>,
}
