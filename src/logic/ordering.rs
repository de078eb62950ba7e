use crate::model::{CatalogError, CatalogResult, Id};
use itertools::Itertools;
use std::collections::HashSet;

/// Sort key for a new sibling: current max + 1, starting at 1.
pub fn next_sort_key<I: IntoIterator<Item = i32>>(existing: I) -> i32 {
    existing.into_iter().max().map_or(1, |max| max + 1)
}

/// Creation ordinal for a new variation or catalog record: current max + 1.
pub fn next_sequence<I: IntoIterator<Item = i64>>(existing: I) -> i64 {
    existing.into_iter().max().map_or(1, |max| max + 1)
}

/// A reorder payload must cover the scope's current sibling set exactly,
/// with no duplicates; anything else strands siblings in an ambiguous order
/// and is rejected wholesale.
pub fn validate_full_reorder(
    scope_id: &Id,
    current: &[Id],
    supplied: &[Id],
) -> CatalogResult<()> {
    let mut seen: HashSet<&Id> = HashSet::with_capacity(supplied.len());
    let duplicates: Vec<&Id> = supplied.iter().filter(|id| !seen.insert(id)).collect();
    if !duplicates.is_empty() {
        return Err(CatalogError::IncompleteReorder {
            scope_id: scope_id.clone(),
            detail: format!("duplicate entries: {}", duplicates.iter().join(", ")),
        });
    }

    let supplied_set: HashSet<&Id> = supplied.iter().collect();
    let current_set: HashSet<&Id> = current.iter().collect();

    let missing: Vec<&Id> = current
        .iter()
        .filter(|id| !supplied_set.contains(id))
        .collect();
    let surplus: Vec<&Id> = supplied
        .iter()
        .filter(|id| !current_set.contains(id))
        .collect();

    if missing.is_empty() && surplus.is_empty() {
        return Ok(());
    }

    let mut parts = Vec::new();
    if !missing.is_empty() {
        parts.push(format!("missing: {}", missing.iter().join(", ")));
    }
    if !surplus.is_empty() {
        parts.push(format!("surplus: {}", surplus.iter().join(", ")));
    }

    Err(CatalogError::IncompleteReorder {
        scope_id: scope_id.clone(),
        detail: parts.join("; "),
    })
}
