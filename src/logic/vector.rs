use crate::model::{
    CatalogError, CatalogResult, Id, ProductVariation, VectorInput, VectorPair,
};

/// Normalize wire-form selections into canonical pairs against the proxy's
/// own variation set. Selections may name a variation by key or by id;
/// output pairs are sorted by variation id so presentation order never
/// affects matching or storage.
pub fn normalize_vector(
    proxy_id: &Id,
    variations: &[ProductVariation],
    inputs: &[VectorInput],
) -> CatalogResult<Vec<VectorPair>> {
    if inputs.is_empty() {
        return Err(CatalogError::invalid_vector(
            proxy_id.clone(),
            "vector must contain at least one selection",
        ));
    }

    let mut pairs: Vec<VectorPair> = Vec::with_capacity(inputs.len());
    for input in inputs {
        let variation = variations
            .iter()
            .find(|v| v.id == input.key)
            .or_else(|| variations.iter().find(|v| v.key == input.key))
            .ok_or_else(|| {
                CatalogError::invalid_vector(
                    proxy_id.clone(),
                    format!("unknown variation '{}'", input.key),
                )
            })?;

        if !variation.has_option(&input.value) {
            return Err(CatalogError::invalid_vector(
                proxy_id.clone(),
                format!(
                    "unknown option '{}' for variation '{}'",
                    input.value, variation.key
                ),
            ));
        }

        let pair = VectorPair::new(variation.id.clone(), input.value.clone());
        if let Some(existing) = pairs.iter().find(|p| p.variation_id == pair.variation_id) {
            if existing.option_value == pair.option_value {
                // Identical repeat of a selection is harmless.
                continue;
            }
            return Err(CatalogError::invalid_vector(
                proxy_id.clone(),
                format!(
                    "conflicting values '{}' and '{}' for variation '{}'",
                    existing.option_value, pair.option_value, variation.key
                ),
            ));
        }
        pairs.push(pair);
    }

    pairs.sort();
    Ok(pairs)
}

/// True when every pair of `subset` appears in `vector`. Both sides are
/// canonical (sorted, unique per variation).
pub fn is_superset(vector: &[VectorPair], subset: &[VectorPair]) -> bool {
    subset.iter().all(|pair| vector.contains(pair))
}
