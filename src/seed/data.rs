use crate::logic::CatalogEngine;
use crate::model::{
    Assortment, LocalizedText, Product, ProductKind, VectorInput,
};
use crate::store::traits::CatalogStore;
use anyhow::Result;

fn demo_product(kind: ProductKind, slug: &str, sequence: i64, title: &str) -> Product {
    let mut product = Product::new(kind, slug);
    product.sequence = sequence;
    product.texts.push(LocalizedText::new("en", title));
    product.activate();
    product
}

fn demo_assortment(slug: &str, sequence: i64, is_root: bool, title_en: &str, title_de: &str) -> Assortment {
    let mut assortment = Assortment::new(slug);
    assortment.sequence = sequence;
    assortment.is_root = is_root;
    assortment.texts.push(LocalizedText::new("en", title_en));
    assortment.texts.push(LocalizedText::new("de", title_de));
    assortment
}

/// Load a small demo catalog: one configurable tee with a color × size
/// matrix, its four concrete variants, and a two-root assortment graph
/// (shop hierarchy plus a seasonal sale collection).
pub async fn load_seed_data<S: CatalogStore>(engine: &CatalogEngine<S>) -> Result<()> {
    let store = engine.store();

    // Products
    let tee = demo_product(ProductKind::Configurable, "classic-tee", 1, "Classic Tee");
    let mut concrete = Vec::new();
    for (index, (color, size)) in [("red", "m"), ("red", "xl"), ("blue", "m"), ("blue", "xl")]
        .iter()
        .enumerate()
    {
        concrete.push((
            color.to_string(),
            size.to_string(),
            demo_product(
                ProductKind::Simple,
                &format!("classic-tee-{color}-{size}"),
                2 + index as i64,
                &format!("Classic Tee {color} {size}"),
            ),
        ));
    }
    let gift_card = demo_product(ProductKind::Tokenized, "gift-card", 6, "Gift Card");

    store.upsert_product(tee.clone()).await?;
    for (_, _, product) in &concrete {
        store.upsert_product(product.clone()).await?;
    }
    store.upsert_product(gift_card.clone()).await?;

    // Variation matrix on the proxy
    let variants = engine.variants();
    let color = variants
        .create_variation(&tee.id, "color", vec![LocalizedText::new("en", "Color")])
        .await?;
    for value in ["red", "blue"] {
        variants
            .create_variation_option(&color.id, value, vec![])
            .await?;
    }
    let size = variants
        .create_variation(&tee.id, "size", vec![LocalizedText::new("en", "Size")])
        .await?;
    for value in ["m", "xl"] {
        variants
            .create_variation_option(&size.id, value, vec![])
            .await?;
    }

    for (color_value, size_value, product) in &concrete {
        variants
            .add_assignment(
                &tee.id,
                &product.id,
                &[
                    VectorInput::new("color", color_value.clone()),
                    VectorInput::new("size", size_value.clone()),
                ],
            )
            .await?;
    }

    // Assortment graph: shop → apparel → t-shirts, plus a seasonal root.
    let shop = demo_assortment("shop", 1, true, "Shop", "Shop");
    let apparel = demo_assortment("apparel", 2, false, "Apparel", "Bekleidung");
    let tshirts = demo_assortment("t-shirts", 3, false, "T-Shirts", "T-Shirts");
    let sale = demo_assortment("sale", 4, true, "Sale", "Angebote");
    for assortment in [&shop, &apparel, &tshirts, &sale] {
        store.upsert_assortment((*assortment).clone()).await?;
    }

    let assortments = engine.assortments();
    assortments.link(&shop.id, &apparel.id, vec![]).await?;
    assortments.link(&apparel.id, &tshirts.id, vec![]).await?;
    assortments.set_base(&shop.id).await?;

    assortments
        .add_product(&tshirts.id, &tee.id, vec!["featured".to_string()])
        .await?;
    assortments.add_product(&sale.id, &tee.id, vec![]).await?;
    assortments.add_product(&sale.id, &gift_card.id, vec![]).await?;

    assortments
        .add_filter(&tshirts.id, &"filter-color".to_string())
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use crate::store::traits::ProductStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn seed_produces_a_resolvable_catalog() {
        let engine = CatalogEngine::new(Arc::new(MemoryStore::new()), "en");
        load_seed_data(&engine).await.unwrap();

        let tee = engine
            .store()
            .get_product_by_slug("classic-tee")
            .await
            .unwrap()
            .unwrap();
        let hits = engine
            .variants()
            .resolve(
                &tee.id,
                &[
                    VectorInput::new("color", "red"),
                    VectorInput::new("size", "xl"),
                ],
                false,
            )
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].slug, "classic-tee-red-xl");

        let paths = engine
            .assortments()
            .paths_for_product(&tee.id, None)
            .await
            .unwrap();
        // One chain through the shop hierarchy, one through the sale root.
        assert_eq!(paths.len(), 2);

        let base = engine.assortments().base().await.unwrap().unwrap();
        assert_eq!(base.slug, "shop");
    }
}
