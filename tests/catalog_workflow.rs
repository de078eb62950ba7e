use std::sync::Arc;

use vitrine_db::logic::CatalogEngine;
use vitrine_db::model::{
    Assortment, CatalogError, LinkSortKey, LocalizedText, Product, ProductKind, VectorInput,
};
use vitrine_db::store::{AssortmentLinkStore, AssortmentStore, MemoryStore, ProductStore};

fn product(kind: ProductKind, slug: &str, sequence: i64, title: &str) -> Product {
    let mut product = Product::new(kind, slug);
    product.sequence = sequence;
    product.texts.push(LocalizedText::new("en", title));
    product.activate();
    product
}

fn node(slug: &str, sequence: i64, is_root: bool, title: &str) -> Assortment {
    let mut assortment = Assortment::new(slug);
    assortment.sequence = sequence;
    assortment.is_root = is_root;
    assortment.texts.push(LocalizedText::new("en", title));
    assortment
}

#[tokio::test]
async fn catalog_complete_workflow() {
    let engine = CatalogEngine::new(Arc::new(MemoryStore::new()), "en");
    let store = engine.store();

    println!("1. Creating the product family");
    let touring = product(ProductKind::Configurable, "touring-bike", 1, "Touring Bike");
    let black_54 = product(ProductKind::Simple, "touring-bike-black-54", 2, "Touring Bike black 54");
    let black_58 = product(ProductKind::Simple, "touring-bike-black-58", 3, "Touring Bike black 58");
    let olive_54 = product(ProductKind::Simple, "touring-bike-olive-54", 4, "Touring Bike olive 54");
    let olive_58 = product(ProductKind::Simple, "touring-bike-olive-58", 5, "Touring Bike olive 58");
    for p in [&touring, &black_54, &black_58, &olive_54, &olive_58] {
        store.upsert_product((*p).clone()).await.unwrap();
    }
    let fetched = store
        .get_product_by_slug("touring-bike")
        .await
        .unwrap()
        .unwrap();
    assert!(fetched.is_proxy());

    println!("2. Defining the variation matrix");
    let variants = engine.variants();
    let color = variants
        .create_variation(&touring.id, "color", vec![LocalizedText::new("en", "Color")])
        .await
        .unwrap();
    for value in ["black", "olive"] {
        variants
            .create_variation_option(&color.id, value, vec![])
            .await
            .unwrap();
    }
    let frame = variants
        .create_variation(&touring.id, "frame", vec![LocalizedText::new("en", "Frame size")])
        .await
        .unwrap();
    for value in ["54", "58"] {
        variants
            .create_variation_option(&frame.id, value, vec![])
            .await
            .unwrap();
    }

    let duplicate_key = variants
        .create_variation(&touring.id, "color", vec![])
        .await
        .unwrap_err();
    assert_eq!(duplicate_key.kind(), "InvalidVector");

    let listed = variants.list_variations(&touring.id).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].key, "color");
    assert_eq!(listed[1].key, "frame");

    println!("3. Assigning vectors to concrete variants");
    let black_54_vector = vec![
        VectorInput::new("color", "black"),
        VectorInput::new("frame", "54"),
    ];
    let first = variants
        .add_assignment(&touring.id, &black_54.id, &black_54_vector)
        .await
        .unwrap();
    for (target, color_value, frame_value) in [
        (&black_58, "black", "58"),
        (&olive_54, "olive", "54"),
        (&olive_58, "olive", "58"),
    ] {
        variants
            .add_assignment(
                &touring.id,
                &target.id,
                &[
                    VectorInput::new("color", color_value),
                    VectorInput::new("frame", frame_value),
                ],
            )
            .await
            .unwrap();
    }

    // Resubmitting the identical pair is a no-op.
    let again = variants
        .add_assignment(&touring.id, &black_54.id, &black_54_vector)
        .await
        .unwrap();
    assert_eq!(again.id, first.id);

    // Claiming an occupied vector for another product is rejected.
    match variants
        .add_assignment(&touring.id, &olive_54.id, &black_54_vector)
        .await
    {
        Err(CatalogError::DuplicateVector {
            existing_product_id,
            ..
        }) => assert_eq!(existing_product_id, black_54.id),
        other => panic!("expected DuplicateVector, got {:?}", other),
    }

    // Remapping works once the old claim is removed.
    variants
        .remove_assignment(&touring.id, &black_54_vector)
        .await
        .unwrap();
    variants
        .add_assignment(&touring.id, &olive_54.id, &black_54_vector)
        .await
        .unwrap();
    variants
        .remove_assignment(&touring.id, &black_54_vector)
        .await
        .unwrap();
    variants
        .add_assignment(&touring.id, &black_54.id, &black_54_vector)
        .await
        .unwrap();
    assert_eq!(variants.list_assignments(&touring.id).await.unwrap().len(), 4);

    println!("4. Resolving vectors");
    let exact = variants
        .resolve(&touring.id, &black_54_vector, false)
        .await
        .unwrap();
    assert_eq!(exact.len(), 1);
    assert_eq!(exact[0].slug, "touring-bike-black-54");

    let swapped = variants
        .resolve(
            &touring.id,
            &[
                VectorInput::new("frame", "54"),
                VectorInput::new("color", "black"),
            ],
            false,
        )
        .await
        .unwrap();
    assert_eq!(swapped, exact);

    let partial = variants
        .resolve(&touring.id, &[VectorInput::new("color", "black")], false)
        .await
        .unwrap();
    let mut slugs: Vec<_> = partial.iter().map(|p| p.slug.clone()).collect();
    slugs.sort();
    assert_eq!(slugs, ["touring-bike-black-54", "touring-bike-black-58"]);

    let everything = variants.resolve(&touring.id, &[], false).await.unwrap();
    assert_eq!(everything.len(), 4);

    let unknown = variants
        .resolve(&touring.id, &[VectorInput::new("color", "neon")], false)
        .await
        .unwrap_err();
    assert_eq!(unknown.kind(), "InvalidVector");

    let mut retired = store
        .get_product_by_slug("touring-bike-olive-58")
        .await
        .unwrap()
        .unwrap();
    retired.deactivate();
    store.upsert_product(retired).await.unwrap();
    let olive_only = variants
        .resolve(&touring.id, &[VectorInput::new("color", "olive")], false)
        .await
        .unwrap();
    assert_eq!(olive_only.len(), 1);
    assert_eq!(olive_only[0].slug, "touring-bike-olive-54");
    let olive_all = variants
        .resolve(&touring.id, &[VectorInput::new("color", "olive")], true)
        .await
        .unwrap();
    assert_eq!(olive_all.len(), 2);

    println!("5. Building the assortment graph");
    let shop = node("shop", 1, true, "Shop");
    let outlet = node("outlet", 2, true, "Outlet");
    let mut bikes = node("bikes", 3, false, "Bikes");
    bikes.texts.push(LocalizedText::new("de", "Fahrräder"));
    let accessories = node("accessories", 4, false, "Accessories");
    let touring_cat = node("touring", 5, false, "Touring");
    for a in [&shop, &outlet, &bikes, &accessories, &touring_cat] {
        store.upsert_assortment((*a).clone()).await.unwrap();
    }

    let graph = engine.assortments();
    graph.link(&shop.id, &bikes.id, vec![]).await.unwrap();
    graph.link(&shop.id, &accessories.id, vec![]).await.unwrap();
    graph.link(&bikes.id, &touring_cat.id, vec![]).await.unwrap();
    graph.link(&outlet.id, &touring_cat.id, vec![]).await.unwrap();

    let cycle = graph.link(&touring_cat.id, &shop.id, vec![]).await.unwrap_err();
    assert_eq!(cycle.kind(), "CycleDetected");
    let self_link = graph.link(&shop.id, &shop.id, vec![]).await.unwrap_err();
    assert_eq!(self_link.kind(), "CycleDetected");
    let duplicate_link = graph.link(&shop.id, &bikes.id, vec![]).await.unwrap_err();
    assert_eq!(duplicate_link.kind(), "DuplicateLink");

    let shop_children = graph.children(&shop.id, false, true).await.unwrap();
    assert_eq!(
        shop_children.iter().map(|a| a.slug.as_str()).collect::<Vec<_>>(),
        ["bikes", "accessories"]
    );
    let shop_branches = graph.children(&shop.id, false, false).await.unwrap();
    assert_eq!(
        shop_branches.iter().map(|a| a.slug.as_str()).collect::<Vec<_>>(),
        ["bikes"]
    );

    println!("6. Promoting the base assortment");
    graph.set_base(&shop.id).await.unwrap();
    assert_eq!(graph.base().await.unwrap().unwrap().slug, "shop");
    graph.set_base(&outlet.id).await.unwrap();
    assert_eq!(graph.base().await.unwrap().unwrap().slug, "outlet");
    let demoted = store.get_assortment(&shop.id).await.unwrap().unwrap();
    assert!(!demoted.is_base);
    let missing = graph.set_base(&"no-such-assortment".to_string()).await.unwrap_err();
    assert_eq!(missing.kind(), "NotFound");

    println!("7. Attaching products and filters");
    graph
        .add_product(&touring_cat.id, &touring.id, vec!["featured".to_string()])
        .await
        .unwrap();
    graph
        .add_product(&touring_cat.id, &black_54.id, vec![])
        .await
        .unwrap();
    let duplicate_member = graph
        .add_product(&touring_cat.id, &touring.id, vec![])
        .await
        .unwrap_err();
    assert_eq!(duplicate_member.kind(), "DuplicateLink");

    let members = graph.products(&touring_cat.id).await.unwrap();
    assert_eq!(members.len(), 2);
    assert_eq!(members[0].product_id, touring.id);
    assert_eq!(members[0].tags, vec!["featured".to_string()]);

    graph
        .add_filter(&touring_cat.id, &"filter-color".to_string())
        .await
        .unwrap();
    assert_eq!(graph.filters(&touring_cat.id).await.unwrap().len(), 1);

    println!("8. Reordering siblings");
    let shop_links = store.links_for_parent(&shop.id).await.unwrap();
    assert_eq!(shop_links.len(), 2);
    let reordered = graph
        .reorder_links(&[
            LinkSortKey {
                assortment_link_id: shop_links[1].id.clone(),
                sort_key: 1,
            },
            LinkSortKey {
                assortment_link_id: shop_links[0].id.clone(),
                sort_key: 2,
            },
        ])
        .await
        .unwrap();
    assert_eq!(reordered[0].child_assortment_id, accessories.id);
    let flipped = graph.children(&shop.id, false, true).await.unwrap();
    assert_eq!(
        flipped.iter().map(|a| a.slug.as_str()).collect::<Vec<_>>(),
        ["accessories", "bikes"]
    );

    let incomplete = graph
        .reorder_links(&[LinkSortKey {
            assortment_link_id: shop_links[0].id.clone(),
            sort_key: 1,
        }])
        .await
        .unwrap_err();
    assert_eq!(incomplete.kind(), "IncompleteReorder");
    let unchanged = graph.children(&shop.id, false, true).await.unwrap();
    assert_eq!(
        unchanged.iter().map(|a| a.slug.as_str()).collect::<Vec<_>>(),
        ["accessories", "bikes"]
    );

    let empty = graph.reorder_links(&[]).await.unwrap_err();
    assert_eq!(empty.kind(), "IncompleteReorder");

    println!("9. Walking breadcrumb paths");
    let paths = graph.paths_for_assortment(&touring_cat.id, None).await.unwrap();
    assert_eq!(paths.len(), 2);
    assert_eq!(
        paths[0].links.iter().map(|l| l.slug.as_str()).collect::<Vec<_>>(),
        ["shop", "bikes", "touring"]
    );
    assert!(paths[0].links[0].link_id.is_none());
    assert!(paths[0].links[1].link_id.is_some());
    assert_eq!(
        paths[1].links.iter().map(|l| l.slug.as_str()).collect::<Vec<_>>(),
        ["outlet", "touring"]
    );

    let german = graph
        .paths_for_assortment(&touring_cat.id, Some("de"))
        .await
        .unwrap();
    assert_eq!(german[0].locale, "de");
    assert_eq!(
        german[0].links.iter().map(|l| l.title.as_str()).collect::<Vec<_>>(),
        ["shop", "Fahrräder", "touring"]
    );

    let product_paths = graph.paths_for_product(&touring.id, None).await.unwrap();
    assert_eq!(product_paths.len(), 2);

    println!("10. Cascading removals");
    graph.remove_assortment(&bikes.id).await.unwrap();
    let after = graph.paths_for_assortment(&touring_cat.id, None).await.unwrap();
    assert_eq!(after.len(), 1);
    assert_eq!(
        after[0].links.iter().map(|l| l.slug.as_str()).collect::<Vec<_>>(),
        ["outlet", "touring"]
    );
    let remaining_children = graph.children(&shop.id, false, true).await.unwrap();
    assert_eq!(
        remaining_children.iter().map(|a| a.slug.as_str()).collect::<Vec<_>>(),
        ["accessories"]
    );
    assert_eq!(graph.products(&touring_cat.id).await.unwrap().len(), 2);

    assert!(store.delete_product(&olive_58.id).await.unwrap());
    assert_eq!(variants.list_assignments(&touring.id).await.unwrap().len(), 3);
    let survivors = variants.resolve(&touring.id, &[], false).await.unwrap();
    assert_eq!(survivors.len(), 3);
}

#[tokio::test]
async fn concurrent_vector_claims_have_one_winner() {
    let engine = Arc::new(CatalogEngine::new(Arc::new(MemoryStore::new()), "en"));
    let store = engine.store();

    let proxy = product(ProductKind::Configurable, "duffel", 1, "Duffel");
    let small = product(ProductKind::Simple, "duffel-s", 2, "Duffel S");
    let large = product(ProductKind::Simple, "duffel-l", 3, "Duffel L");
    for p in [&proxy, &small, &large] {
        store.upsert_product((*p).clone()).await.unwrap();
    }
    let size = engine
        .variants()
        .create_variation(&proxy.id, "size", vec![])
        .await
        .unwrap();
    engine
        .variants()
        .create_variation_option(&size.id, "one", vec![])
        .await
        .unwrap();

    let mut claims = Vec::new();
    for contender in [small.clone(), large.clone()] {
        let engine = engine.clone();
        let proxy_id = proxy.id.clone();
        claims.push(tokio::spawn(async move {
            engine
                .variants()
                .add_assignment(&proxy_id, &contender.id, &[VectorInput::new("size", "one")])
                .await
        }));
    }

    let mut winners = 0;
    let mut losers = 0;
    for claim in claims {
        match claim.await.unwrap() {
            Ok(_) => winners += 1,
            Err(CatalogError::DuplicateVector { .. }) => losers += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!((winners, losers), (1, 1));

    let assignments = engine.variants().list_assignments(&proxy.id).await.unwrap();
    assert_eq!(assignments.len(), 1);
    assert!(assignments[0].product_id == small.id || assignments[0].product_id == large.id);
}
