use crate::model::{
    pick_text, Assortment, AssortmentPath, AssortmentPathLink, CatalogResult, Id,
};
use crate::store::traits::CatalogStore;

/// One hop of an in-progress upward walk, target-first while building.
#[derive(Clone)]
struct PathHop {
    assortment: Assortment,
    /// Link from this hop's parent into it; filled in when the walk extends
    /// past the hop, `None` while it is the head.
    link_from_parent: Option<Id>,
}

/// Every distinct upward chain from `target` to a parentless assortment,
/// each returned root → target with titles resolved for `locale`. Parents
/// are explored in sibling order, so path order is deterministic. The graph
/// is kept acyclic at write time; an on-chain guard keeps the walk finite
/// even if data was edited behind the engine's back.
pub async fn assortment_paths<S: CatalogStore>(
    store: &S,
    target: &Assortment,
    locale: &str,
) -> CatalogResult<Vec<AssortmentPath>> {
    let mut paths = Vec::new();
    let mut stack: Vec<Vec<PathHop>> = vec![vec![PathHop {
        assortment: target.clone(),
        link_from_parent: None,
    }]];

    while let Some(chain) = stack.pop() {
        let Some(head) = chain.last() else { continue };

        let parent_links = store.links_for_child(&head.assortment.id).await?;
        let mut extended = false;
        // Reversed push order so the stack pops parents in sibling order.
        for link in parent_links.into_iter().rev() {
            if chain
                .iter()
                .any(|hop| hop.assortment.id == link.parent_assortment_id)
            {
                continue;
            }
            let Some(parent) = store.get_assortment(&link.parent_assortment_id).await? else {
                continue;
            };

            let mut next = chain.clone();
            if let Some(tail) = next.last_mut() {
                tail.link_from_parent = Some(link.id.clone());
            }
            next.push(PathHop {
                assortment: parent,
                link_from_parent: None,
            });
            stack.push(next);
            extended = true;
        }

        if !extended {
            paths.push(finish_path(chain, locale));
        }
    }

    Ok(paths)
}

fn finish_path(mut chain: Vec<PathHop>, locale: &str) -> AssortmentPath {
    chain.reverse();
    let links = chain
        .into_iter()
        .map(|hop| {
            let title = pick_text(&hop.assortment.texts, locale)
                .map(|text| text.title.clone())
                .unwrap_or_else(|| hop.assortment.slug.clone());
            AssortmentPathLink {
                assortment_id: hop.assortment.id,
                slug: hop.assortment.slug,
                title,
                link_id: hop.link_from_parent,
            }
        })
        .collect();

    AssortmentPath {
        locale: locale.to_string(),
        links,
    }
}
