use anyhow::{bail, Context, Result};
use sqlx::postgres::PgRow;
use sqlx::{postgres::PgPoolOptions, PgPool, Row};

use crate::model::{
    Assortment, AssortmentFilter, AssortmentLink, AssortmentProduct, AssortmentStatus, Id,
    LocalizedText, Product, ProductKind, ProductStatus, ProductVariation,
    ProductVariationAssignment, VariationOption, VectorPair,
};
use crate::store::traits::{
    AssignmentStore, AssortmentFilterStore, AssortmentLinkStore, AssortmentProductStore,
    AssortmentStore, CatalogStore, ProductStore, VariationStore,
};

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store with the given database URL
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;

        Ok(())
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn product_kind_str(kind: ProductKind) -> &'static str {
    match kind {
        ProductKind::Simple => "SIMPLE",
        ProductKind::Configurable => "CONFIGURABLE",
        ProductKind::Bundle => "BUNDLE",
        ProductKind::Plan => "PLAN",
        ProductKind::Tokenized => "TOKENIZED",
    }
}

fn product_kind_from_str(value: &str) -> Result<ProductKind> {
    Ok(match value {
        "SIMPLE" => ProductKind::Simple,
        "CONFIGURABLE" => ProductKind::Configurable,
        "BUNDLE" => ProductKind::Bundle,
        "PLAN" => ProductKind::Plan,
        "TOKENIZED" => ProductKind::Tokenized,
        other => bail!("unknown product kind '{}'", other),
    })
}

fn product_status_str(status: ProductStatus) -> &'static str {
    match status {
        ProductStatus::Draft => "DRAFT",
        ProductStatus::Active => "ACTIVE",
        ProductStatus::Inactive => "INACTIVE",
        ProductStatus::Deleted => "DELETED",
    }
}

fn product_status_from_str(value: &str) -> Result<ProductStatus> {
    Ok(match value {
        "DRAFT" => ProductStatus::Draft,
        "ACTIVE" => ProductStatus::Active,
        "INACTIVE" => ProductStatus::Inactive,
        "DELETED" => ProductStatus::Deleted,
        other => bail!("unknown product status '{}'", other),
    })
}

fn assortment_status_str(status: AssortmentStatus) -> &'static str {
    match status {
        AssortmentStatus::Active => "active",
        AssortmentStatus::Inactive => "inactive",
    }
}

fn assortment_status_from_str(value: &str) -> Result<AssortmentStatus> {
    Ok(match value {
        "active" => AssortmentStatus::Active,
        "inactive" => AssortmentStatus::Inactive,
        other => bail!("unknown assortment status '{}'", other),
    })
}

fn product_from_row(row: &PgRow) -> Result<Product> {
    let kind: String = row.get("kind");
    let status: String = row.get("status");
    let tags: Vec<String> = serde_json::from_value(row.get::<serde_json::Value, _>("tags"))
        .context("Failed to deserialize product tags")?;
    let texts: Vec<LocalizedText> =
        serde_json::from_value(row.get::<serde_json::Value, _>("texts"))
            .context("Failed to deserialize product texts")?;

    Ok(Product {
        id: row.get("id"),
        kind: product_kind_from_str(&kind)?,
        status: product_status_from_str(&status)?,
        slug: row.get("slug"),
        sequence: row.get("sequence"),
        tags,
        texts,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn variation_from_row(row: &PgRow) -> Result<ProductVariation> {
    let texts: Vec<LocalizedText> =
        serde_json::from_value(row.get::<serde_json::Value, _>("texts"))
            .context("Failed to deserialize variation texts")?;
    let options: Vec<VariationOption> =
        serde_json::from_value(row.get::<serde_json::Value, _>("options"))
            .context("Failed to deserialize variation options")?;

    Ok(ProductVariation {
        id: row.get("id"),
        product_id: row.get("product_id"),
        key: row.get("key"),
        sequence: row.get("sequence"),
        texts,
        options,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn assignment_from_row(row: &PgRow) -> Result<ProductVariationAssignment> {
    let vector: Vec<VectorPair> =
        serde_json::from_value(row.get::<serde_json::Value, _>("vector"))
            .context("Failed to deserialize assignment vector")?;

    Ok(ProductVariationAssignment {
        id: row.get("id"),
        proxy_id: row.get("proxy_id"),
        product_id: row.get("product_id"),
        vector,
        created_at: row.get("created_at"),
    })
}

fn assortment_from_row(row: &PgRow) -> Result<Assortment> {
    let status: String = row.get("status");
    let tags: Vec<String> = serde_json::from_value(row.get::<serde_json::Value, _>("tags"))
        .context("Failed to deserialize assortment tags")?;
    let texts: Vec<LocalizedText> =
        serde_json::from_value(row.get::<serde_json::Value, _>("texts"))
            .context("Failed to deserialize assortment texts")?;

    Ok(Assortment {
        id: row.get("id"),
        status: assortment_status_from_str(&status)?,
        is_root: row.get("is_root"),
        is_base: row.get("is_base"),
        slug: row.get("slug"),
        sequence: row.get("sequence"),
        tags,
        texts,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn link_from_row(row: &PgRow) -> Result<AssortmentLink> {
    let tags: Vec<String> = serde_json::from_value(row.get::<serde_json::Value, _>("tags"))
        .context("Failed to deserialize link tags")?;

    Ok(AssortmentLink {
        id: row.get("id"),
        parent_assortment_id: row.get("parent_assortment_id"),
        child_assortment_id: row.get("child_assortment_id"),
        sort_key: row.get("sort_key"),
        tags,
        created_at: row.get("created_at"),
    })
}

fn assortment_product_from_row(row: &PgRow) -> Result<AssortmentProduct> {
    let tags: Vec<String> = serde_json::from_value(row.get::<serde_json::Value, _>("tags"))
        .context("Failed to deserialize membership tags")?;

    Ok(AssortmentProduct {
        id: row.get("id"),
        assortment_id: row.get("assortment_id"),
        product_id: row.get("product_id"),
        sort_key: row.get("sort_key"),
        tags,
        created_at: row.get("created_at"),
    })
}

fn assortment_filter_from_row(row: &PgRow) -> AssortmentFilter {
    AssortmentFilter {
        id: row.get("id"),
        assortment_id: row.get("assortment_id"),
        filter_id: row.get("filter_id"),
        sort_key: row.get("sort_key"),
        created_at: row.get("created_at"),
    }
}

#[async_trait::async_trait]
impl ProductStore for PostgresStore {
    async fn get_product(&self, id: &Id) -> Result<Option<Product>> {
        let row = sqlx::query(
            "SELECT id, kind, status, slug, sequence, tags, texts, created_at, updated_at FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch product")?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(product_from_row(&row)?))
    }

    async fn get_product_by_slug(&self, slug: &str) -> Result<Option<Product>> {
        let row = sqlx::query(
            "SELECT id, kind, status, slug, sequence, tags, texts, created_at, updated_at FROM products WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch product by slug")?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(product_from_row(&row)?))
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query(
            "SELECT id, kind, status, slug, sequence, tags, texts, created_at, updated_at FROM products ORDER BY sequence, created_at",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list products")?;

        rows.iter().map(product_from_row).collect()
    }

    async fn upsert_product(&self, product: Product) -> Result<()> {
        let tags = serde_json::to_value(&product.tags)
            .context("Failed to serialize product tags")?;
        let texts = serde_json::to_value(&product.texts)
            .context("Failed to serialize product texts")?;

        sqlx::query(
            r#"
            INSERT INTO products (id, kind, status, slug, sequence, tags, texts, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO UPDATE SET
                kind = EXCLUDED.kind,
                status = EXCLUDED.status,
                slug = EXCLUDED.slug,
                sequence = EXCLUDED.sequence,
                tags = EXCLUDED.tags,
                texts = EXCLUDED.texts,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&product.id)
        .bind(product_kind_str(product.kind))
        .bind(product_status_str(product.status))
        .bind(&product.slug)
        .bind(product.sequence)
        .bind(tags)
        .bind(texts)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .context("Failed to upsert product")?;

        Ok(())
    }

    async fn delete_product(&self, id: &Id) -> Result<bool> {
        // Variations, assignments (both sides) and assortment memberships go
        // with the product via foreign key cascades.
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete product")?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait::async_trait]
impl VariationStore for PostgresStore {
    async fn get_variation(&self, id: &Id) -> Result<Option<ProductVariation>> {
        let row = sqlx::query(
            "SELECT id, product_id, key, sequence, texts, options, created_at, updated_at FROM product_variations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch variation")?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(variation_from_row(&row)?))
    }

    async fn list_variations(&self, product_id: &Id) -> Result<Vec<ProductVariation>> {
        let rows = sqlx::query(
            "SELECT id, product_id, key, sequence, texts, options, created_at, updated_at FROM product_variations WHERE product_id = $1 ORDER BY sequence, created_at",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list variations")?;

        rows.iter().map(variation_from_row).collect()
    }

    async fn upsert_variation(&self, variation: ProductVariation) -> Result<()> {
        let texts = serde_json::to_value(&variation.texts)
            .context("Failed to serialize variation texts")?;
        let options = serde_json::to_value(&variation.options)
            .context("Failed to serialize variation options")?;

        sqlx::query(
            r#"
            INSERT INTO product_variations (id, product_id, key, sequence, texts, options, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE SET
                key = EXCLUDED.key,
                sequence = EXCLUDED.sequence,
                texts = EXCLUDED.texts,
                options = EXCLUDED.options,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&variation.id)
        .bind(&variation.product_id)
        .bind(&variation.key)
        .bind(variation.sequence)
        .bind(texts)
        .bind(options)
        .bind(variation.created_at)
        .bind(variation.updated_at)
        .execute(&self.pool)
        .await
        .context("Failed to upsert variation")?;

        Ok(())
    }

    async fn delete_variation(&self, id: &Id) -> Result<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        let row = sqlx::query("SELECT product_id FROM product_variations WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .context("Failed to fetch variation")?;

        let Some(row) = row else {
            return Ok(false);
        };
        let proxy_id: String = row.get("product_id");

        sqlx::query("DELETE FROM product_variations WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete variation")?;

        // Vector pairs are stored camelCase; containment matches any
        // assignment whose vector references the removed variation.
        sqlx::query(
            r#"
            DELETE FROM product_variation_assignments
            WHERE proxy_id = $1
              AND vector @> jsonb_build_array(jsonb_build_object('variationId', $2::text))
            "#,
        )
        .bind(&proxy_id)
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to delete assignments for variation")?;

        tx.commit()
            .await
            .context("Failed to commit variation removal")?;

        Ok(true)
    }

    async fn delete_variation_option(
        &self,
        variation_id: &Id,
        option_value: &str,
    ) -> Result<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        let row = sqlx::query(
            "SELECT product_id, options FROM product_variations WHERE id = $1",
        )
        .bind(variation_id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to fetch variation")?;

        let Some(row) = row else {
            return Ok(false);
        };
        let proxy_id: String = row.get("product_id");
        let mut options: Vec<VariationOption> =
            serde_json::from_value(row.get::<serde_json::Value, _>("options"))
                .context("Failed to deserialize variation options")?;

        let before = options.len();
        options.retain(|o| o.value != option_value);
        if options.len() == before {
            return Ok(false);
        }

        let options_json =
            serde_json::to_value(&options).context("Failed to serialize variation options")?;
        sqlx::query(
            "UPDATE product_variations SET options = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(variation_id)
        .bind(options_json)
        .execute(&mut *tx)
        .await
        .context("Failed to update variation options")?;

        sqlx::query(
            r#"
            DELETE FROM product_variation_assignments
            WHERE proxy_id = $1
              AND vector @> jsonb_build_array(jsonb_build_object('variationId', $2::text, 'optionValue', $3::text))
            "#,
        )
        .bind(&proxy_id)
        .bind(variation_id)
        .bind(option_value)
        .execute(&mut *tx)
        .await
        .context("Failed to delete assignments for option")?;

        tx.commit()
            .await
            .context("Failed to commit option removal")?;

        Ok(true)
    }
}

#[async_trait::async_trait]
impl AssignmentStore for PostgresStore {
    async fn get_assignment(
        &self,
        proxy_id: &Id,
        vector_key: &str,
    ) -> Result<Option<ProductVariationAssignment>> {
        let row = sqlx::query(
            "SELECT id, proxy_id, product_id, vector, created_at FROM product_variation_assignments WHERE proxy_id = $1 AND vector_key = $2",
        )
        .bind(proxy_id)
        .bind(vector_key)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch assignment")?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(assignment_from_row(&row)?))
    }

    async fn list_assignments(&self, proxy_id: &Id) -> Result<Vec<ProductVariationAssignment>> {
        let rows = sqlx::query(
            "SELECT id, proxy_id, product_id, vector, created_at FROM product_variation_assignments WHERE proxy_id = $1 ORDER BY created_at",
        )
        .bind(proxy_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list assignments")?;

        rows.iter().map(assignment_from_row).collect()
    }

    async fn upsert_assignment(&self, assignment: ProductVariationAssignment) -> Result<()> {
        let vector_key = assignment.vector_key();
        let vector = serde_json::to_value(&assignment.vector)
            .context("Failed to serialize assignment vector")?;

        sqlx::query(
            r#"
            INSERT INTO product_variation_assignments (id, proxy_id, product_id, vector, vector_key, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (proxy_id, vector_key) DO UPDATE SET
                product_id = EXCLUDED.product_id,
                vector = EXCLUDED.vector
            "#,
        )
        .bind(&assignment.id)
        .bind(&assignment.proxy_id)
        .bind(&assignment.product_id)
        .bind(vector)
        .bind(vector_key)
        .bind(assignment.created_at)
        .execute(&self.pool)
        .await
        .context("Failed to upsert assignment")?;

        Ok(())
    }

    async fn delete_assignment(&self, proxy_id: &Id, vector_key: &str) -> Result<bool> {
        let result = sqlx::query(
            "DELETE FROM product_variation_assignments WHERE proxy_id = $1 AND vector_key = $2",
        )
        .bind(proxy_id)
        .bind(vector_key)
        .execute(&self.pool)
        .await
        .context("Failed to delete assignment")?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait::async_trait]
impl AssortmentStore for PostgresStore {
    async fn get_assortment(&self, id: &Id) -> Result<Option<Assortment>> {
        let row = sqlx::query(
            "SELECT id, status, is_root, is_base, slug, sequence, tags, texts, created_at, updated_at FROM assortments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch assortment")?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(assortment_from_row(&row)?))
    }

    async fn get_assortment_by_slug(&self, slug: &str) -> Result<Option<Assortment>> {
        let row = sqlx::query(
            "SELECT id, status, is_root, is_base, slug, sequence, tags, texts, created_at, updated_at FROM assortments WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch assortment by slug")?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(assortment_from_row(&row)?))
    }

    async fn list_assortments(&self) -> Result<Vec<Assortment>> {
        let rows = sqlx::query(
            "SELECT id, status, is_root, is_base, slug, sequence, tags, texts, created_at, updated_at FROM assortments ORDER BY sequence, created_at",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list assortments")?;

        rows.iter().map(assortment_from_row).collect()
    }

    async fn upsert_assortment(&self, assortment: Assortment) -> Result<()> {
        let tags = serde_json::to_value(&assortment.tags)
            .context("Failed to serialize assortment tags")?;
        let texts = serde_json::to_value(&assortment.texts)
            .context("Failed to serialize assortment texts")?;

        sqlx::query(
            r#"
            INSERT INTO assortments (id, status, is_root, is_base, slug, sequence, tags, texts, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO UPDATE SET
                status = EXCLUDED.status,
                is_root = EXCLUDED.is_root,
                is_base = EXCLUDED.is_base,
                slug = EXCLUDED.slug,
                sequence = EXCLUDED.sequence,
                tags = EXCLUDED.tags,
                texts = EXCLUDED.texts,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&assortment.id)
        .bind(assortment_status_str(assortment.status))
        .bind(assortment.is_root)
        .bind(assortment.is_base)
        .bind(&assortment.slug)
        .bind(assortment.sequence)
        .bind(tags)
        .bind(texts)
        .bind(assortment.created_at)
        .bind(assortment.updated_at)
        .execute(&self.pool)
        .await
        .context("Failed to upsert assortment")?;

        Ok(())
    }

    async fn delete_assortment(&self, id: &Id) -> Result<bool> {
        // Links on both sides, memberships and filter assignments go with the
        // node via foreign key cascades.
        let result = sqlx::query("DELETE FROM assortments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete assortment")?;

        Ok(result.rows_affected() > 0)
    }

    async fn base_assortment(&self) -> Result<Option<Assortment>> {
        let row = sqlx::query(
            "SELECT id, status, is_root, is_base, slug, sequence, tags, texts, created_at, updated_at FROM assortments WHERE is_base LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch base assortment")?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(assortment_from_row(&row)?))
    }

    async fn set_base_assortment(&self, id: &Id) -> Result<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        let exists = sqlx::query("SELECT 1 FROM assortments WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .context("Failed to fetch assortment")?;
        if exists.is_none() {
            return Ok(false);
        }

        // Demote before promoting so the partial unique index on is_base
        // never sees two bases.
        sqlx::query(
            "UPDATE assortments SET is_base = FALSE, updated_at = NOW() WHERE is_base AND id <> $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to demote base assortment")?;

        sqlx::query(
            "UPDATE assortments SET is_base = TRUE, updated_at = NOW() WHERE id = $1 AND NOT is_base",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to promote base assortment")?;

        tx.commit()
            .await
            .context("Failed to commit base change")?;

        Ok(true)
    }
}

#[async_trait::async_trait]
impl AssortmentLinkStore for PostgresStore {
    async fn get_link(&self, id: &Id) -> Result<Option<AssortmentLink>> {
        let row = sqlx::query(
            "SELECT id, parent_assortment_id, child_assortment_id, sort_key, tags, created_at FROM assortment_links WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch link")?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(link_from_row(&row)?))
    }

    async fn links_for_parent(&self, parent_id: &Id) -> Result<Vec<AssortmentLink>> {
        let rows = sqlx::query(
            "SELECT id, parent_assortment_id, child_assortment_id, sort_key, tags, created_at FROM assortment_links WHERE parent_assortment_id = $1 ORDER BY sort_key, created_at",
        )
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list links for parent")?;

        rows.iter().map(link_from_row).collect()
    }

    async fn links_for_child(&self, child_id: &Id) -> Result<Vec<AssortmentLink>> {
        let rows = sqlx::query(
            "SELECT id, parent_assortment_id, child_assortment_id, sort_key, tags, created_at FROM assortment_links WHERE child_assortment_id = $1 ORDER BY sort_key, created_at",
        )
        .bind(child_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list links for child")?;

        rows.iter().map(link_from_row).collect()
    }

    async fn upsert_link(&self, link: AssortmentLink) -> Result<()> {
        let tags =
            serde_json::to_value(&link.tags).context("Failed to serialize link tags")?;

        sqlx::query(
            r#"
            INSERT INTO assortment_links (id, parent_assortment_id, child_assortment_id, sort_key, tags, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                sort_key = EXCLUDED.sort_key,
                tags = EXCLUDED.tags
            "#,
        )
        .bind(&link.id)
        .bind(&link.parent_assortment_id)
        .bind(&link.child_assortment_id)
        .bind(link.sort_key)
        .bind(tags)
        .bind(link.created_at)
        .execute(&self.pool)
        .await
        .context("Failed to upsert link")?;

        Ok(())
    }

    async fn update_link_sort_keys(&self, entries: Vec<(Id, i32)>) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        for (id, sort_key) in &entries {
            let result =
                sqlx::query("UPDATE assortment_links SET sort_key = $2 WHERE id = $1")
                    .bind(id)
                    .bind(sort_key)
                    .execute(&mut *tx)
                    .await
                    .context("Failed to update link sort key")?;
            if result.rows_affected() == 0 {
                bail!("assortment link '{}' not found", id);
            }
        }

        tx.commit().await.context("Failed to commit link reorder")?;

        Ok(())
    }

    async fn delete_link(&self, id: &Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM assortment_links WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete link")?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait::async_trait]
impl AssortmentProductStore for PostgresStore {
    async fn get_assortment_product(&self, id: &Id) -> Result<Option<AssortmentProduct>> {
        let row = sqlx::query(
            "SELECT id, assortment_id, product_id, sort_key, tags, created_at FROM assortment_products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch assortment product")?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(assortment_product_from_row(&row)?))
    }

    async fn products_for_assortment(
        &self,
        assortment_id: &Id,
    ) -> Result<Vec<AssortmentProduct>> {
        let rows = sqlx::query(
            "SELECT id, assortment_id, product_id, sort_key, tags, created_at FROM assortment_products WHERE assortment_id = $1 ORDER BY sort_key, created_at",
        )
        .bind(assortment_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list products for assortment")?;

        rows.iter().map(assortment_product_from_row).collect()
    }

    async fn assortments_for_product(&self, product_id: &Id) -> Result<Vec<AssortmentProduct>> {
        let rows = sqlx::query(
            "SELECT id, assortment_id, product_id, sort_key, tags, created_at FROM assortment_products WHERE product_id = $1 ORDER BY created_at",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list assortments for product")?;

        rows.iter().map(assortment_product_from_row).collect()
    }

    async fn upsert_assortment_product(&self, entry: AssortmentProduct) -> Result<()> {
        let tags =
            serde_json::to_value(&entry.tags).context("Failed to serialize membership tags")?;

        sqlx::query(
            r#"
            INSERT INTO assortment_products (id, assortment_id, product_id, sort_key, tags, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                sort_key = EXCLUDED.sort_key,
                tags = EXCLUDED.tags
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.assortment_id)
        .bind(&entry.product_id)
        .bind(entry.sort_key)
        .bind(tags)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .context("Failed to upsert assortment product")?;

        Ok(())
    }

    async fn update_assortment_product_sort_keys(&self, entries: Vec<(Id, i32)>) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        for (id, sort_key) in &entries {
            let result =
                sqlx::query("UPDATE assortment_products SET sort_key = $2 WHERE id = $1")
                    .bind(id)
                    .bind(sort_key)
                    .execute(&mut *tx)
                    .await
                    .context("Failed to update membership sort key")?;
            if result.rows_affected() == 0 {
                bail!("assortment product '{}' not found", id);
            }
        }

        tx.commit()
            .await
            .context("Failed to commit membership reorder")?;

        Ok(())
    }

    async fn delete_assortment_product(&self, id: &Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM assortment_products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete assortment product")?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait::async_trait]
impl AssortmentFilterStore for PostgresStore {
    async fn get_assortment_filter(&self, id: &Id) -> Result<Option<AssortmentFilter>> {
        let row = sqlx::query(
            "SELECT id, assortment_id, filter_id, sort_key, created_at FROM assortment_filters WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch assortment filter")?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(assortment_filter_from_row(&row)))
    }

    async fn filters_for_assortment(
        &self,
        assortment_id: &Id,
    ) -> Result<Vec<AssortmentFilter>> {
        let rows = sqlx::query(
            "SELECT id, assortment_id, filter_id, sort_key, created_at FROM assortment_filters WHERE assortment_id = $1 ORDER BY sort_key, created_at",
        )
        .bind(assortment_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list filters for assortment")?;

        Ok(rows.iter().map(assortment_filter_from_row).collect())
    }

    async fn upsert_assortment_filter(&self, entry: AssortmentFilter) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO assortment_filters (id, assortment_id, filter_id, sort_key, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                sort_key = EXCLUDED.sort_key
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.assortment_id)
        .bind(&entry.filter_id)
        .bind(entry.sort_key)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .context("Failed to upsert assortment filter")?;

        Ok(())
    }

    async fn update_assortment_filter_sort_keys(&self, entries: Vec<(Id, i32)>) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        for (id, sort_key) in &entries {
            let result =
                sqlx::query("UPDATE assortment_filters SET sort_key = $2 WHERE id = $1")
                    .bind(id)
                    .bind(sort_key)
                    .execute(&mut *tx)
                    .await
                    .context("Failed to update filter sort key")?;
            if result.rows_affected() == 0 {
                bail!("assortment filter '{}' not found", id);
            }
        }

        tx.commit()
            .await
            .context("Failed to commit filter reorder")?;

        Ok(())
    }

    async fn delete_assortment_filter(&self, id: &Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM assortment_filters WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete assortment filter")?;

        Ok(result.rows_affected() > 0)
    }
}

impl CatalogStore for PostgresStore {}
