use std::sync::Arc;

use vitrine_db::config::AppConfig;
use vitrine_db::logic::CatalogEngine;
use vitrine_db::model::VectorInput;
use vitrine_db::seed;
use vitrine_db::store::{CatalogStore, MemoryStore, PostgresStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // Initialize logging with explicit filter to suppress sqlx debug logs
    use env_logger::Builder;
    use log::LevelFilter;

    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter_module("sqlx", LevelFilter::Warn)
        .init();

    println!("Vitrine-DB: Product Catalog Engine");

    // Load configuration
    let config = AppConfig::load()?;
    println!("Configuration loaded: locale={}", config.catalog.locale);

    match config.database_url() {
        Some(database_url) => {
            println!("Connecting to PostgreSQL...");
            let postgres_store = PostgresStore::new(&database_url).await?;

            println!("Running database migrations...");
            postgres_store.migrate().await?;
            println!("Database ready");

            let engine = CatalogEngine::new(Arc::new(postgres_store), &config.catalog.locale);
            run_catalog(&engine, config.catalog.seed).await?;
        }
        None => {
            println!("No DATABASE_URL configured, using the in-memory store");
            let engine = CatalogEngine::new(Arc::new(MemoryStore::new()), &config.catalog.locale);
            run_catalog(&engine, config.catalog.seed).await?;
        }
    }

    Ok(())
}

async fn run_catalog<S: CatalogStore>(
    engine: &CatalogEngine<S>,
    load_seed: bool,
) -> anyhow::Result<()> {
    if load_seed {
        println!("Loading seed data...");
        seed::load_seed_data(engine).await?;
        println!("Seed data loaded successfully");
    }

    let products = engine.store().list_products().await?;
    let assortments = engine.store().list_assortments().await?;
    println!(
        "Catalog ready: {} products, {} assortments",
        products.len(),
        assortments.len()
    );

    if let Some(base) = engine.assortments().base().await? {
        println!("Base assortment: {}", base.slug);
    }

    if let Some(proxy) = products.iter().find(|p| p.is_proxy()) {
        let everything = engine.variants().resolve(&proxy.id, &[], false).await?;
        println!(
            "Proxy '{}' resolves to {} active variants",
            proxy.slug,
            everything.len()
        );

        let red = vec![VectorInput::new("color", "red")];
        let narrowed = engine.variants().resolve(&proxy.id, &red, false).await?;
        for product in &narrowed {
            println!("  color=red -> {}", product.slug);
        }

        for path in engine.assortments().paths_for_product(&proxy.id, None).await? {
            let trail = path
                .links
                .iter()
                .map(|link| link.title.as_str())
                .collect::<Vec<_>>()
                .join(" > ");
            println!("  breadcrumb: {}", trail);
        }
    }

    Ok(())
}
