use std::sync::Arc;

use rust_decimal::Decimal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

use shop_checkout::auth::CurrentUser;
use shop_checkout::config::Settings;
use shop_checkout::domain::ids::TimeOrderedUuidGenerator;
use shop_checkout::domain::order::OrderLine;
use shop_checkout::domain::product::{CreateProduct, ListProducts};
use shop_checkout::domain::repository::Store;
use shop_checkout::metrics::{self, ShopMetrics};
use shop_checkout::payment::{PaymentMethod, SimulatedPaymentGateway};
use shop_checkout::store::{InMemoryStore, PgStore};
use shop_checkout::Shop;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Default to INFO level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,shop_checkout=debug")),
        )
        .init();

    let settings = Settings::load()?;
    tracing::info!("🚀 Starting shop checkout");

    // === 1. Store ===
    let store: Arc<dyn Store> = match &settings.database_url {
        Some(url) => {
            let store = PgStore::connect(url, settings.database_max_connections).await?;
            store.migrate().await?;
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store");
            Arc::new(InMemoryStore::new())
        }
    };

    // === 2. Metrics ===
    let metrics = Arc::new(ShopMetrics::new()?);
    if let Some(port) = settings.metrics_port {
        let registry = metrics.registry().clone();
        std::thread::spawn(move || {
            let system = actix_web::rt::System::new();
            if let Err(e) = system.block_on(metrics::start_metrics_server(registry, port)) {
                tracing::error!(error = %e, "Metrics server error");
            }
        });
    }

    // === 3. Shop ===
    let shop = Shop::new(
        store,
        Arc::new(TimeOrderedUuidGenerator),
        Arc::new(SimulatedPaymentGateway),
        metrics,
    )
    .with_payment_timeout(settings.payment_timeout)
    .with_retry_policy(settings.retry_policy());

    // === 4. Walk through a purchase ===
    let admin = CurrentUser::admin(Uuid::now_v7());
    let customer = CurrentUser::customer(Uuid::now_v7());

    let product_id = shop
        .create_product(
            Some(&admin),
            CreateProduct {
                name: "Mechanical Keyboard".to_string(),
                description: Some("Tenkeyless, brown switches".to_string()),
                price: Decimal::new(8990, 2),
                currency: settings.default_currency.to_string(),
                stock: 5,
                image_url: None,
            },
        )
        .await?;

    let page = shop.list_products(None, ListProducts::default()).await?;
    tracing::info!(total = page.meta.total, "📦 Catalog loaded");

    let order_id = shop
        .create_order(
            Some(&customer),
            vec![OrderLine {
                product_id,
                quantity: 2,
            }],
        )
        .await?;

    let receipt = shop
        .checkout(Some(&customer), order_id, PaymentMethod::default())
        .await?;
    tracing::info!(
        order_id = %receipt.order_id,
        status = %receipt.status,
        total = %receipt.total,
        "✅ {}",
        receipt.message
    );

    let detail = shop.get_order_detail(Some(&customer), order_id).await?;
    tracing::info!(
        order_id = %detail.id,
        items = detail.items.len(),
        paid_at = ?detail.paid_at,
        "🧾 Order detail"
    );

    // Someone else's order looks exactly like a missing one
    let stranger = CurrentUser::customer(Uuid::now_v7());
    if let Err(e) = shop.get_order_detail(Some(&stranger), order_id).await {
        tracing::info!(error = %e, kind = ?e.kind(), "🔒 Foreign order hidden");
    }

    if settings.metrics_port.is_some() {
        tracing::info!("⏳ Serving metrics, press Ctrl+C to exit");
        tokio::signal::ctrl_c().await?;
    }

    tracing::info!("🎉 Demo complete!");
    Ok(())
}
