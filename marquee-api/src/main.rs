use chrono::{Duration, Utc};
use marquee_api::{app, AppState};
use marquee_booking::{ExpirySweeper, ReservationManager};
use marquee_catalog::SeatCatalog;
use marquee_domain::Show;
use marquee_store::{app_config::Config, BookingLedger, LockTable};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marquee_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().expect("Failed to load config");
    tracing::info!("Starting Marquee API on port {}", config.server.port);

    let catalog = Arc::new(SeatCatalog::new());
    let locks = Arc::new(LockTable::new());
    let ledger = Arc::new(BookingLedger::new());

    // Seed the demo screening; show provisioning proper is out of scope
    let demo = &config.demo_show;
    let show = Show {
        id: Uuid::new_v4(),
        title: demo.title.clone(),
        base_price: demo.base_price,
        premium_price: demo.premium_price,
        starts_at: Utc::now() + Duration::minutes(demo.starts_in_minutes),
    };
    let show_id = show.id;
    let seats = catalog.register_show(show, demo.rows, demo.seats_per_row);
    tracing::info!(
        "Seeded show {} ({}): {} seats ({} rows x {} per row)",
        show_id,
        demo.title,
        seats.len(),
        demo.rows,
        demo.seats_per_row
    );

    let hold_ttl = Duration::seconds(config.business_rules.hold_ttl_seconds as i64);
    let manager = Arc::new(ReservationManager::new(
        Arc::clone(&catalog),
        Arc::clone(&locks),
        Arc::clone(&ledger),
        hold_ttl,
    ));

    // SSE Broadcast Channel
    let (sse_tx, _) = tokio::sync::broadcast::channel(100);

    let sweep_interval =
        std::time::Duration::from_secs(config.business_rules.sweep_interval_seconds());
    ExpirySweeper::new(Arc::clone(&locks), sweep_interval)
        .with_events(sse_tx.clone())
        .spawn();
    tracing::info!(
        "Expiry sweeper running every {}s (hold TTL {}s)",
        sweep_interval.as_secs(),
        config.business_rules.hold_ttl_seconds
    );

    let app_state = AppState {
        manager,
        sse_tx,
    };
    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
