use actix_web::{web, App, HttpServer};
use std::sync::Arc;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use givesplit::config::Config;
use givesplit::modules::aggregates::repositories::AggregateRepository;
use givesplit::modules::aggregates::services::AggregateCounterService;
use givesplit::modules::donations::controllers::{checkout_controller, webhook_controller};
use givesplit::modules::donations::repositories::DonationRepository;
use givesplit::modules::donations::services::{DonationLedger, LogNotifier};
use givesplit::modules::gateways::{HostedCheckoutGateway, PaymentGateway};
use givesplit::modules::health::controllers::health_controller;
use givesplit::modules::reports::controllers::report_controller;
use givesplit::modules::reports::repositories::ReportRepository;
use givesplit::modules::reports::services::ReportService;
use givesplit::modules::settlement::controllers::admin_controller;
use givesplit::modules::settlement::repositories::SettingsRepository;
use givesplit::modules::settlement::services::SettlementModeGate;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "givesplit=debug,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().expect("Failed to load configuration");
    config.validate().expect("Configuration validation failed");

    tracing::info!("Starting GiveSplit donation settlement engine");
    tracing::info!("Environment: {}", config.app.env);
    tracing::info!("Server binding to: {}", config.server.bind_address());

    // Create database connection pool (runs migrations)
    let db_pool = config
        .database
        .create_pool()
        .await
        .expect("Failed to create database pool");

    tracing::info!(
        "Database pool initialized ({} connections)",
        config.database.pool_size
    );

    // Wire repositories and services
    let donation_repo = DonationRepository::new(db_pool.clone());
    let counter_service = AggregateCounterService::new(AggregateRepository::new(db_pool.clone()));
    let ledger = Arc::new(DonationLedger::new(
        donation_repo,
        counter_service.clone(),
        Arc::new(LogNotifier),
    ));
    let gateway: Arc<dyn PaymentGateway> = Arc::new(HostedCheckoutGateway::new(
        config.gateway.api_key.clone(),
        config.gateway.webhook_secret.clone(),
        config.gateway.base_url.clone(),
    ));
    let gate = web::Data::new(SettlementModeGate::new(
        SettingsRepository::new(db_pool.clone()),
        ledger.clone(),
        counter_service,
        gateway.clone(),
    ));
    let report_service = web::Data::new(ReportService::new(ReportRepository::new(
        db_pool.clone(),
    )));
    let ledger_data = web::Data::new(ledger);
    let gateway_data = web::Data::new(gateway);

    // Start HTTP server
    let bind_address = config.server.bind_address();
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(gate.clone())
            .app_data(report_service.clone())
            .app_data(ledger_data.clone())
            .app_data(gateway_data.clone())
            .route("/health", web::get().to(health_controller::health_check))
            .route(
                "/checkout",
                web::post().to(checkout_controller::create_checkout),
            )
            .route(
                "/donations/{id}",
                web::get().to(checkout_controller::get_donation),
            )
            .route(
                "/webhooks/gateway",
                web::post().to(webhook_controller::handle_gateway_callback),
            )
            .route(
                "/admin/simulation",
                web::get().to(admin_controller::get_simulation_mode),
            )
            .route(
                "/admin/simulation/toggle",
                web::post().to(admin_controller::toggle_simulation),
            )
            .route(
                "/reports/quarterly",
                web::get().to(report_controller::get_quarterly_report),
            )
    })
    .bind(&bind_address)?
    .run();

    tracing::info!("Server started at http://{}", bind_address);

    server.await
}
