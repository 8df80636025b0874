//! Main entry point for the SmartBank backend.
//!
//! Sets up the Actix Web server, configures the auth, KYC, and fraud route
//! groups, and initializes shared application state (database pool, JWT config,
//! anomaly model, alert mailer). Uses dotenv for config, runs the one-time
//! schema bootstrap, and launches the async runtime with tracing.

use actix_web::{App, HttpServer, middleware::Logger, web};
use dotenv::dotenv;
use smartbank_server::{
    AppState, RequestLoggingMiddleware, db, get_subscriber, handlers, init_subscriber,
};
use tracing_actix_web::TracingLogger;

/// Main entry point. Configures and runs the Actix Web server.
///
/// - Loads environment variables from `.env`.
/// - Initializes tracing.
/// - Connects to the Postgres database and creates tables on first boot.
/// - Loads or trains the anomaly-detection model.
/// - Registers all routes with middleware.
/// - Launches the async server runtime.
#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    let subscriber = get_subscriber("smartbank".to_string(), "info".to_string(), std::io::stdout);
    init_subscriber(subscriber);

    // Initialize application state
    let app_state = AppState::new().await.expect("failed to init app_state");

    // One-time schema bootstrap before accepting requests
    db::init_db(app_state.db.as_ref())
        .await
        .expect("failed to initialize database schema");

    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(TracingLogger::default())
            .wrap(Logger::default())
            .wrap(RequestLoggingMiddleware::new())
            .route("/", web::get().to(handlers::health::home))
            .route("/health", web::get().to(handlers::health::health_check))
            .configure(handlers::auth::configure_auth_routes)
            .configure(handlers::kyc::configure_kyc_routes)
            .configure(handlers::fraud::configure_fraud_routes)
    })
    .bind(("127.0.0.1", 8080))?
    .run();

    let srv_handle = server.handle();

    let server_task = tokio::spawn(server);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Shutdown signal received");
            // Gracefully stop the server
            srv_handle.stop(true).await;
        }
        res = server_task => {
            if let Err(e) = res {
                tracing::error!("Server task failed: {}", e);
            }
        }
    }

    Ok(())
}
