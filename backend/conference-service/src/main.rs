/// Conference Service - HTTP Server
///
/// Rooms, join tokens, and the recording lifecycle for the Parley
/// video-conferencing app.
use actix_web::{middleware as actix_middleware, web, App, HttpResponse, HttpServer};
use conference_service::db::PgStore;
use conference_service::egress::HttpEgressClient;
use conference_service::handlers;
use conference_service::middleware::{AuthContext, JwtAuthMiddleware};
use conference_service::services::{RecordingCoordinator, S3ObjectStore};
use conference_service::Config;
use sqlx::postgres::PgPoolOptions;
use std::io;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("config error: {e}")))?;

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("conference-service starting on {}", bind_address);

    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("database error: {e}")))?;

    sqlx::migrate!("../../migrations")
        .run(&db_pool)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("migration error: {e}")))?;

    let objects = S3ObjectStore::connect(&config.s3).await;
    let egress = HttpEgressClient::new(&config.egress, config.s3.clone());
    let coordinator = web::Data::new(RecordingCoordinator::new(
        Arc::new(PgStore::new(db_pool.clone())),
        Arc::new(egress),
        Arc::new(objects),
    ));
    let auth = web::Data::new(AuthContext::new(&config.auth.jwt_secret));
    let config_data = web::Data::new(config);
    let pool_data = web::Data::new(db_pool);

    HttpServer::new(move || {
        App::new()
            .app_data(config_data.clone())
            .app_data(pool_data.clone())
            .app_data(coordinator.clone())
            .app_data(auth.clone())
            .wrap(actix_middleware::Logger::default())
            .route(
                "/api/v1/health",
                web::get()
                    .to(|| async { HttpResponse::Ok().json(serde_json::json!({"status": "ok"})) }),
            )
            .route(
                "/api/v1/health/ready",
                web::get().to(|| async { HttpResponse::Ok().finish() }),
            )
            .route(
                "/api/v1/health/live",
                web::get().to(|| async { HttpResponse::Ok().finish() }),
            )
            // Routes that work with or without a session
            .route("/api/v1/token", web::post().to(handlers::issue_token))
            .route(
                "/api/v1/recording",
                web::post().to(handlers::recording_action),
            )
            .route(
                "/api/v1/recording/{token}/stream",
                web::get().to(handlers::stream_shared),
            )
            // Owner-only routes
            .service(
                web::scope("/api/v1")
                    .wrap(JwtAuthMiddleware)
                    .service(
                        web::scope("/recordings")
                            .route("", web::get().to(handlers::list_recordings))
                            .route("/{id}/stream", web::get().to(handlers::stream_recording))
                            .route("/{id}/download", web::get().to(handlers::download_recording))
                            .route("/{id}/share", web::post().to(handlers::share_recording))
                            .route("/{id}", web::delete().to(handlers::delete_recording)),
                    )
                    .service(
                        web::scope("/rooms")
                            .route("", web::post().to(handlers::create_room))
                            .route("", web::get().to(handlers::list_rooms))
                            .route("/{id}", web::delete().to(handlers::delete_room)),
                    ),
            )
    })
    .bind(&bind_address)?
    .run()
    .await
}
