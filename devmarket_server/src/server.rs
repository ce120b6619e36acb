use std::{path::Path, time::Duration};

use actix_web::{
    dev::Server,
    error::JsonPayloadError,
    http::KeepAlive,
    middleware::Logger,
    web,
    App,
    HttpRequest,
    HttpServer,
};
use devmarket_engine::{
    events::{EventHandlers, EventHooks, EventProducers, OrderEventNotifier},
    ConnectionRegistry,
    MessageDispatcher,
    OrderFlowApi,
    ProfileApi,
    ReviewApi,
    SqliteDatabase,
};
use log::*;

use crate::{
    auth::TokenVerifier,
    config::ServerConfig,
    errors::ServerError,
    routes::{
        health,
        ApproveWorkRoute,
        ConfirmPaymentRoute,
        ConversationRoute,
        CreateOrderRoute,
        CreateReviewRoute,
        MyOrdersRoute,
        MyProfileRoute,
        OrderByIdRoute,
        PaymentProofRoute,
        RequestRevisionRoute,
        ReviewsForUserRoute,
        SendMessageRoute,
        StartWorkRoute,
        SubmitPaymentRoute,
        SubmitWorkRoute,
        UpdateMyProfileRoute,
    },
    ws::LiveUpdatesRoute,
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    ensure_database_directory(&config.database_url);
    let db = SqliteDatabase::new_with_url(&config.database_url, config.max_db_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    if config.run_migrations {
        db.migrate().await.map_err(|e| ServerError::InitializeError(format!("Migrations failed. {e}")))?;
    }
    let registry = ConnectionRegistry::new();
    let mut hooks = EventHooks::default();
    if config.order_notifications {
        OrderEventNotifier::new(registry.clone()).attach(&mut hooks);
    }
    let handlers = EventHandlers::new(config.event_buffer_size, hooks);
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let srv = create_server_instance(config, db, registry, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// SQLite creates the database file on demand, but not the directory it lives in.
fn ensure_database_directory(url: &str) {
    let Some(path) = url.strip_prefix("sqlite://") else { return };
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() || path.starts_with(":memory:") {
        return;
    }
    if let Some(dir) = Path::new(path).parent().filter(|d| !d.as_os_str().is_empty() && !d.exists()) {
        match std::fs::create_dir_all(dir) {
            Ok(()) => info!("🗃️ Created database directory {}", dir.display()),
            Err(e) => warn!("🗃️ Could not create database directory {}. {e}", dir.display()),
        }
    }
}

/// Maps malformed JSON bodies onto the same `{"error": ...}` responses every other failure uses.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
        debug!("💻️ Rejected request body. {err}");
        ServerError::InvalidRequestBody(err.to_string()).into()
    })
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    registry: ConnectionRegistry,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone(), producers.clone());
        let messages_api = MessageDispatcher::new(db.clone(), registry.clone());
        let reviews_api = ReviewApi::new(db.clone());
        let profile_api = ProfileApi::new(db.clone());
        let verifier = TokenVerifier::new(&config.auth);
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("dm::access_log"))
            .app_data(json_config())
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(messages_api))
            .app_data(web::Data::new(reviews_api))
            .app_data(web::Data::new(profile_api))
            .app_data(web::Data::new(verifier));
        // Routes that require authentication
        let api_scope = web::scope("/api")
            .service(MyProfileRoute::<SqliteDatabase>::new())
            .service(UpdateMyProfileRoute::<SqliteDatabase>::new())
            .service(CreateOrderRoute::<SqliteDatabase>::new())
            .service(MyOrdersRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
            .service(PaymentProofRoute::<SqliteDatabase>::new())
            .service(SubmitPaymentRoute::<SqliteDatabase>::new())
            .service(ConfirmPaymentRoute::<SqliteDatabase>::new())
            .service(StartWorkRoute::<SqliteDatabase>::new())
            .service(SubmitWorkRoute::<SqliteDatabase>::new())
            .service(ApproveWorkRoute::<SqliteDatabase>::new())
            .service(RequestRevisionRoute::<SqliteDatabase>::new())
            .service(SendMessageRoute::<SqliteDatabase>::new())
            .service(ConversationRoute::<SqliteDatabase>::new())
            .service(CreateReviewRoute::<SqliteDatabase>::new())
            .service(ReviewsForUserRoute::<SqliteDatabase>::new());
        app.service(health).service(LiveUpdatesRoute::<SqliteDatabase>::new()).service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
