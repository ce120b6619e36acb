use std::collections::HashMap;

use cucumber::World;
use devmarket_engine::{
    db_types::{GigId, NewUser, Order, OrderId, UserId},
    events::{EventHandlers, EventHooks, OrderEventNotifier},
    traits::{MessagingError, OrderFlowError},
    ConnectionRegistry,
    MessageDispatcher,
    OrderFlowApi,
    ProfileApi,
    SqliteDatabase,
};
use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};
use tokio::sync::mpsc::UnboundedReceiver;

#[derive(Default, Debug, World)]
pub struct MarketWorld {
    pub system: Option<MarketSystem>,
}

#[derive(Debug)]
pub struct MarketSystem {
    pub db_path: String,
    pub db: SqliteDatabase,
    pub orders: OrderFlowApi<SqliteDatabase>,
    pub messages: MessageDispatcher<SqliteDatabase>,
    pub profiles: ProfileApi<SqliteDatabase>,
    pub registry: ConnectionRegistry,
    pub users: HashMap<String, UserId>,
    pub gigs: HashMap<String, GigId>,
    pub outboxes: HashMap<String, UnboundedReceiver<String>>,
    pub current_order: Option<OrderId>,
    pub last_result: Option<Result<Order, OrderFlowError>>,
    pub last_message_error: Option<MessagingError>,
}

impl MarketWorld {
    pub fn system(&mut self) -> &mut MarketSystem {
        self.system.as_mut().expect("Marketplace not initialised")
    }
}

impl MarketSystem {
    pub async fn new() -> Self {
        let db_path = format!("sqlite://{}/devmarket_bdd_{}.db", std::env::temp_dir().display(), rand::random::<u64>());
        Sqlite::create_database(&db_path).await.expect("Error creating database");
        let db = SqliteDatabase::new_with_url(&db_path, 5).await.expect("Error creating connection to database");
        db.migrate().await.expect("Error running DB migrations");
        debug!("🚀️ Created database: {db_path}");
        let registry = ConnectionRegistry::new();
        let mut hooks = EventHooks::default();
        OrderEventNotifier::new(registry.clone()).attach(&mut hooks);
        let handlers = EventHandlers::new(16, hooks);
        let producers = handlers.producers();
        handlers.start_handlers().await;
        Self {
            orders: OrderFlowApi::new(db.clone(), producers),
            messages: MessageDispatcher::new(db.clone(), registry.clone()),
            profiles: ProfileApi::new(db.clone()),
            registry,
            db_path,
            db,
            users: HashMap::new(),
            gigs: HashMap::new(),
            outboxes: HashMap::new(),
            current_order: None,
            last_result: None,
            last_message_error: None,
        }
    }

    pub async fn add_user(&mut self, name: &str) -> UserId {
        let id = UserId::random();
        let profile = NewUser::new(id.clone(), format!("{name}@example.com"), name.to_string());
        self.profiles.upsert_profile(profile).await.expect("Error creating user");
        self.users.insert(name.to_string(), id.clone());
        id
    }

    pub fn user(&self, name: &str) -> UserId {
        self.users.get(name).cloned().unwrap_or_else(|| panic!("Unknown user {name}"))
    }

    pub fn order_id(&self) -> OrderId {
        self.current_order.clone().expect("No order has been placed")
    }
}
