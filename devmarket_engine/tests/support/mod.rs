#![allow(dead_code)]
//! Test environment helpers shared by the integration tests.
use devmarket_engine::{
    db_types::{Cents, Gig, NewGig, NewUser, User, UserId},
    events::EventProducers,
    ConnectionRegistry,
    MessageDispatcher,
    OrderFlowApi,
    ProfileApi,
    ReviewApi,
    SqliteDatabase,
};
use log::*;
use sqlx::{migrate::MigrateDatabase, Sqlite};

pub fn random_db_path() -> String {
    let dir = std::env::temp_dir();
    format!("sqlite://{}/devmarket_test_{}.db", dir.display(), rand::random::<u64>())
}

/// Creates a fresh, migrated database at a random path.
pub async fn prepare_test_env() -> (String, SqliteDatabase) {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    let url = random_db_path();
    if let Err(e) = Sqlite::drop_database(&url).await {
        trace!("🚀️ Nothing to drop at {url}: {e:?}");
    }
    Sqlite::create_database(&url).await.expect("Error creating database");
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating connection to database");
    db.migrate().await.expect("Error running DB migrations");
    debug!("🚀️ Created test database {url}");
    (url, db)
}

pub async fn teardown(url: &str, mut db: SqliteDatabase) {
    let _ = db.close().await;
    if let Err(e) = Sqlite::drop_database(url).await {
        warn!("🚀️ Could not remove test database {url}: {e:?}");
    }
}

/// A complete engine wired to one database, with no event hooks.
pub struct Market {
    pub url: String,
    pub db: SqliteDatabase,
    pub orders: OrderFlowApi<SqliteDatabase>,
    pub messages: MessageDispatcher<SqliteDatabase>,
    pub reviews: ReviewApi<SqliteDatabase>,
    pub profiles: ProfileApi<SqliteDatabase>,
    pub registry: ConnectionRegistry,
}

impl Market {
    pub async fn new() -> Self {
        Self::with_producers(EventProducers::default()).await
    }

    pub async fn with_producers(producers: EventProducers) -> Self {
        let (url, db) = prepare_test_env().await;
        let registry = ConnectionRegistry::new();
        Self {
            url,
            orders: OrderFlowApi::new(db.clone(), producers),
            messages: MessageDispatcher::new(db.clone(), registry.clone()),
            reviews: ReviewApi::new(db.clone()),
            profiles: ProfileApi::new(db.clone()),
            registry,
            db,
        }
    }

    pub async fn user(&self, name: &str) -> User {
        let profile = NewUser::new(UserId::random(), format!("{name}@example.com"), name.to_string());
        self.profiles.upsert_profile(profile).await.expect("Error creating user")
    }

    pub async fn gig(&self, freelancer: &User, price: i64) -> Gig {
        let gig = NewGig {
            freelancer_id: freelancer.id.clone(),
            title: format!("Work by {}", freelancer.full_name),
            description: "Quality work, delivered on time".to_string(),
            price: Cents::from(price),
            delivery_days: 3,
        };
        self.profiles.publish_gig(gig).await.expect("Error publishing gig")
    }

    pub async fn teardown(self) {
        teardown(&self.url, self.db).await;
    }
}
