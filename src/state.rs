use std::sync::Arc;

use serde_json::Value;

use crate::auth::password::PasswordHasher;
use crate::config::{AppConfig, HashingConfig};
use crate::db::{self, Datastore, MemoryStore};
use crate::listings::client::{HttpListingsFeed, ListingsFeed, StaticListingsFeed};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Datastore>,
    pub listings: Arc<dyn ListingsFeed>,
    pub hasher: PasswordHasher,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn init(config: AppConfig) -> anyhow::Result<Self> {
        let store = db::connect(&config)?;
        let listings = Arc::new(HttpListingsFeed::new(&config)?) as Arc<dyn ListingsFeed>;
        let hasher = PasswordHasher::new(&config.hashing)?;
        Ok(Self::from_parts(store, listings, hasher, Arc::new(config)))
    }

    pub fn from_parts(
        store: Arc<dyn Datastore>,
        listings: Arc<dyn ListingsFeed>,
        hasher: PasswordHasher,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            store,
            listings,
            hasher,
            config,
        }
    }

    /// State over an in-process store and a canned listings feed, with cheap
    /// hashing parameters. Returns the store so callers can flip readiness.
    pub fn fake(listings: Value) -> anyhow::Result<(Self, Arc<MemoryStore>)> {
        let store = Arc::new(MemoryStore::new());
        let config = AppConfig {
            database_url: db::MEMORY_URL_SCHEME.into(),
            hashing: HashingConfig {
                memory_kib: 64,
                iterations: 1,
                parallelism: 1,
            },
            ..AppConfig::default()
        };
        let hasher = PasswordHasher::new(&config.hashing)?;
        let state = Self::from_parts(
            Arc::clone(&store) as Arc<dyn Datastore>,
            Arc::new(StaticListingsFeed::new(listings)),
            hasher,
            Arc::new(config),
        );
        Ok((state, store))
    }
}
