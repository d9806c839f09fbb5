use std::sync::Arc;

use blossom_db::Database;

use crate::config::{Config, GoogleConfig};
use crate::repository::{CategoryRepository, FlowerRepository, UserRepository};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub flowers: FlowerRepository,
    pub categories: CategoryRepository,
    pub users: UserRepository,
    pub jwt_secret: String,
    pub google: Option<GoogleConfig>,
    /// Outbound client for the Google token and userinfo endpoints.
    pub http: reqwest::Client,
}

impl AppStateInner {
    pub fn new(db: Database, config: &Config) -> AppState {
        let db = Arc::new(db);
        let categories = CategoryRepository::new(db.clone());

        Arc::new(Self {
            flowers: FlowerRepository::new(db.clone(), categories.clone()),
            categories,
            users: UserRepository::new(db),
            jwt_secret: config.jwt_secret.clone(),
            google: config.google.clone(),
            http: reqwest::Client::new(),
        })
    }
}
