pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod rest;
pub mod services;
pub mod store;

use sqlx::sqlite::SqlitePool;

use crate::auth::TokenService;
use crate::config::Config;
use crate::services::{AuthService, IngestService};
use crate::store::{DocumentRepo, UserRepo};

pub use rest::router;

/// Everything a request handler can reach. The pool is shared; the flows
/// hold their own handles to it.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub tokens: TokenService,
    pub auth: AuthService,
    pub documents: IngestService,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(db: SqlitePool, config: &Config) -> Self {
        let tokens = TokenService::new(config.jwt_secret.as_bytes(), config.token_ttl);
        Self {
            auth: AuthService::new(UserRepo::new(db.clone()), tokens.clone()),
            documents: IngestService::new(DocumentRepo::new(db.clone())),
            tokens,
            db,
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}
