pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod store;

use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::store::DrinkStore;

/// Shared application state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: DrinkStore,
    pub verifier: Arc<TokenVerifier>,
}

impl AppState {
    pub fn new(store: DrinkStore, verifier: TokenVerifier) -> Self {
        Self { store, verifier: Arc::new(verifier) }
    }
}
