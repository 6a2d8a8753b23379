use std::sync::Arc;

use crate::auth::{Authenticator, TokenCodec};
use crate::store::{TaskStore, UserStore};

/// Process-wide dependencies, built once at startup and handed to every handler
/// through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub tasks: Arc<dyn TaskStore>,
    pub tokens: Arc<TokenCodec>,
    pub bcrypt_cost: u32,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserStore>,
        tasks: Arc<dyn TaskStore>,
        tokens: TokenCodec,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            users,
            tasks,
            tokens: Arc::new(tokens),
            bcrypt_cost,
        }
    }

    /// Uses one backend for both users and tasks.
    pub fn with_store<S>(store: Arc<S>, tokens: TokenCodec, bcrypt_cost: u32) -> Self
    where
        S: UserStore + TaskStore + 'static,
    {
        Self::new(store.clone(), store, tokens, bcrypt_cost)
    }

    /// Builds the gate for protected scopes from the same token codec and user store.
    pub fn authenticator(&self) -> Authenticator {
        Authenticator::new(self.tokens.clone(), self.users.clone())
    }
}
