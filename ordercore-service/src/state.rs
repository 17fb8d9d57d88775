//! Shared application state and the session token registry.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use ordercore::accounts::AccountService;
use ordercore::cart::CartService;
use ordercore::catalog::CatalogService;
use ordercore::domain::{Role, User};
use ordercore::engine::PlacementEngine;
use ordercore::lifecycle::LifecycleManager;
use ordercore::store::ShopStore;
use ordercore::types::UserId;
use rand::RngCore;

/// The authenticated caller attached to a request.
#[derive(Debug, Clone, Copy)]
pub struct Identity {
    /// The calling user.
    pub user_id: UserId,
    /// The caller's role, resolved at login.
    pub role: Role,
}

/// In-memory registry of bearer tokens issued at login.
///
/// Tokens are opaque random strings; the registry maps them back to the
/// identity they were issued for. Restarting the service invalidates all
/// sessions, which is acceptable for this deployment shape.
#[derive(Debug, Default)]
pub struct SessionTokens {
    tokens: RwLock<HashMap<String, Identity>>,
}

impl SessionTokens {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh token for a user.
    pub fn issue(&self, user: &User) -> String {
        let mut bytes = [0u8; 24];
        rand::rng().fill_bytes(&mut bytes);
        let token: String = bytes.iter().map(|b| format!("{b:02x}")).collect();

        let identity = Identity {
            user_id: user.id,
            role: user.role,
        };
        self.tokens
            .write()
            .expect("RwLock poisoned")
            .insert(token.clone(), identity);
        token
    }

    /// Resolve a bearer token back to its identity.
    pub fn resolve(&self, token: &str) -> Option<Identity> {
        self.tokens
            .read()
            .expect("RwLock poisoned")
            .get(token)
            .copied()
    }
}

/// Application state shared by every handler.
///
/// Generic over the store backend so the same router serves the in-memory
/// store in tests and development and postgres in production.
#[derive(Debug)]
pub struct AppState<S> {
    /// The storage backend.
    pub store: Arc<S>,
    /// Order placement engine.
    pub engine: PlacementEngine<S>,
    /// Order lifecycle manager.
    pub lifecycle: LifecycleManager<S>,
    /// Catalog service.
    pub catalog: CatalogService<S>,
    /// Cart service.
    pub cart: CartService<S>,
    /// Account service.
    pub accounts: AccountService<S>,
    /// Session token registry.
    pub sessions: Arc<SessionTokens>,
}

impl<S: ShopStore> AppState<S> {
    /// Wire the full service stack over one store.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            engine: PlacementEngine::new(store.clone()),
            lifecycle: LifecycleManager::new(store.clone()),
            catalog: CatalogService::new(store.clone()),
            cart: CartService::new(store.clone()),
            accounts: AccountService::new(store.clone()),
            sessions: Arc::new(SessionTokens::new()),
            store,
        }
    }
}

// Manual impl: `S` itself need not be Clone, only the Arcs are cloned.
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            engine: self.engine.clone(),
            lifecycle: self.lifecycle.clone(),
            catalog: self.catalog.clone(),
            cart: self.cart.clone(),
            accounts: self.accounts.clone(),
            sessions: self.sessions.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordercore::domain::PasswordCredential;
    use ordercore::types::{EmailAddress, PersonName, PhoneNumber};

    fn user() -> User {
        User::new(
            PersonName::try_new("Maya Iyer").unwrap(),
            EmailAddress::try_new("maya@example.com").unwrap(),
            PhoneNumber::try_new("+919876543210").unwrap(),
            PasswordCredential {
                salt: "00".to_string(),
                hash: "00".to_string(),
            },
            Vec::new(),
        )
    }

    #[test]
    fn issued_tokens_resolve_to_their_identity() {
        let sessions = SessionTokens::new();
        let user = user();
        let token = sessions.issue(&user);

        let identity = sessions.resolve(&token).unwrap();
        assert_eq!(identity.user_id, user.id);
        assert_eq!(identity.role, Role::Customer);
    }

    #[test]
    fn unknown_tokens_do_not_resolve() {
        let sessions = SessionTokens::new();
        assert!(sessions.resolve("deadbeef").is_none());
    }

    #[test]
    fn tokens_are_unique_per_issue() {
        let sessions = SessionTokens::new();
        let user = user();
        assert_ne!(sessions.issue(&user), sessions.issue(&user));
    }
}
