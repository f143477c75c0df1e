use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use uuid::Uuid;

use crate::domain::cart::Cart;

/// One logged-in shopper: their identity plus their in-memory cart. The
/// cart exists only here until a successful checkout persists it as an
/// order.
#[derive(Debug)]
pub struct Session {
    pub user_id: Uuid,
    pub cart: Cart,
}

/// Explicitly owned session registry keyed by opaque tokens; handlers
/// resolve the `X-Session-Token` header through this instead of any
/// process-wide singleton.
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session for `user_id` with an empty cart; returns the token.
    pub fn open(&self, user_id: Uuid) -> Uuid {
        let token = Uuid::new_v4();
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                token,
                Session {
                    user_id,
                    cart: Cart::new(),
                },
            );
        token
    }

    /// Drop the session for `token`; unknown tokens are a no-op.
    pub fn close(&self, token: Uuid) {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&token);
    }

    /// Run `f` against the session for `token`, if any.
    pub fn with_session<T>(&self, token: Uuid, f: impl FnOnce(&mut Session) -> T) -> Option<T> {
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        sessions.get_mut(&token).map(f)
    }

    /// Clear the cart for `token` only if it still equals `snapshot`. Lines
    /// added while the snapshot was being committed are kept.
    pub fn clear_cart_if_unchanged(&self, token: Uuid, snapshot: &Cart) {
        let _ = self.with_session(token, |s| {
            if s.cart == *snapshot {
                s.cart.clear();
            }
        });
    }
}
