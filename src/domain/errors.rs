use thiserror::Error;
use uuid::Uuid;

/// Failures surfaced by the backing store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A concurrent writer changed a product read by this transaction.
    /// The whole transaction was rolled back; nothing was written.
    #[error("conflicting concurrent write")]
    Conflict,
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Closed failure set for cart mutations and the order commit protocol.
///
/// Advisory cart checks and the authoritative commit-time check share the
/// `InsufficientStock` shape so callers can treat both identically.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("not authenticated")]
    NotAuthenticated,
    #[error("cart is empty")]
    EmptyCart,
    #[error("product {0} not found")]
    ProductNotFound(Uuid),
    #[error("insufficient stock for product {product_id}: {}", availability(.available, .requested))]
    InsufficientStock {
        product_id: Uuid,
        available: i32,
        requested: i32,
    },
    #[error("could not commit order: too many concurrent stock updates")]
    CommitConflict,
    #[error(transparent)]
    Store(#[from] StoreError),
}

fn availability(available: &i32, requested: &i32) -> String {
    if *available <= 0 {
        "none available".to_string()
    } else {
        format!("requested {requested}, only {available} available")
    }
}

/// Failures from the identity collaborator.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("email already registered")]
    EmailTaken,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error(transparent)]
    Store(#[from] StoreError),
}
