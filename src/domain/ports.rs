use uuid::Uuid;

use super::checkout::CommitPlan;
use super::errors::{IdentityError, StoreError};
use super::order::Order;
use super::product::Product;

/// Inventory collaborator: point reads plus the one transactional write the
/// commit protocol depends on.
pub trait InventoryStore: Send + Sync + 'static {
    fn list_products(&self) -> Result<Vec<Product>, StoreError>;

    fn get_product(&self, id: Uuid) -> Result<Option<Product>, StoreError>;

    /// Atomically insert the planned order and apply every stock decrement,
    /// each conditioned on the product's stock still matching the plan's
    /// snapshot. Any failed condition rolls the whole transaction back and
    /// surfaces as `StoreError::Conflict` with zero partial writes.
    fn commit_order(&self, plan: &CommitPlan) -> Result<(), StoreError>;
}

/// Append-only order collection.
pub trait OrderStore: Send + Sync + 'static {
    /// Orders owned by `user_id`, in no guaranteed order; callers that need
    /// newest-first apply their own deterministic sort.
    fn orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>, StoreError>;
}

/// Identity collaborator. Credential verification is deliberately opaque so
/// the storage scheme can change without touching the rest of the service.
pub trait UserDirectory: Send + Sync + 'static {
    fn register(&self, email: &str, password: &str) -> Result<Uuid, IdentityError>;

    fn verify_credentials(&self, email: &str, password: &str) -> Result<Uuid, IdentityError>;
}

/// Everything the HTTP surface needs from one backing store.
pub trait StorefrontStore: InventoryStore + OrderStore + UserDirectory + Clone {}

impl<T> StorefrontStore for T where T: InventoryStore + OrderStore + UserDirectory + Clone {}
