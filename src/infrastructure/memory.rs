//! In-memory document store with the same trait surface as the Postgres
//! implementation. One mutex guards all documents, so a commit observes and
//! mutates stock in a single critical section: the per-product
//! compare-and-set is trivially linearizable, which is exactly what a
//! self-hosted substitute for the hosted database has to provide.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use bigdecimal::BigDecimal;
use uuid::Uuid;

use crate::domain::checkout::CommitPlan;
use crate::domain::errors::{IdentityError, StoreError};
use crate::domain::order::Order;
use crate::domain::ports::{InventoryStore, OrderStore, UserDirectory};
use crate::domain::product::Product;

struct UserRecord {
    id: Uuid,
    email: String,
    password: String,
}

#[derive(Default)]
struct Inner {
    products: HashMap<Uuid, Product>,
    orders: Vec<Order>,
    users: Vec<UserRecord>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert_product(&self, product: Product) {
        self.lock().products.insert(product.id, product);
    }

    pub fn remove_product(&self, id: Uuid) {
        self.lock().products.remove(&id);
    }

    pub fn set_stock(&self, id: Uuid, stock: i32) {
        if let Some(p) = self.lock().products.get_mut(&id) {
            p.stock = stock;
        }
    }

    pub fn set_price(&self, id: Uuid, price: BigDecimal) {
        if let Some(p) = self.lock().products.get_mut(&id) {
            p.price = price;
        }
    }

    pub fn stock_of(&self, id: Uuid) -> Option<i32> {
        self.lock().products.get(&id).map(|p| p.stock)
    }

    pub fn order_count(&self) -> usize {
        self.lock().orders.len()
    }

    pub fn seed_order(&self, order: Order) {
        self.lock().orders.push(order);
    }
}

impl InventoryStore for MemoryStore {
    fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let mut products: Vec<Product> = self.lock().products.values().cloned().collect();
        products.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(products)
    }

    fn get_product(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        Ok(self.lock().products.get(&id).cloned())
    }

    fn commit_order(&self, plan: &CommitPlan) -> Result<(), StoreError> {
        let mut inner = self.lock();

        // Validate every condition before writing anything: a deleted
        // product or a stock value that moved since the snapshot fails the
        // whole commit with zero partial effects.
        for d in &plan.decrements {
            match inner.products.get(&d.product_id) {
                Some(p) if p.stock == d.expected_stock => {}
                _ => return Err(StoreError::Conflict),
            }
        }

        for d in &plan.decrements {
            if let Some(p) = inner.products.get_mut(&d.product_id) {
                p.stock = d.expected_stock - d.quantity;
            }
        }
        inner.orders.push(plan.order.clone());
        Ok(())
    }
}

impl OrderStore for MemoryStore {
    fn orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>, StoreError> {
        // Insertion order, deliberately unsorted: ordering is the caller's
        // concern per the port contract.
        Ok(self
            .lock()
            .orders
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect())
    }
}

impl UserDirectory for MemoryStore {
    fn register(&self, email: &str, password: &str) -> Result<Uuid, IdentityError> {
        let mut inner = self.lock();
        if inner.users.iter().any(|u| u.email == email) {
            return Err(IdentityError::EmailTaken);
        }
        let id = Uuid::new_v4();
        inner.users.push(UserRecord {
            id,
            email: email.to_string(),
            password: password.to_string(),
        });
        Ok(id)
    }

    fn verify_credentials(&self, email: &str, password: &str) -> Result<Uuid, IdentityError> {
        self.lock()
            .users
            .iter()
            .find(|u| u.email == email && u.password == password)
            .map(|u| u.id)
            .ok_or(IdentityError::InvalidCredentials)
    }
}
