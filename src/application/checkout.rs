//! Execution half of the order commit protocol: snapshot, plan, and apply,
//! retrying from a fresh snapshot whenever a concurrent commit invalidates
//! the one this attempt was planned against.

use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::cart::Cart;
use crate::domain::checkout::plan_commit;
use crate::domain::errors::{CheckoutError, StoreError};
use crate::domain::order::Order;
use crate::domain::ports::InventoryStore;
use crate::domain::product::Product;

/// Upper bound on snapshot-plan-apply attempts per commit. Exhausting it
/// surfaces as `CommitConflict`; the user owns the decision to try again.
pub const MAX_COMMIT_ATTEMPTS: u32 = 5;

#[derive(Clone)]
pub struct CheckoutService<S> {
    store: S,
}

impl<S: InventoryStore> CheckoutService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Commit `cart` as a new order for `user_id`.
    ///
    /// Preconditions (`NotAuthenticated`, `EmptyCart`) are checked before
    /// the store is touched. Each attempt re-reads every referenced product
    /// and re-freezes prices, so a retried commit reflects post-conflict
    /// stock and pricing. On any failure the cart is left exactly as it
    /// was; the caller clears it only after success.
    pub fn commit(&self, user_id: Option<Uuid>, cart: &Cart) -> Result<Order, CheckoutError> {
        let user_id = user_id.ok_or(CheckoutError::NotAuthenticated)?;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        for attempt in 1..=MAX_COMMIT_ATTEMPTS {
            let snapshot = self.snapshot(cart)?;
            let plan = plan_commit(user_id, cart, &snapshot, Utc::now())?;

            match self.store.commit_order(&plan) {
                Ok(()) => {
                    log::info!(
                        "committed order {} for user {} ({} lines, total {})",
                        plan.order.id,
                        user_id,
                        plan.order.lines.len(),
                        plan.order.total
                    );
                    return Ok(plan.order);
                }
                Err(StoreError::Conflict) => {
                    log::warn!(
                        "order commit attempt {attempt} for user {user_id} lost a stock race, retrying"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(CheckoutError::CommitConflict)
    }

    /// Fresh authoritative reads for every product in the cart. Missing
    /// products are simply absent; the planner reports them as
    /// `ProductNotFound`.
    fn snapshot(&self, cart: &Cart) -> Result<HashMap<Uuid, Product>, CheckoutError> {
        let mut snapshot = HashMap::with_capacity(cart.lines().len());
        for line in cart.lines() {
            if let Some(product) = self.store.get_product(line.product_id)? {
                snapshot.insert(product.id, product);
            }
        }
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::thread;

    use bigdecimal::BigDecimal;

    use super::*;
    use crate::domain::checkout::CommitPlan;
    use crate::infrastructure::memory::MemoryStore;

    fn product(stock: i32, price: &str) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: "Widget".to_string(),
            description: String::new(),
            image_url: String::new(),
            price: BigDecimal::from_str(price).expect("valid decimal"),
            stock,
        }
    }

    fn cart_with(store: &MemoryStore, product_id: Uuid, quantity: i32) -> Cart {
        let p = store
            .get_product(product_id)
            .expect("read")
            .expect("product exists");
        let mut cart = Cart::new();
        cart.add_line(&p, quantity).expect("advisory check");
        cart
    }

    #[test]
    fn missing_user_fails_before_touching_the_store() {
        let store = MemoryStore::new();
        let service = CheckoutService::new(store.clone());

        let err = service.commit(None, &Cart::new()).expect_err("no user");
        assert!(matches!(err, CheckoutError::NotAuthenticated));
    }

    #[test]
    fn empty_cart_fails_and_writes_nothing() {
        let store = MemoryStore::new();
        let p = product(3, "1.00");
        store.insert_product(p.clone());
        let service = CheckoutService::new(store.clone());

        let err = service
            .commit(Some(Uuid::new_v4()), &Cart::new())
            .expect_err("empty cart");
        assert!(matches!(err, CheckoutError::EmptyCart));
        assert_eq!(store.order_count(), 0);
        assert_eq!(store.stock_of(p.id), Some(3));
    }

    #[test]
    fn successful_commit_decrements_stock_and_records_the_order() {
        let store = MemoryStore::new();
        let p = product(5, "2.50");
        store.insert_product(p.clone());
        let service = CheckoutService::new(store.clone());
        let user_id = Uuid::new_v4();

        let order = service
            .commit(Some(user_id), &cart_with(&store, p.id, 2))
            .expect("commit");

        assert_eq!(order.user_id, user_id);
        assert_eq!(order.total, BigDecimal::from_str("5.00").unwrap());
        assert_eq!(store.stock_of(p.id), Some(3));
        assert_eq!(store.order_count(), 1);
    }

    #[test]
    fn failed_validation_leaves_the_store_unchanged() {
        let store = MemoryStore::new();
        let ok = product(5, "1.00");
        let scarce = product(5, "1.00");
        store.insert_product(ok.clone());
        store.insert_product(scarce.clone());
        let service = CheckoutService::new(store.clone());

        let mut cart = Cart::new();
        cart.add_line(&ok, 2).expect("add");
        cart.add_line(&scarce, 4).expect("add");
        // Another shopper drains the scarce product before this commit.
        store.set_stock(scarce.id, 1);

        let err = service
            .commit(Some(Uuid::new_v4()), &cart)
            .expect_err("shortfall");
        assert!(matches!(
            err,
            CheckoutError::InsufficientStock {
                available: 1,
                requested: 4,
                ..
            }
        ));
        // Atomicity: neither product was touched and no order exists.
        assert_eq!(store.stock_of(ok.id), Some(5));
        assert_eq!(store.stock_of(scarce.id), Some(1));
        assert_eq!(store.order_count(), 0);
    }

    #[test]
    fn two_carts_racing_for_three_units() {
        let store = MemoryStore::new();
        let p = product(3, "10.00");
        store.insert_product(p.clone());
        let service = CheckoutService::new(store.clone());

        // Both advisory checks pass: neither cart sees the other.
        let cart_a = cart_with(&store, p.id, 2);
        let cart_b = cart_with(&store, p.id, 2);

        let order_a = service
            .commit(Some(Uuid::new_v4()), &cart_a)
            .expect("first commit wins");
        assert_eq!(order_a.total, BigDecimal::from_str("20.00").unwrap());
        assert_eq!(store.stock_of(p.id), Some(1));

        let err = service
            .commit(Some(Uuid::new_v4()), &cart_b)
            .expect_err("second commit loses");
        assert!(matches!(
            err,
            CheckoutError::InsufficientStock {
                product_id,
                available: 1,
                requested: 2,
            } if product_id == p.id
        ));
        // The loser's failure changed nothing.
        assert_eq!(store.stock_of(p.id), Some(1));
        assert_eq!(store.order_count(), 1);
    }

    #[test]
    fn concurrent_commits_never_oversell() {
        let store = MemoryStore::new();
        let p = product(5, "1.00");
        store.insert_product(p.clone());

        let successes = Arc::new(AtomicU32::new(0));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                let successes = Arc::clone(&successes);
                let product_id = p.id;
                thread::spawn(move || {
                    let service = CheckoutService::new(store.clone());
                    let cart = cart_with(&store, product_id, 1);
                    match service.commit(Some(Uuid::new_v4()), &cart) {
                        Ok(_) => {
                            successes.fetch_add(1, Ordering::SeqCst);
                        }
                        Err(
                            CheckoutError::InsufficientStock { .. }
                            | CheckoutError::CommitConflict,
                        ) => {}
                        Err(other) => panic!("unexpected failure: {other:?}"),
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("thread");
        }

        let committed = successes.load(Ordering::SeqCst) as i32;
        assert!(committed <= 5, "oversold: {committed} units of 5");
        assert_eq!(store.stock_of(p.id), Some(5 - committed));
        assert_eq!(store.order_count(), committed as usize);
    }

    // Store wrapper that loses the stock race a fixed number of times before
    // delegating, to drive the retry loop deterministically.
    #[derive(Clone)]
    struct ContendedStore {
        inner: MemoryStore,
        conflicts_left: Arc<AtomicU32>,
    }

    impl InventoryStore for ContendedStore {
        fn list_products(&self) -> Result<Vec<Product>, StoreError> {
            self.inner.list_products()
        }

        fn get_product(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
            self.inner.get_product(id)
        }

        fn commit_order(&self, plan: &CommitPlan) -> Result<(), StoreError> {
            if self
                .conflicts_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(StoreError::Conflict);
            }
            self.inner.commit_order(plan)
        }
    }

    #[test]
    fn transient_conflicts_are_retried_to_success() {
        let inner = MemoryStore::new();
        let p = product(5, "1.00");
        inner.insert_product(p.clone());
        let store = ContendedStore {
            inner: inner.clone(),
            conflicts_left: Arc::new(AtomicU32::new(MAX_COMMIT_ATTEMPTS - 1)),
        };
        let service = CheckoutService::new(store);

        let mut cart = Cart::new();
        cart.add_line(&p, 2).expect("add");
        service
            .commit(Some(Uuid::new_v4()), &cart)
            .expect("succeeds on the last attempt");
        assert_eq!(inner.stock_of(p.id), Some(3));
    }

    #[test]
    fn exhausted_retries_surface_as_commit_conflict() {
        let inner = MemoryStore::new();
        let p = product(5, "1.00");
        inner.insert_product(p.clone());
        let store = ContendedStore {
            inner: inner.clone(),
            conflicts_left: Arc::new(AtomicU32::new(u32::MAX)),
        };
        let service = CheckoutService::new(store);

        let mut cart = Cart::new();
        cart.add_line(&p, 2).expect("add");
        let err = service
            .commit(Some(Uuid::new_v4()), &cart)
            .expect_err("never converges");
        assert!(matches!(err, CheckoutError::CommitConflict));
        assert_eq!(inner.stock_of(p.id), Some(5));
        assert_eq!(inner.order_count(), 0);
    }
}
