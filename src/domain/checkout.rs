//! Planning half of the order commit protocol.
//!
//! A commit attempt is split in two: `plan_commit` (pure) validates a fresh
//! stock snapshot and freezes the order, and the store port executes the
//! resulting [`CommitPlan`] atomically, conditioning every stock write on
//! the snapshot still being current. A concurrent writer invalidating any
//! condition aborts the whole transaction, and the caller re-plans from a
//! new snapshot.

use std::collections::HashMap;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::cart::Cart;
use super::errors::CheckoutError;
use super::order::{Order, OrderLine, OrderStatus};
use super::product::Product;

/// Compare-and-set stock write: `stock = expected_stock - quantity`,
/// valid only while `stock == expected_stock` still holds.
#[derive(Debug, Clone, PartialEq)]
pub struct StockDecrement {
    pub product_id: Uuid,
    pub expected_stock: i32,
    pub quantity: i32,
}

/// Everything a single commit attempt writes: one order plus one
/// conditional decrement per line. Applied all-or-nothing by the store.
#[derive(Debug, Clone)]
pub struct CommitPlan {
    pub order: Order,
    pub decrements: Vec<StockDecrement>,
}

/// Validate the cart against `snapshot` (fresh reads, keyed by product id)
/// and build the plan for this attempt.
///
/// Fails with `ProductNotFound` for any line whose product is missing from
/// the snapshot, or `InsufficientStock` for the first line whose quantity
/// exceeds current stock. Line prices and the total are frozen from the
/// snapshot's current prices, not from the cart's add-time display copies.
pub fn plan_commit(
    user_id: Uuid,
    cart: &Cart,
    snapshot: &HashMap<Uuid, Product>,
    now: DateTime<Utc>,
) -> Result<CommitPlan, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let mut lines = Vec::with_capacity(cart.lines().len());
    let mut decrements = Vec::with_capacity(cart.lines().len());
    let mut total = BigDecimal::from(0);

    for cart_line in cart.lines() {
        let product = snapshot
            .get(&cart_line.product_id)
            .ok_or(CheckoutError::ProductNotFound(cart_line.product_id))?;

        if cart_line.quantity > product.stock {
            return Err(CheckoutError::InsufficientStock {
                product_id: product.id,
                available: product.stock,
                requested: cart_line.quantity,
            });
        }

        total += product.price.clone() * BigDecimal::from(cart_line.quantity);
        lines.push(OrderLine {
            product_id: product.id,
            name: product.name.clone(),
            quantity: cart_line.quantity,
            unit_price: product.price.clone(),
        });
        decrements.push(StockDecrement {
            product_id: product.id,
            expected_stock: product.stock,
            quantity: cart_line.quantity,
        });
    }

    Ok(CommitPlan {
        order: Order {
            id: Uuid::new_v4(),
            user_id,
            status: OrderStatus::Pending,
            lines,
            total,
            created_at: now,
        },
        decrements,
    })
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

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

    fn snapshot_of(products: &[Product]) -> HashMap<Uuid, Product> {
        products.iter().cloned().map(|p| (p.id, p)).collect()
    }

    #[test]
    fn empty_cart_is_rejected_before_any_validation() {
        let err = plan_commit(Uuid::new_v4(), &Cart::new(), &HashMap::new(), Utc::now())
            .expect_err("empty cart");
        assert!(matches!(err, CheckoutError::EmptyCart));
    }

    #[test]
    fn missing_product_fails_the_whole_plan() {
        let p = product(5, "1.00");
        let mut cart = Cart::new();
        cart.add_line(&p, 1).expect("add");

        let err = plan_commit(Uuid::new_v4(), &cart, &HashMap::new(), Utc::now())
            .expect_err("product gone");
        assert!(matches!(err, CheckoutError::ProductNotFound(id) if id == p.id));
    }

    #[test]
    fn insufficient_stock_carries_current_availability() {
        let mut p = product(5, "1.00");
        let mut cart = Cart::new();
        cart.add_line(&p, 4).expect("add");

        // Stock dropped between the advisory check and this attempt.
        p.stock = 1;
        let err = plan_commit(Uuid::new_v4(), &cart, &snapshot_of(&[p.clone()]), Utc::now())
            .expect_err("stale cart");
        assert!(matches!(
            err,
            CheckoutError::InsufficientStock {
                product_id,
                available: 1,
                requested: 4,
            } if product_id == p.id
        ));
    }

    #[test]
    fn plan_freezes_current_prices_not_cart_prices() {
        let mut p = product(10, "2.00");
        let mut cart = Cart::new();
        cart.add_line(&p, 3).expect("add");

        // Price changed after the line was added; the plan must use the
        // fresh price for both the line and the total.
        p.price = BigDecimal::from_str("3.00").unwrap();
        let user_id = Uuid::new_v4();
        let plan = plan_commit(user_id, &cart, &snapshot_of(&[p.clone()]), Utc::now())
            .expect("plan");

        assert_eq!(plan.order.user_id, user_id);
        assert_eq!(plan.order.status, OrderStatus::Pending);
        assert_eq!(plan.order.lines.len(), 1);
        assert_eq!(
            plan.order.lines[0].unit_price,
            BigDecimal::from_str("3.00").unwrap()
        );
        assert_eq!(plan.order.total, BigDecimal::from_str("9.00").unwrap());
    }

    #[test]
    fn decrements_capture_the_snapshot_stock() {
        let a = product(5, "1.00");
        let b = product(7, "2.00");
        let mut cart = Cart::new();
        cart.add_line(&a, 2).expect("add a");
        cart.add_line(&b, 7).expect("add b");

        let plan = plan_commit(
            Uuid::new_v4(),
            &cart,
            &snapshot_of(&[a.clone(), b.clone()]),
            Utc::now(),
        )
        .expect("plan");

        assert_eq!(
            plan.decrements,
            vec![
                StockDecrement {
                    product_id: a.id,
                    expected_stock: 5,
                    quantity: 2,
                },
                StockDecrement {
                    product_id: b.id,
                    expected_stock: 7,
                    quantity: 7,
                },
            ]
        );
    }
}
