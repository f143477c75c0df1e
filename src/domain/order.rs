use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Frozen snapshot of one cart line at commit time. Later price or catalog
/// changes on the product never alter a committed line.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub product_id: Uuid,
    pub name: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

/// Order lifecycle state. Fulfillment transitions are out of scope, so the
/// commit protocol only ever produces `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            _ => None,
        }
    }
}

/// A committed order: created exactly once by the commit protocol, never
/// mutated or deleted afterwards. `created_at` is the sole history sort key.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: OrderStatus,
    pub lines: Vec<OrderLine>,
    pub total: BigDecimal,
    pub created_at: DateTime<Utc>,
}
