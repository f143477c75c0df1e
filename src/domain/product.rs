use bigdecimal::BigDecimal;
use uuid::Uuid;

/// Catalog product. `stock` is the only field the commit protocol mutates;
/// it never goes negative because every decrement is conditioned on the
/// value read inside the committing transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub price: BigDecimal,
    pub stock: i32,
}
