use bigdecimal::BigDecimal;
use uuid::Uuid;

use super::errors::CheckoutError;
use super::product::Product;

/// One cart entry. Name, price and image are a display snapshot taken when
/// the line was added; the commit protocol re-reads price at commit time.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub product_id: Uuid,
    pub name: String,
    pub unit_price: BigDecimal,
    pub image_url: String,
    pub quantity: i32,
}

/// In-memory, per-session cart. At most one line per product.
///
/// Every stock argument taken here is a fresh read supplied by the caller,
/// and every check is advisory: it cuts down wasted commit attempts but the
/// only authoritative validation happens inside the commit transaction.
/// A failed check never mutates the cart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Quantity already in the cart for `product_id`, 0 if absent.
    pub fn quantity_of(&self, product_id: Uuid) -> i32 {
        self.lines
            .iter()
            .find(|l| l.product_id == product_id)
            .map(|l| l.quantity)
            .unwrap_or(0)
    }

    /// Add `quantity` units of `product`, merging into an existing line.
    ///
    /// Fails with `InsufficientStock` when the combined quantity exceeds the
    /// stock observed on `product`; `available` reports how many more units
    /// could still be added (0 means none).
    pub fn add_line(&mut self, product: &Product, quantity: i32) -> Result<(), CheckoutError> {
        let existing = self.quantity_of(product.id);
        // A combined quantity that overflows i32 cannot fit in any stock
        // level either, so it reports the same shortfall.
        let combined = match existing.checked_add(quantity) {
            Some(total) if total <= product.stock => total,
            _ => {
                return Err(CheckoutError::InsufficientStock {
                    product_id: product.id,
                    available: (product.stock - existing).max(0),
                    requested: quantity,
                });
            }
        };

        match self.lines.iter_mut().find(|l| l.product_id == product.id) {
            Some(line) => line.quantity = combined,
            None => self.lines.push(CartLine {
                product_id: product.id,
                name: product.name.clone(),
                unit_price: product.price.clone(),
                image_url: product.image_url.clone(),
                quantity,
            }),
        }
        Ok(())
    }

    /// Overwrite (not add to) the quantity of an existing line.
    ///
    /// Quantities of zero or less are handled by the caller as removal.
    /// Setting the quantity of a line that is not in the cart is a no-op.
    pub fn set_quantity(&mut self, product: &Product, new_quantity: i32) -> Result<(), CheckoutError> {
        if new_quantity > product.stock {
            return Err(CheckoutError::InsufficientStock {
                product_id: product.id,
                available: product.stock.max(0),
                requested: new_quantity,
            });
        }
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            line.quantity = new_quantity;
        }
        Ok(())
    }

    /// Remove the line for `product_id`. Never fails; absent line is a no-op.
    pub fn remove_line(&mut self, product_id: Uuid) {
        self.lines.retain(|l| l.product_id != product_id);
    }

    /// Sum of `unit_price * quantity` over all lines. Pure, no I/O.
    pub fn total(&self) -> BigDecimal {
        self.lines.iter().fold(BigDecimal::from(0), |acc, l| {
            acc + l.unit_price.clone() * BigDecimal::from(l.quantity)
        })
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
