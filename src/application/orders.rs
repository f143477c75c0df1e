use uuid::Uuid;

use crate::domain::errors::StoreError;
use crate::domain::order::Order;
use crate::domain::ports::OrderStore;

#[derive(Clone)]
pub struct OrderHistoryService<S> {
    store: S,
}

impl<S: OrderStore> OrderHistoryService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Order history for `user_id`, newest first.
    ///
    /// The store makes no ordering promise (a backing index may not exist
    /// yet), so the sort always happens here: `created_at` descending with
    /// the order id as tiebreaker, giving every call an identical,
    /// deterministic ordering regardless of how the backend returned rows.
    pub fn for_user(&self, user_id: Uuid) -> Result<Vec<Order>, StoreError> {
        let mut orders = self.store.orders_for_user(user_id)?;
        orders.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(orders)
    }
}

#[cfg(test)]
mod tests {
    use bigdecimal::BigDecimal;
    use chrono::{Duration, Utc};

    use super::*;
    use crate::domain::order::OrderStatus;
    use crate::infrastructure::memory::MemoryStore;

    fn order_at(user_id: Uuid, created_at: chrono::DateTime<Utc>) -> Order {
        Order {
            id: Uuid::new_v4(),
            user_id,
            status: OrderStatus::Pending,
            lines: vec![],
            total: BigDecimal::from(0),
            created_at,
        }
    }

    #[test]
    fn no_orders_is_an_empty_sequence() {
        let store = MemoryStore::new();
        let service = OrderHistoryService::new(store);

        let orders = service.for_user(Uuid::new_v4()).expect("query");
        assert!(orders.is_empty());
    }

    #[test]
    fn history_is_newest_first_and_scoped_to_the_user() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let now = Utc::now();

        let oldest = order_at(user, now - Duration::hours(2));
        let newest = order_at(user, now);
        let middle = order_at(user, now - Duration::hours(1));
        let other_user = order_at(Uuid::new_v4(), now);
        for order in [&oldest, &newest, &middle, &other_user] {
            store.seed_order(order.clone());
        }

        let history = OrderHistoryService::new(store)
            .for_user(user)
            .expect("query");
        assert_eq!(
            history.iter().map(|o| o.id).collect::<Vec<_>>(),
            vec![newest.id, middle.id, oldest.id]
        );
    }

    #[test]
    fn equal_timestamps_sort_deterministically() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let at = Utc::now();
        let a = order_at(user, at);
        let b = order_at(user, at);
        store.seed_order(a.clone());
        store.seed_order(b.clone());

        let service = OrderHistoryService::new(store);
        let first = service.for_user(user).expect("query");
        let second = service.for_user(user).expect("query");

        let expected = if a.id > b.id {
            vec![a.id, b.id]
        } else {
            vec![b.id, a.id]
        };
        assert_eq!(first.iter().map(|o| o.id).collect::<Vec<_>>(), expected);
        assert_eq!(
            first.iter().map(|o| o.id).collect::<Vec<_>>(),
            second.iter().map(|o| o.id).collect::<Vec<_>>()
        );
    }
}
