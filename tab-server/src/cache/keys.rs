//! Deterministic cache key construction (the "KeyScheme").

use shared::ids::{OrderItemId, TabId};

pub fn tab_key(id: TabId) -> String {
    format!("tab:{id}")
}

pub fn tab_guest_names_key(id: TabId) -> String {
    format!("tab:{id}:guest_names")
}

pub fn orders_list_key(id: TabId) -> String {
    format!("tab:{id}:orders")
}

pub fn not_sent_order_id_key(id: TabId) -> String {
    format!("tab:{id}:not_sent_order:id")
}

pub fn order_item_id_sequence_key(id: TabId) -> String {
    format!("tab:{id}:not_sent_order:order_item_id_sequence")
}

pub fn order_items_list_key(id: TabId) -> String {
    format!("tab:{id}:not_sent_order:order_items")
}

pub fn order_item_key(id: OrderItemId) -> String {
    format!(
        "tab:{}:order:{}:order_item:{}",
        id.order.tab, id.order.scoped.0, id.scoped.0
    )
}

pub fn order_item_guest_owners_key(id: OrderItemId) -> String {
    format!("{}:guest_owners", order_item_key(id))
}

pub fn order_item_customer_owners_key(id: OrderItemId) -> String {
    format!("{}:customer_owners", order_item_key(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ids::{ScopedOrderId, ScopedOrderItemId};
    use uuid::Uuid;

    #[test]
    fn item_key_nests_tab_order_item() {
        let tab = TabId(Uuid::nil());
        let id = OrderItemId {
            order: shared::ids::OrderId { tab, scoped: ScopedOrderId(2) },
            scoped: ScopedOrderItemId(5),
        };
        assert_eq!(
            order_item_key(id),
            format!("tab:{tab}:order:2:order_item:5")
        );
    }
}
