//! Domain structs shared by the core, the cache/durable repositories and the
//! gRPC adapter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{
    CustomerId, GuestId, MenuItemId, MenuTagDimensionId, MenuTagId, OrderId, OrderItemId, TabId,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tab {
    pub id: TabId,
    pub total_price: i32,
    pub orders: Vec<Order>,
    pub custom_guest_names: Vec<(GuestId, String)>,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl Tab {
    pub fn is_closed(&self) -> bool {
        self.closed_at.is_some()
    }

    /// The trailing not-sent order, if any — by convention always the last
    /// element and always sent_at == None.
    pub fn not_sent_order(&self) -> Option<&Order> {
        self.orders.last().filter(|o| o.sent_at.is_none())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub items: Vec<OrderItem>,
    pub sent_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn is_sent(&self) -> bool {
        self.sent_at.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub quantity: i16,
    pub modifiers: Vec<u8>,
    pub guest_owner_ids: Vec<GuestId>,
    pub customer_owner_ids: Vec<CustomerId>,
    pub menu_item_id: MenuItemId,
    // Denormalized menu snapshot, immutable once written.
    pub name: String,
    pub description: String,
    pub photo_pathinfo: String,
    pub price: i32,
    pub portion_size: i16,
    pub modifiers_config: Vec<u8>,
}

impl OrderItem {
    pub fn line_total(&self) -> i64 {
        i64::from(self.price) * i64::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guest {
    pub id: GuestId,
    pub custom_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub login_id: String,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: MenuItemId,
    pub name: String,
    pub description: String,
    pub photo_pathinfo: String,
    pub price: i32,
    pub portion_size: i16,
    pub available: bool,
    pub modifiers_config: Vec<u8>,
    pub menu_tag_ids: Vec<MenuTagId>,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl MenuItem {
    pub fn is_orderable(&self) -> bool {
        self.available && self.deleted_at.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuTag {
    pub id: MenuTagId,
    pub value: String,
    pub description: String,
    pub dimension_id: MenuTagDimensionId,
    pub prerequisite_ids: Vec<MenuTagId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuTagDimension {
    pub id: MenuTagDimensionId,
    pub value: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateCustomerParams {
    pub login_id: String,
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone_number: String,
}

#[derive(Debug, Clone)]
pub struct CreateMenuItemParams {
    pub name: String,
    pub description: String,
    pub photo_pathinfo: String,
    pub price: i32,
    pub portion_size: i16,
    pub available: bool,
    pub modifiers_config: Vec<u8>,
}

pub type UpdateMenuItemParams = CreateMenuItemParams;

#[derive(Debug, Clone)]
pub struct CreateOrderItemParams {
    pub order_id: OrderId,
    pub menu_item_id: MenuItemId,
    pub quantity: i16,
    pub modifiers: Vec<u8>,
    pub guest_owner_ids: Vec<GuestId>,
    pub customer_owner_ids: Vec<CustomerId>,
}
