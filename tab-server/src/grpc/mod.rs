//! tonic service implementations: translate wire messages to/from domain
//! types and call into [`crate::services`].

pub mod auth;
pub mod customer;
pub mod menu;
pub mod order;
pub mod tab;

use std::str::FromStr;

use chrono::{DateTime, Utc};
use tonic::Status;

use crate::pb;
use shared::CoreError;

pub(crate) fn parse_id<T>(raw: &str) -> Result<T, Status>
where
    T: FromStr<Err = CoreError>,
{
    raw.parse().map_err(Into::into)
}

pub(crate) fn to_timestamp(ts: DateTime<Utc>) -> prost_types::Timestamp {
    prost_types::Timestamp { seconds: ts.timestamp(), nanos: ts.timestamp_subsec_nanos() as i32 }
}

pub(crate) fn to_timestamp_opt(ts: Option<DateTime<Utc>>) -> Option<prost_types::Timestamp> {
    ts.map(to_timestamp)
}

pub(crate) fn to_pb_order_item(item: &shared::model::OrderItem) -> pb::OrderItem {
    pb::OrderItem {
        id: item.id.to_string(),
        quantity: item.quantity as i32,
        modifiers: item.modifiers.clone(),
        guest_owner_ids: item.guest_owner_ids.iter().map(|g| g.to_string()).collect(),
        customer_owner_ids: item.customer_owner_ids.iter().map(|c| c.to_string()).collect(),
        menu_item_id: item.menu_item_id.0 as i32,
        name: item.name.clone(),
        description: item.description.clone(),
        photo_pathinfo: item.photo_pathinfo.clone(),
        price: item.price,
        portion_size: item.portion_size as i32,
        modifiers_config: item.modifiers_config.clone(),
    }
}

pub(crate) fn to_pb_order(order: &shared::model::Order) -> pb::Order {
    pb::Order {
        id: order.id.to_string(),
        items: order.items.iter().map(to_pb_order_item).collect(),
        sent_at: to_timestamp_opt(order.sent_at),
    }
}

pub(crate) fn to_pb_tab(tab: &shared::model::Tab) -> pb::Tab {
    pb::Tab {
        id: tab.id.to_string(),
        total_price: tab.total_price,
        orders: tab.orders.iter().map(to_pb_order).collect(),
        custom_guest_names: tab
            .custom_guest_names
            .iter()
            .map(|(guest, name)| (guest.scoped.0.to_string(), name.clone()))
            .collect(),
        created_at: Some(to_timestamp(tab.created_at)),
        closed_at: to_timestamp_opt(tab.closed_at),
    }
}

pub(crate) fn to_pb_customer(customer: &shared::model::Customer) -> pb::Customer {
    pb::Customer {
        id: customer.id.to_string(),
        login_id: customer.login_id.clone(),
        name: customer.name.clone(),
        email: customer.email.clone(),
        phone_number: customer.phone_number.clone(),
        created_at: Some(to_timestamp(customer.created_at)),
        updated_at: Some(to_timestamp(customer.updated_at)),
    }
}

pub(crate) fn to_pb_menu_item(item: &shared::model::MenuItem) -> pb::MenuItem {
    pb::MenuItem {
        id: item.id.0 as i32,
        name: item.name.clone(),
        description: item.description.clone(),
        photo_pathinfo: item.photo_pathinfo.clone(),
        price: item.price,
        portion_size: item.portion_size as i32,
        available: item.available,
        modifiers_config: item.modifiers_config.clone(),
        created_at: Some(to_timestamp(item.created_at)),
        deleted_at: to_timestamp_opt(item.deleted_at),
    }
}

pub(crate) fn to_pb_guest(id: shared::ids::GuestId, custom_name: String) -> pb::Guest {
    pb::Guest { id: id.to_string(), custom_name }
}
