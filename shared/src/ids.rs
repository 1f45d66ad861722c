//! Composite identifiers for tabs, orders, order items and guests.
//!
//! Wire form is a dot-joined string: `{tab}.{scopedOrder}`,
//! `{tab}.{scopedOrder}.{scopedItem}`, `{tab}.{scopedGuest}`. Tab and
//! Customer ids are plain UUIDs. Scoped segments are base-10 integers in
//! `[1, i16::MAX]`.

use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn split_id(s: &str) -> Vec<&str> {
    s.split('.').collect()
}

fn parse_scope(s: &str) -> Result<i16, CoreError> {
    let val: i16 = s
        .parse()
        .map_err(|_| CoreError::invalid_argument(format!("invalid scoped id: {s}")))?;
    if val <= 0 {
        return Err(CoreError::invalid_argument(format!(
            "scoped id must be positive: {s}"
        )));
    }
    Ok(val)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TabId(pub Uuid);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TabId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(TabId)
            .map_err(|_| CoreError::invalid_argument(format!("invalid tab id: {s}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub Uuid);

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CustomerId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(CustomerId)
            .map_err(|_| CoreError::invalid_argument(format!("invalid customer id: {s}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScopedOrderId(pub i16);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScopedGuestId(pub i16);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScopedOrderItemId(pub i16);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId {
    pub tab: TabId,
    pub scoped: ScopedOrderId,
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.tab, self.scoped.0)
    }
}

impl FromStr for OrderId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = split_id(s);
        if parts.len() != 2 {
            return Err(CoreError::invalid_argument(format!("invalid order id: {s}")));
        }
        let tab = parts[0].parse()?;
        let scoped = ScopedOrderId(parse_scope(parts[1])?);
        Ok(OrderId { tab, scoped })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GuestId {
    pub tab: TabId,
    pub scoped: ScopedGuestId,
}

impl fmt::Display for GuestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.tab, self.scoped.0)
    }
}

impl FromStr for GuestId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = split_id(s);
        if parts.len() != 2 {
            return Err(CoreError::invalid_argument(format!("invalid guest id: {s}")));
        }
        let tab = parts[0].parse()?;
        let scoped = ScopedGuestId(parse_scope(parts[1])?);
        Ok(GuestId { tab, scoped })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderItemId {
    pub order: OrderId,
    pub scoped: ScopedOrderItemId,
}

impl fmt::Display for OrderItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.order, self.scoped.0)
    }
}

impl FromStr for OrderItemId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = split_id(s);
        if parts.len() != 3 {
            return Err(CoreError::invalid_argument(format!(
                "invalid order item id: {s}"
            )));
        }
        let order: OrderId = format!("{}.{}", parts[0], parts[1]).parse()?;
        let scoped = ScopedOrderItemId(parse_scope(parts[2])?);
        Ok(OrderItemId { order, scoped })
    }
}

/// Plain positive-int16 identifiers, unscoped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MenuItemId(pub i16);

impl fmt::Display for MenuItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MenuItemId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(MenuItemId(parse_scope(s)?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MenuTagId(pub i16);

impl fmt::Display for MenuTagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MenuTagId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(MenuTagId(parse_scope(s)?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MenuTagDimensionId(pub i16);

impl fmt::Display for MenuTagDimensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MenuTagDimensionId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(MenuTagDimensionId(parse_scope(s)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_id_round_trips() {
        let tab = TabId(Uuid::new_v4());
        let id = OrderId { tab, scoped: ScopedOrderId(7) };
        let parsed: OrderId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn order_item_id_round_trips() {
        let tab = TabId(Uuid::new_v4());
        let id = OrderItemId {
            order: OrderId { tab, scoped: ScopedOrderId(3) },
            scoped: ScopedOrderItemId(12),
        };
        let parsed: OrderItemId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn rejects_zero_and_negative_scope() {
        let tab = TabId(Uuid::new_v4());
        assert!(format!("{tab}.0").parse::<OrderId>().is_err());
        assert!(format!("{tab}.-1").parse::<OrderId>().is_err());
    }

    #[test]
    fn rejects_wrong_segment_count() {
        assert!("not-a-tab".parse::<OrderId>().is_err());
        let tab = TabId(Uuid::new_v4());
        assert!(format!("{tab}").parse::<OrderId>().is_err());
        assert!(format!("{tab}.1.2.3").parse::<OrderItemId>().is_err());
    }
}
