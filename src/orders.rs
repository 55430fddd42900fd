//! Order History

use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};

use crate::{ids::ProductId, money::Rupiah};

/// Order lifecycle state reported by the order API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Awaiting payment
    Pending,

    /// Paid, awaiting shipment
    Paid,

    /// Handed to the courier
    Shipped,

    /// Received by the buyer
    Delivered,

    /// Cancelled
    Cancelled,
}

/// A product line of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecordItem {
    /// Product id
    pub product_id: ProductId,

    /// Product name at the time of ordering
    pub name: String,

    /// Units ordered
    pub quantity: u32,
}

/// A placed order as returned by the order API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Human-facing order number (e.g. `INV/20240101/0001`)
    pub order_number: String,

    /// When the order was placed
    pub created_at: Timestamp,

    /// Current status
    pub status: OrderStatus,

    /// Ordered lines
    pub items: Vec<OrderRecordItem>,

    /// Amount charged, as computed by the server
    pub total: Rupiah,
}

/// How far back to look for orders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateRange {
    /// Every order
    #[default]
    All,

    /// Orders placed in the last 7 days
    Last7Days,

    /// Orders placed in the last 30 days
    Last30Days,

    /// Orders placed in the last 90 days
    Last90Days,
}

impl DateRange {
    /// Length of the range in days, `None` for [`DateRange::All`].
    pub fn days(self) -> Option<i64> {
        match self {
            DateRange::All => None,
            DateRange::Last7Days => Some(7),
            DateRange::Last30Days => Some(30),
            DateRange::Last90Days => Some(90),
        }
    }

    /// Whether an order created at `created_at` falls in the range ending at `now`.
    ///
    /// An order is in range when `now - created_at <= N days`.
    pub fn contains(self, created_at: Timestamp, now: Timestamp) -> bool {
        let Some(days) = self.days() else {
            return true;
        };

        now.duration_since(created_at) <= SignedDuration::from_hours(days * 24)
    }
}

/// Criteria for narrowing the order history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    /// Case-insensitive text matched against order numbers and item names
    pub query: String,

    /// Only orders in this status
    pub status: Option<OrderStatus>,

    /// Only orders placed within this range
    pub range: DateRange,
}

impl OrderFilter {
    /// Whether `order` satisfies every criterion.
    pub fn matches(&self, order: &OrderRecord, now: Timestamp) -> bool {
        self.status.is_none_or(|status| order.status == status)
            && self.range.contains(order.created_at, now)
            && self.matches_query(order)
    }

    fn matches_query(&self, order: &OrderRecord) -> bool {
        let needle = self.query.trim().to_lowercase();

        needle.is_empty()
            || order.order_number.to_lowercase().contains(&needle)
            || order
                .items
                .iter()
                .any(|item| item.name.to_lowercase().contains(&needle))
    }
}

/// Orders satisfying `filter`, in their original order.
pub fn filter_orders<'a>(
    orders: &'a [OrderRecord],
    filter: &OrderFilter,
    now: Timestamp,
) -> Vec<&'a OrderRecord> {
    orders
        .iter()
        .filter(|order| filter.matches(order, now))
        .collect()
}
