// supportbot-core/src/tools/orders.rs
//! Order status lookups.
//!
//! There is no order system behind this: [`HashedOrderLookup`] maps an order
//! number to a status with a fixed-key hash, so a number always yields the same
//! (arbitrary) status. A real backend implements [`OrderLookup`] instead.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use tracing::{info, warn};

pub const MIN_ORDER_NUMBER_LENGTH: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Processing,
    Shipped,
    Delivered,
    Returned,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Returned,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Returned => "returned",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            OrderStatus::Processing => "Your order is being processed and will ship within 2-3 business days.",
            OrderStatus::Shipped => "Your order has been shipped! You should receive a tracking number shortly.",
            OrderStatus::Delivered => "Your order has been delivered. Please check your doorstep or mailbox.",
            OrderStatus::Returned => "Your order has been returned and a refund is being processed.",
            OrderStatus::Cancelled => "Your order has been cancelled. If you were charged, a refund will be processed within 5-7 business days.",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of order state. Order numbers reaching it are already validated.
pub trait OrderLookup: Send + Sync {
    fn status_of(&self, order_number: &str) -> OrderStatus;
}

/// Deterministic pseudo-lookup: hash of the order number modulo the status count.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashedOrderLookup;

impl OrderLookup for HashedOrderLookup {
    fn status_of(&self, order_number: &str) -> OrderStatus {
        // DefaultHasher::new() uses fixed keys, unlike RandomState.
        let mut hasher = DefaultHasher::new();
        order_number.hash(&mut hasher);
        let index = (hasher.finish() % OrderStatus::ALL.len() as u64) as usize;
        OrderStatus::ALL[index]
    }
}

pub fn invalid_order_message() -> String {
    format!(
        "Invalid order number. Please provide a valid order number (minimum {} characters).",
        MIN_ORDER_NUMBER_LENGTH
    )
}

pub fn check_order_status(lookup: &dyn OrderLookup, order_number: &str) -> String {
    if order_number.chars().count() < MIN_ORDER_NUMBER_LENGTH {
        warn!(order_number = %order_number, "Invalid order number.");
        return invalid_order_message();
    }
    let status = lookup.status_of(order_number);
    info!(order_number = %order_number, status = %status, "Order status checked.");
    format!("Order {}: {}", order_number, status.description())
}
