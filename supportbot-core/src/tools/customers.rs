// supportbot-core/src/tools/customers.rs
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fmt;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoyaltyTier {
    Bronze,
    Silver,
    Gold,
}

impl fmt::Display for LoyaltyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LoyaltyTier::Bronze => "bronze",
            LoyaltyTier::Silver => "silver",
            LoyaltyTier::Gold => "gold",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerRecord {
    pub name: &'static str,
    pub orders: u32,
    pub total_spent_cents: u64,
    pub last_order: &'static str,
    pub loyalty_tier: LoyaltyTier,
}

impl CustomerRecord {
    pub fn summary(&self) -> String {
        format!(
            "Customer: {}, Orders: {}, Total Spent: {}, Last Order: {}, Loyalty Tier: {}",
            self.name,
            self.orders,
            format_usd(self.total_spent_cents),
            self.last_order,
            self.loyalty_tier
        )
    }
}

lazy_static! {
    /// Customer records keyed by email address.
    pub static ref CUSTOMERS: HashMap<&'static str, CustomerRecord> = HashMap::from([
        (
            "john@example.com",
            CustomerRecord {
                name: "John Smith",
                orders: 5,
                total_spent_cents: 45_000,
                last_order: "2024-01-15",
                loyalty_tier: LoyaltyTier::Silver,
            },
        ),
        (
            "jane@example.com",
            CustomerRecord {
                name: "Jane Doe",
                orders: 12,
                total_spent_cents: 120_000,
                last_order: "2024-01-20",
                loyalty_tier: LoyaltyTier::Gold,
            },
        ),
        (
            "mike@example.com",
            CustomerRecord {
                name: "Mike Johnson",
                orders: 2,
                total_spent_cents: 15_000,
                last_order: "2024-01-10",
                loyalty_tier: LoyaltyTier::Bronze,
            },
        ),
    ]);
}

/// Exact-match lookup; the email is not normalized.
pub fn get_customer_info(customer_email: &str) -> String {
    match CUSTOMERS.get(customer_email) {
        Some(record) => {
            info!(customer_email = %customer_email, "Customer info retrieved.");
            record.summary()
        }
        None => {
            warn!(customer_email = %customer_email, "Customer not found.");
            format!(
                "No customer record found for {}. Please verify the email address.",
                customer_email
            )
        }
    }
}

/// Formats cents as US dollars with thousands separators, e.g. `$1,200.00`.
fn format_usd(cents: u64) -> String {
    let dollars = (cents / 100).to_string();
    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, digit) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    format!("${}.{:02}", grouped, cents % 100)
}
