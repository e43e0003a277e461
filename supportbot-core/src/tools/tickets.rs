// supportbot-core/src/tools/tickets.rs
use std::fmt;
use std::str::FromStr;
use tracing::info;

pub const TICKET_PREFIX: &str = "TICKET";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub const NAMES: [&'static str; 4] = ["low", "medium", "high", "urgent"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }

    /// Promised time until a representative gets in touch.
    pub fn response_window(&self) -> &'static str {
        match self {
            Priority::Low => "24-48 hours",
            Priority::Medium => "12-24 hours",
            Priority::High => "4-8 hours",
            Priority::Urgent => "1-2 hours",
        }
    }

    /// Missing or unrecognized priorities fall back to the default.
    pub fn parse_lenient(raw: Option<&str>) -> Priority {
        raw.and_then(|r| r.parse().ok()).unwrap_or_default()
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            other => Err(format!("unknown priority '{}'", other)),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where tickets get filed. Returns the new ticket's identifier.
pub trait TicketDesk: Send + Sync {
    fn open_ticket(&self, issue: &str, customer_email: &str, priority: Priority) -> String;
}

/// Stand-in desk: the id is derived from the input lengths alone, so two
/// different issues of equal length collide. Good enough for a demo, not for
/// real tickets.
#[derive(Debug, Clone)]
pub struct SimulatedTicketDesk {
    prefix: String,
}

impl SimulatedTicketDesk {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for SimulatedTicketDesk {
    fn default() -> Self {
        Self::new(TICKET_PREFIX)
    }
}

impl TicketDesk for SimulatedTicketDesk {
    fn open_ticket(&self, issue: &str, customer_email: &str, _priority: Priority) -> String {
        let weight = issue.chars().count() + customer_email.chars().count();
        format!("{}-{}", self.prefix, weight)
    }
}

pub fn create_support_ticket(
    desk: &dyn TicketDesk,
    issue: &str,
    customer_email: &str,
    priority: Option<&str>,
) -> String {
    let priority = Priority::parse_lenient(priority);
    let ticket_id = desk.open_ticket(issue, customer_email, priority);
    info!(ticket_id = %ticket_id, priority = %priority, "Support ticket created.");
    format!(
        "Support ticket {} has been created with {} priority. A representative will contact you at {} within {}.",
        ticket_id,
        priority,
        customer_email,
        priority.response_window()
    )
}
