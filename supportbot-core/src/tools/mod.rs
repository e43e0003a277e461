// supportbot-core/src/tools/mod.rs

//! The four support tools the model may call.
//!
//! Each tool is a plain function over the lookup tables in the submodules and
//! always answers with text: a bad order number or an unknown email is an
//! answer, not an error. Errors from [`ToolProvider::execute_tool`] are reserved
//! for calls that could not be made at all (undecodable or missing arguments).

pub mod customers;
pub mod knowledge;
pub mod orders;
pub mod tickets;

use crate::models::tools::{ToolDefinition, ToolInput, ToolParameter, ToolParametersDefinition};
use anyhow::{anyhow, Result};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use orders::{HashedOrderLookup, OrderLookup};
use tickets::{Priority, SimulatedTicketDesk, TicketDesk};

/// Trait defining the interface for providing tools to the [`crate::Agent`].
pub trait ToolProvider: Send + Sync {
    /// Returns the definitions of all tools available.
    fn get_tool_definitions(&self) -> Vec<ToolDefinition>;
    /// Whether a tool with this name is registered.
    fn has_tool(&self, tool_name: &str) -> bool;
    /// Executes the tool with the given name and input arguments.
    fn execute_tool(&self, tool_name: &str, input: ToolInput) -> Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupportTool {
    SearchKnowledgeBase,
    CreateSupportTicket,
    CheckOrderStatus,
    GetCustomerInfo,
}

impl SupportTool {
    pub const ALL: [SupportTool; 4] = [
        SupportTool::SearchKnowledgeBase,
        SupportTool::CreateSupportTicket,
        SupportTool::CheckOrderStatus,
        SupportTool::GetCustomerInfo,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SupportTool::SearchKnowledgeBase => "search_knowledge_base",
            SupportTool::CreateSupportTicket => "create_support_ticket",
            SupportTool::CheckOrderStatus => "check_order_status",
            SupportTool::GetCustomerInfo => "get_customer_info",
        }
    }

    pub fn definition(&self) -> ToolDefinition {
        let (description, params, required): (&str, Vec<(&str, ToolParameter)>, &[&str]) =
            match self {
                SupportTool::SearchKnowledgeBase => (
                    "Search the knowledge base for information about policies, shipping, returns, and other common topics.",
                    vec![(
                        "query",
                        ToolParameter::string("The topic or question to look up, e.g. 'return policy'."),
                    )],
                    &["query"],
                ),
                SupportTool::CreateSupportTicket => (
                    "Create a support ticket for issues that need follow-up from a human representative.",
                    vec![
                        ("issue", ToolParameter::string("Description of the customer's issue.")),
                        (
                            "customer_email",
                            ToolParameter::string("Email address to contact the customer at."),
                        ),
                        (
                            "priority",
                            ToolParameter::one_of("Urgency of the ticket.", &Priority::NAMES),
                        ),
                    ],
                    &["issue", "customer_email"],
                ),
                SupportTool::CheckOrderStatus => (
                    "Check the current status of an order by its order number.",
                    vec![(
                        "order_number",
                        ToolParameter::string("The order number (at least 6 characters)."),
                    )],
                    &["order_number"],
                ),
                SupportTool::GetCustomerInfo => (
                    "Look up a customer's account details by email address.",
                    vec![(
                        "customer_email",
                        ToolParameter::string("The customer's email address."),
                    )],
                    &["customer_email"],
                ),
            };

        let properties: BTreeMap<String, ToolParameter> = params
            .into_iter()
            .map(|(name, param)| (name.to_string(), param))
            .collect();

        ToolDefinition {
            name: self.name().to_string(),
            description: description.to_string(),
            parameters: ToolParametersDefinition {
                param_type: "object".to_string(),
                properties,
                required: required.iter().map(|r| r.to_string()).collect(),
            },
        }
    }
}

impl fmt::Display for SupportTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Dispatches tool calls to the support tools by name.
pub struct SupportToolProvider {
    by_name: HashMap<&'static str, SupportTool>,
    orders: Arc<dyn OrderLookup>,
    tickets: Arc<dyn TicketDesk>,
}

impl SupportToolProvider {
    pub fn new(orders: Arc<dyn OrderLookup>, tickets: Arc<dyn TicketDesk>) -> Self {
        let by_name = SupportTool::ALL.iter().map(|t| (t.name(), *t)).collect();
        Self {
            by_name,
            orders,
            tickets,
        }
    }

    pub fn resolve(&self, tool_name: &str) -> Option<SupportTool> {
        self.by_name.get(tool_name).copied()
    }

    fn run(&self, tool: SupportTool, input: &ToolInput) -> Result<String> {
        let output = match tool {
            SupportTool::SearchKnowledgeBase => {
                knowledge::search_knowledge_base(&input.required_str("query")?)
            }
            SupportTool::CreateSupportTicket => {
                let issue = input.required_str("issue")?;
                let email = input.required_str("customer_email")?;
                let priority = input.optional_str("priority");
                tickets::create_support_ticket(
                    self.tickets.as_ref(),
                    &issue,
                    &email,
                    priority.as_deref(),
                )
            }
            SupportTool::CheckOrderStatus => {
                orders::check_order_status(self.orders.as_ref(), &input.required_str("order_number")?)
            }
            SupportTool::GetCustomerInfo => {
                customers::get_customer_info(&input.required_str("customer_email")?)
            }
        };
        Ok(output)
    }
}

impl Default for SupportToolProvider {
    fn default() -> Self {
        Self::new(
            Arc::new(HashedOrderLookup),
            Arc::new(SimulatedTicketDesk::default()),
        )
    }
}

impl ToolProvider for SupportToolProvider {
    fn get_tool_definitions(&self) -> Vec<ToolDefinition> {
        SupportTool::ALL.iter().map(SupportTool::definition).collect()
    }

    fn has_tool(&self, tool_name: &str) -> bool {
        self.by_name.contains_key(tool_name)
    }

    fn execute_tool(&self, tool_name: &str, input: ToolInput) -> Result<String> {
        let tool = self
            .resolve(tool_name)
            .ok_or_else(|| anyhow!("Unknown tool: {}", tool_name))?;
        debug!(tool = %tool, "Running support tool.");
        self.run(tool, &input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orders::OrderStatus;

    struct AlwaysShipped;

    impl OrderLookup for AlwaysShipped {
        fn status_of(&self, _order_number: &str) -> OrderStatus {
            OrderStatus::Shipped
        }
    }

    fn input(raw: &str) -> ToolInput {
        ToolInput::from_json_str(raw).unwrap()
    }

    #[test]
    fn test_definitions_cover_every_tool() {
        let provider = SupportToolProvider::default();
        let defs = provider.get_tool_definitions();
        let names: Vec<&str> = defs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "search_knowledge_base",
                "create_support_ticket",
                "check_order_status",
                "get_customer_info"
            ]
        );
        let ticket = &defs[1];
        assert_eq!(ticket.parameters.required, vec!["issue", "customer_email"]);
        assert_eq!(
            ticket.parameters.properties["priority"].enum_values.as_deref(),
            Some(&["low".to_string(), "medium".to_string(), "high".to_string(), "urgent".to_string()][..])
        );
    }

    #[test]
    fn test_resolve_by_name() {
        let provider = SupportToolProvider::default();
        for tool in SupportTool::ALL {
            assert_eq!(provider.resolve(tool.name()), Some(tool));
            assert!(provider.has_tool(tool.name()));
        }
        assert_eq!(provider.resolve("delete_database"), None);
        assert!(!provider.has_tool("Search_Knowledge_Base"));
    }

    #[test]
    fn test_execute_knowledge_search() {
        let provider = SupportToolProvider::default();
        let output = provider
            .execute_tool("search_knowledge_base", input(r#"{"query": "return policy"}"#))
            .unwrap();
        assert!(output.contains("30 days"));
    }

    #[test]
    fn test_execute_order_status_uses_injected_lookup() {
        let provider = SupportToolProvider::new(
            Arc::new(AlwaysShipped),
            Arc::new(SimulatedTicketDesk::default()),
        );
        let output = provider
            .execute_tool("check_order_status", input(r#"{"order_number": 12345678}"#))
            .unwrap();
        assert!(output.starts_with("Order 12345678: "));
        assert!(output.contains(OrderStatus::Shipped.description()));

        let short = provider
            .execute_tool("check_order_status", input(r#"{"order_number": "123"}"#))
            .unwrap();
        assert!(short.contains("Invalid order number"));
    }

    #[test]
    fn test_execute_ticket_without_priority() {
        let provider = SupportToolProvider::default();
        let output = provider
            .execute_tool(
                "create_support_ticket",
                input(r#"{"issue": "Package never arrived", "customer_email": "john@example.com"}"#),
            )
            .unwrap();
        assert!(output.contains("medium priority"));
        assert!(output.contains("john@example.com"));
    }

    #[test]
    fn test_missing_argument_is_an_error() {
        let provider = SupportToolProvider::default();
        let err = provider
            .execute_tool("get_customer_info", input("{}"))
            .unwrap_err();
        assert!(err.to_string().contains("customer_email"));
    }

    #[test]
    fn test_unknown_tool_is_an_error() {
        let provider = SupportToolProvider::default();
        assert!(provider.execute_tool("refund_everything", input("{}")).is_err());
    }
}
