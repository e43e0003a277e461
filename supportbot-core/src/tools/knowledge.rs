// supportbot-core/src/tools/knowledge.rs
//! Canned answers for common support topics.

use tracing::{info, warn};

/// Topic keyword and its answer. Table order decides ties.
pub struct KnowledgeEntry {
    pub keyword: &'static str,
    pub answer: &'static str,
}

pub const NOT_FOUND_ANSWER: &str = "I couldn't find specific information about that topic. Please contact our support team for assistance.";

pub static KNOWLEDGE_BASE: &[KnowledgeEntry] = &[
    KnowledgeEntry {
        keyword: "return policy",
        answer: "Our return policy allows returns within 30 days of purchase with original receipt. Items must be in original condition.",
    },
    KnowledgeEntry {
        keyword: "shipping",
        answer: "Standard shipping takes 3-5 business days. Express shipping (1-2 days) is available for $15.99. Free shipping on orders over $50.",
    },
    KnowledgeEntry {
        keyword: "warranty",
        answer: "All products come with a 1-year manufacturer warranty. Extended warranties are available for purchase.",
    },
    KnowledgeEntry {
        keyword: "payment",
        answer: "We accept all major credit cards, PayPal, Apple Pay, and Google Pay. Payment plans available for orders over $200.",
    },
    KnowledgeEntry {
        keyword: "account",
        answer: "You can create an account on our website to track orders, save payment information, and access exclusive deals.",
    },
    KnowledgeEntry {
        keyword: "refund",
        answer: "Refunds are processed within 5-7 business days after we receive your return. You'll receive an email confirmation.",
    },
    KnowledgeEntry {
        keyword: "tracking",
        answer: "You can track your order using the tracking number provided in your confirmation email or in your account dashboard.",
    },
    KnowledgeEntry {
        keyword: "contact",
        answer: "You can reach our customer service team at support@company.com or call 1-800-123-4567. Live chat available 24/7.",
    },
    KnowledgeEntry {
        keyword: "hours",
        answer: "Our customer service is available Monday-Friday 8AM-8PM EST, Saturday 9AM-6PM EST, and Sunday 10AM-6PM EST.",
    },
    KnowledgeEntry {
        keyword: "cancellation",
        answer: "You can cancel your order within 1 hour of placing it. After that, contact customer service immediately.",
    },
    KnowledgeEntry {
        keyword: "delivery",
        answer: "We offer standard delivery (3-5 days), express delivery (1-2 days), and same-day delivery in select areas.",
    },
    KnowledgeEntry {
        keyword: "international",
        answer: "We ship to most countries. International shipping takes 7-14 business days and may incur additional fees.",
    },
    KnowledgeEntry {
        keyword: "damaged",
        answer: "If you receive a damaged item, please take photos and contact us within 48 hours. We'll arrange a replacement or refund.",
    },
    KnowledgeEntry {
        keyword: "size guide",
        answer: "Our size guide is available on each product page. If you're unsure about sizing, we recommend ordering multiple sizes.",
    },
    KnowledgeEntry {
        keyword: "gift cards",
        answer: "Gift cards are available in denominations from $10 to $500. They never expire and can be used for any purchase.",
    },
];

/// Looks a query up in [`KNOWLEDGE_BASE`].
///
/// A keyword contained in the query wins over everything else. Failing that,
/// the first entry with any keyword word contained in the query is used.
pub fn search_knowledge_base(query: &str) -> String {
    search_in(KNOWLEDGE_BASE, query)
}

fn search_in(entries: &[KnowledgeEntry], query: &str) -> String {
    let query_lower = query.to_lowercase();

    if let Some(entry) = entries.iter().find(|e| query_lower.contains(e.keyword)) {
        info!(query = %query, keyword = entry.keyword, "Knowledge base exact match.");
        return entry.answer.to_string();
    }

    let partial = entries.iter().find(|e| {
        e.keyword
            .split_whitespace()
            .any(|word| query_lower.contains(word))
    });
    if let Some(entry) = partial {
        info!(query = %query, keyword = entry.keyword, "Knowledge base partial match.");
        return entry.answer.to_string();
    }

    warn!(query = %query, "Knowledge base search found no matches.");
    NOT_FOUND_ANSWER.to_string()
}
