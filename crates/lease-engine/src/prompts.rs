//! Prompt composition for lease analysis
//!
//! Builds the ordered message list sent to the generation service. The
//! payload is a pure function of the lease text and the resolved schema:
//! the same inputs always produce the same messages.

use std::fmt::Write;

use serde::{Deserialize, Serialize};
use shared_types::LegalSchema;

use crate::jurisdiction::country_name;
use crate::schemas::ResolvedSchema;

/// Message role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// A role-tagged message in the prompt payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Output contract. The recoverer relies on the model honouring it.
pub const SYSTEM_PROMPT: &str = "You are a legal assistant specializing in residential lease \
agreement analysis. Always reply with exactly one valid JSON object matching the shape you are \
given. Do not include any explanation, markdown, or extra commentary.";

/// Expected response shape, field for field
pub const RESPONSE_TEMPLATE: &str = r#"Respond with a single JSON object in exactly this shape:

{
  "clauses": [
    {
      "title": "Required clause title, as listed above",
      "text": "The matching text from the lease, quoted or summarized",
      "riskLevel": "low | medium | high",
      "suggestions": ["Concrete improvement suggestions"],
      "legalBasis": "Statute or principle the assessment relies on",
      "draft": "Improved clause wording (only when riskLevel is medium or high)"
    }
  ],
  "missingClauses": [
    {
      "title": "Required clause title that the lease does not contain",
      "draft": "Suggested clause text to add",
      "legalBasis": "Statute or principle requiring the clause",
      "reasoning": "Why the clause is needed"
    }
  ],
  "metadata": {
    "partiesInvolved": "Landlord and tenant names",
    "rentAndPaymentTerms": {
      "monthlyRentAmount": "Monthly rent amount",
      "dueDate": "When rent is due",
      "paymentMethods": "Accepted payment methods"
    },
    "securityDeposit": {
      "amount": "Security deposit amount",
      "conditionsForReturn": "Conditions for returning the deposit"
    },
    "leaseDuration": {
      "startDate": "Lease start date",
      "endDate": "Lease end date",
      "renewalTerms": "Renewal terms"
    }
  }
}

Rules:
- Evaluate every required clause: present ones go in "clauses", absent ones in "missingClauses".
- "riskLevel" must be one of "low", "medium", "high".
- Include "draft" in a clause only when its riskLevel is "medium" or "high".
- When a metadata value cannot be found, write "Unable to extract" followed by what is missing."#;

/// Ordered messages sent to the generation service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptPayload {
    pub messages: Vec<Message>,
}

impl PromptPayload {
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// All message contents joined, useful for logging prompt size
    pub fn total_chars(&self) -> usize {
        self.messages.iter().map(|m| m.content.len()).sum()
    }
}

/// Compose the analysis prompt for a lease under a resolved schema
pub fn compose(lease_text: &str, resolved: &ResolvedSchema) -> PromptPayload {
    let framing = match resolved {
        ResolvedSchema::Jurisdiction {
            country_code,
            schema,
        } => jurisdiction_framing(country_code, schema),
        ResolvedSchema::Default(schema) => generic_framing(schema),
    };

    PromptPayload {
        messages: vec![
            Message::system(SYSTEM_PROMPT),
            Message::user(framing),
            Message::user(format!("Lease content:\n{}", lease_text)),
            Message::user(RESPONSE_TEMPLATE),
        ],
    }
}

fn jurisdiction_framing(country_code: &str, schema: &LegalSchema) -> String {
    let place = match country_name(country_code) {
        Some(name) => format!("{} ({})", name, country_code.to_uppercase()),
        None => country_code.to_uppercase(),
    };

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Analyze the following lease agreement under the law of {}.",
        place
    );
    let _ = writeln!(out, "\nGoverning law: {}", schema.law_summary);
    let _ = writeln!(
        out,
        "\nA compliant lease in this jurisdiction must contain these clauses:"
    );
    write_required_clauses(&mut out, schema);
    out
}

fn generic_framing(schema: &LegalSchema) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Analyze the following lease agreement. No jurisdiction-specific legal schema applies."
    );
    let _ = writeln!(out, "\nGuidance: {}", schema.law_summary);
    let _ = writeln!(out, "\nAt minimum, a lease should contain these clauses:");
    write_required_clauses(&mut out, schema);
    out
}

fn write_required_clauses(out: &mut String, schema: &LegalSchema) {
    for (i, clause) in schema.required_clauses.iter().enumerate() {
        let _ = writeln!(out, "\n{}. {}", i + 1, clause.title);
        let _ = writeln!(out, "   Legal basis: {}", clause.legal_basis);
        if !clause.risk_indicators.is_empty() {
            let _ = writeln!(
                out,
                "   Risk indicators: {}",
                clause.risk_indicators.join("; ")
            );
        }
        let _ = writeln!(out, "   Drafting hints: {}", clause.drafting_hints);
    }
}
