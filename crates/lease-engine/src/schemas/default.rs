//! Jurisdiction-agnostic fallback schema

use shared_types::{LegalSchema, RequiredClause};

/// Schema used when no catalog record matches the requested country.
///
/// Contains only clauses that every residential lease should carry.
pub fn default_schema() -> LegalSchema {
    LegalSchema {
        law_summary: "General principles of residential tenancy law. No jurisdiction-specific \
                      statute applies; assess against commonly accepted landlord-tenant practice."
            .to_string(),
        required_clauses: vec![
            RequiredClause {
                title: "Termination Notice".to_string(),
                legal_basis: "General landlord-tenant principles".to_string(),
                risk_indicators: vec![
                    "no notice period".to_string(),
                    "termination at landlord's sole discretion".to_string(),
                    "waiver of notice".to_string(),
                ],
                drafting_hints: "State a reasonable written notice period for both parties and \
                                 the grounds on which the lease may end early."
                    .to_string(),
            },
            RequiredClause {
                title: "Security Deposit Return".to_string(),
                legal_basis: "General landlord-tenant principles".to_string(),
                risk_indicators: vec![
                    "non-refundable deposit".to_string(),
                    "no return deadline".to_string(),
                    "unspecified deductions".to_string(),
                ],
                drafting_hints: "State the deposit amount, when it is returned after the tenancy \
                                 ends, and which itemized deductions are allowed."
                    .to_string(),
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schema_is_valid() {
        let schema = default_schema();
        assert!(schema.validate().is_ok());
        assert_eq!(
            schema.clause_titles(),
            vec!["Termination Notice", "Security Deposit Return"]
        );
    }

    #[test]
    fn test_default_schema_is_deterministic() {
        assert_eq!(default_schema(), default_schema());
    }
}
