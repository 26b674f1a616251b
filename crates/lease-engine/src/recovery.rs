//! Structured-response recovery
//!
//! Generation services do not reliably emit clean JSON: they wrap it in
//! prose, truncate it, or drift from the requested shape. [`recover`] always
//! returns a well-formed [`LeaseAnalysisResponse`]; when the response cannot
//! be parsed it returns [`fallback_assessment`], whose sentinel strings make
//! the failure visible in the payload itself.

use shared_types::{
    ClauseWithAdvice, LeaseAnalysisResponse, LeaseDuration, LeaseMetadata, RentAndPaymentTerms,
    RiskLevel, SecurityDeposit, SuggestedClause,
};
use tracing::{debug, warn};

use crate::error::RecoveryError;

/// Turn raw model output into an assessment. Never fails.
pub fn recover(raw: &str) -> LeaseAnalysisResponse {
    match try_recover(raw) {
        Ok(assessment) => assessment,
        Err(e) => {
            warn!("Failed to parse JSON from response ({}), using fallback", e);
            debug!("unparseable response: {}", raw);
            fallback_assessment()
        }
    }
}

/// Parse the embedded JSON object, or report why it could not be parsed
pub fn try_recover(raw: &str) -> Result<LeaseAnalysisResponse, RecoveryError> {
    let candidate = extract_json_object(raw).ok_or(RecoveryError::NoObject)?;
    let assessment: LeaseAnalysisResponse = serde_json::from_str(candidate)?;
    Ok(normalize(assessment))
}

/// Slice from the first `{` to the last `}` inclusive.
///
/// Tolerates commentary before and after the object.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

/// Drafts are only meaningful for medium and high risk clauses
fn normalize(mut assessment: LeaseAnalysisResponse) -> LeaseAnalysisResponse {
    for clause in &mut assessment.clauses {
        if !clause.risk_level.warrants_draft() && clause.draft.is_some() {
            debug!("Dropping draft from low-risk clause '{}'", clause.title);
            clause.draft = None;
        }
    }
    assessment
}

/// Placeholder assessment returned when recovery fails
pub fn fallback_assessment() -> LeaseAnalysisResponse {
    LeaseAnalysisResponse {
        clauses: vec![ClauseWithAdvice {
            title: "Unable to analyze clauses".to_string(),
            text: "Analysis failed".to_string(),
            risk_level: RiskLevel::Medium,
            suggestions: vec!["Unable to provide suggestions".to_string()],
            legal_basis: "Unable to determine legal basis".to_string(),
            draft: None,
        }],
        missing_clauses: vec![SuggestedClause {
            title: "Unable to identify missing clauses".to_string(),
            draft: "Unable to draft clause text".to_string(),
            legal_basis: "Unable to determine legal basis".to_string(),
            reasoning: "Analysis failed".to_string(),
        }],
        metadata: LeaseMetadata {
            parties_involved: "Unable to extract parties information".to_string(),
            rent_and_payment_terms: RentAndPaymentTerms {
                monthly_rent_amount: "Unable to extract rent amount".to_string(),
                due_date: "Unable to extract due date".to_string(),
                payment_methods: "Unable to extract payment methods".to_string(),
            },
            security_deposit: SecurityDeposit {
                amount: "Unable to extract deposit amount".to_string(),
                conditions_for_return: "Unable to extract return conditions".to_string(),
            },
            lease_duration: LeaseDuration {
                start_date: "Unable to extract start date".to_string(),
                end_date: "Unable to extract end date".to_string(),
                renewal_terms: "Unable to extract renewal terms".to_string(),
            },
        },
    }
}

/// Whether an assessment is the recovery fallback
pub fn is_fallback(assessment: &LeaseAnalysisResponse) -> bool {
    *assessment == fallback_assessment()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    const METADATA: &str = r#"{
        "partiesInvolved": "Asha Rao (landlord) and Vikram Shah (tenant)",
        "rentAndPaymentTerms": {"monthlyRentAmount": "INR 25,000", "dueDate": "5th of each month", "paymentMethods": "NEFT"},
        "securityDeposit": {"amount": "INR 50,000", "conditionsForReturn": "Within 30 days of handover"},
        "leaseDuration": {"startDate": "1 April 2024", "endDate": "28 February 2025", "renewalTerms": "Mutual consent"}
    }"#;

    fn valid_payload(clauses: &str) -> String {
        format!(
            r#"{{"clauses":{},"missingClauses":[],"metadata":{}}}"#,
            clauses, METADATA
        )
    }

    #[test]
    fn test_extracts_object_surrounded_by_prose() {
        let raw = format!("Sure! {} Thanks.", valid_payload("[]"));
        let assessment = try_recover(&raw).unwrap();

        assert!(assessment.clauses.is_empty());
        assert!(assessment.missing_clauses.is_empty());
        assert_eq!(assessment.metadata.security_deposit.amount, "INR 50,000");
    }

    #[test]
    fn test_no_braces_yields_fallback() {
        let assessment = recover("Here is my analysis: clauses look fine.");

        assert_eq!(assessment, fallback_assessment());
        assert_eq!(assessment.clauses.len(), 1);
        assert_eq!(assessment.missing_clauses.len(), 1);
        assert_eq!(assessment.clauses[0].risk_level, RiskLevel::Medium);
        assert!(assessment
            .metadata
            .parties_involved
            .starts_with("Unable to extract"));
    }

    #[test]
    fn test_fallback_metadata_leaves_are_sentinels() {
        let m = fallback_assessment().metadata;
        for leaf in [
            &m.parties_involved,
            &m.rent_and_payment_terms.monthly_rent_amount,
            &m.rent_and_payment_terms.due_date,
            &m.rent_and_payment_terms.payment_methods,
            &m.security_deposit.amount,
            &m.security_deposit.conditions_for_return,
            &m.lease_duration.start_date,
            &m.lease_duration.end_date,
            &m.lease_duration.renewal_terms,
        ] {
            assert!(leaf.starts_with("Unable to extract"), "leaf: {}", leaf);
        }
    }

    #[test]
    fn test_empty_string_yields_fallback() {
        assert!(is_fallback(&recover("")));
    }

    #[test]
    fn test_reversed_braces_yield_fallback() {
        assert!(extract_json_object("} nothing {").is_none());
        assert!(is_fallback(&recover("} nothing {")));
    }

    #[test]
    fn test_unbalanced_braces_yield_fallback() {
        assert!(is_fallback(&recover(r#"{"clauses": [ {"title": "x""#)));
        assert!(is_fallback(&recover("{ { }")));
    }

    #[test]
    fn test_missing_required_fields_yield_fallback() {
        assert!(is_fallback(&recover(r#"{"clauses": [], "missingClauses": []}"#)));
        assert!(matches!(
            try_recover(r#"{"clauses": []}"#),
            Err(RecoveryError::InvalidShape(_))
        ));
    }

    #[test]
    fn test_unknown_risk_level_yields_fallback() {
        let raw = valid_payload(
            r#"[{"title":"Rent","text":"t","riskLevel":"severe","suggestions":[],"legalBasis":"b"}]"#,
        );
        assert!(is_fallback(&recover(&raw)));
    }

    #[test]
    fn test_low_risk_drafts_are_dropped() {
        let raw = valid_payload(
            r#"[
                {"title":"Rent","text":"t","riskLevel":"low","suggestions":[],"legalBasis":"b","draft":"unneeded"},
                {"title":"Deposit","text":"t","riskLevel":"high","suggestions":["cap it"],"legalBasis":"b","draft":"Deposit capped at two months"}
            ]"#,
        );
        let assessment = recover(&raw);

        assert_eq!(assessment.clauses[0].draft, None);
        assert_eq!(
            assessment.clauses[1].draft.as_deref(),
            Some("Deposit capped at two months")
        );
    }

    #[test]
    fn test_response_order_is_preserved() {
        let raw = valid_payload(
            r#"[
                {"title":"B","text":"t","riskLevel":"low","suggestions":[],"legalBasis":"b"},
                {"title":"A","text":"t","riskLevel":"medium","suggestions":[],"legalBasis":"b"}
            ]"#,
        );
        let titles: Vec<String> = recover(&raw).clauses.into_iter().map(|c| c.title).collect();
        assert_eq!(titles, vec!["B".to_string(), "A".to_string()]);
    }

    #[test]
    fn test_markdown_fenced_json_is_recovered() {
        let raw = format!("```json\n{}\n```", valid_payload("[]"));
        assert!(!is_fallback(&recover(&raw)));
    }

    proptest! {
        /// Recovery is total: any input yields a well-formed assessment
        #[test]
        fn recover_never_panics(raw in ".*") {
            let assessment = recover(&raw);
            prop_assert!(serde_json::to_string(&assessment).is_ok());
        }

        /// Inputs without braces always produce the fallback
        #[test]
        fn braceless_input_is_fallback(raw in "[^{}]*") {
            prop_assert!(is_fallback(&recover(&raw)));
        }

        /// Prose around a valid object never prevents recovery
        #[test]
        fn prose_is_ignored(prefix in "[^{}]{0,40}", suffix in "[^{}]{0,40}") {
            let raw = format!("{}{}{}", prefix, valid_payload("[]"), suffix);
            prop_assert!(!is_fallback(&recover(&raw)));
        }
    }
}
