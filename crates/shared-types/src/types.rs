//! Lease assessment types
//!
//! These mirror the JSON shape the analysis pipeline asks the generation
//! service to emit, so field names serialize in camelCase.

use serde::{Deserialize, Serialize};

/// Full structured output of one analysis run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaseAnalysisResponse {
    pub clauses: Vec<ClauseWithAdvice>,
    pub missing_clauses: Vec<SuggestedClause>,
    pub metadata: LeaseMetadata,
}

/// A clause found in the lease, rated against the jurisdiction's requirements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClauseWithAdvice {
    pub title: String,
    pub text: String,
    pub risk_level: RiskLevel,
    pub suggestions: Vec<String>,
    pub legal_basis: String,
    /// Improved wording, only for medium/high risk clauses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft: Option<String>,
}

/// A required clause the lease does not contain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedClause {
    pub title: String,
    pub draft: String,
    pub legal_basis: String,
    pub reasoning: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[serde(alias = "Low", alias = "LOW")]
    Low,
    #[serde(alias = "Medium", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "High", alias = "HIGH")]
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }

    /// Medium and high risk clauses carry a redrafted version
    pub fn warrants_draft(&self) -> bool {
        matches!(self, RiskLevel::Medium | RiskLevel::High)
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Factual data extracted from the lease. Every leaf is free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaseMetadata {
    pub parties_involved: String,
    pub rent_and_payment_terms: RentAndPaymentTerms,
    pub security_deposit: SecurityDeposit,
    pub lease_duration: LeaseDuration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentAndPaymentTerms {
    pub monthly_rent_amount: String,
    pub due_date: String,
    pub payment_methods: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityDeposit {
    pub amount: String,
    pub conditions_for_return: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaseDuration {
    pub start_date: String,
    pub end_date: String,
    pub renewal_terms: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_assessment_uses_camel_case_fields() {
        let json = r#"{
            "clauses": [{
                "title": "Rent",
                "text": "Tenant pays 20,000 INR monthly",
                "riskLevel": "high",
                "suggestions": ["State a late fee cap"],
                "legalBasis": "Model Tenancy Act 2021",
                "draft": "Rent of INR 20,000 is payable by the 5th."
            }],
            "missingClauses": [],
            "metadata": {
                "partiesInvolved": "A (landlord), B (tenant)",
                "rentAndPaymentTerms": {
                    "monthlyRentAmount": "20,000 INR",
                    "dueDate": "5th",
                    "paymentMethods": "Bank transfer"
                },
                "securityDeposit": {"amount": "40,000 INR", "conditionsForReturn": "On vacating"},
                "leaseDuration": {"startDate": "2024-01-01", "endDate": "2024-12-31", "renewalTerms": "By mutual consent"}
            }
        }"#;

        let parsed: LeaseAnalysisResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.clauses[0].risk_level, RiskLevel::High);
        assert_eq!(
            parsed.metadata.security_deposit.amount,
            "40,000 INR".to_string()
        );

        let value = serde_json::to_value(&parsed).unwrap();
        assert!(value.get("missingClauses").is_some());
        assert_eq!(value["clauses"][0]["riskLevel"], "high");
    }

    #[test]
    fn test_draft_is_optional() {
        let json = r#"{"title":"Pets","text":"No pets","riskLevel":"low","suggestions":[],"legalBasis":"n/a"}"#;
        let clause: ClauseWithAdvice = serde_json::from_str(json).unwrap();
        assert_eq!(clause.draft, None);

        let back = serde_json::to_value(&clause).unwrap();
        assert!(back.get("draft").is_none());
    }

    #[test]
    fn test_risk_level_rejects_unknown_values() {
        assert!(serde_json::from_str::<RiskLevel>(r#""critical""#).is_err());
        assert_eq!(
            serde_json::from_str::<RiskLevel>(r#""Medium""#).unwrap(),
            RiskLevel::Medium
        );
    }

    #[test]
    fn test_missing_metadata_leaf_is_rejected() {
        let json = r#"{"startDate":"2024-01-01","endDate":"2024-12-31"}"#;
        assert!(serde_json::from_str::<LeaseDuration>(json).is_err());
    }

    #[test]
    fn test_warrants_draft() {
        assert!(!RiskLevel::Low.warrants_draft());
        assert!(RiskLevel::Medium.warrants_draft());
        assert!(RiskLevel::High.warrants_draft());
    }
}
