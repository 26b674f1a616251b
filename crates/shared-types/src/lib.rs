pub mod schema;
pub mod types;

pub use schema::{LegalSchema, RequiredClause, SchemaError};
pub use types::{
    ClauseWithAdvice, LeaseAnalysisResponse, LeaseDuration, LeaseMetadata, RentAndPaymentTerms,
    RiskLevel, SecurityDeposit, SuggestedClause,
};
