//! Analysis pipeline
//!
//! Ties the stages together: resolve the jurisdiction schema, compose the
//! prompt, call the generation service, recover a structured assessment and
//! cache it.

use std::sync::Arc;

use shared_types::LeaseAnalysisResponse;
use tracing::{debug, info, info_span, Instrument};

use crate::cache::ResultCache;
use crate::config::EngineConfig;
use crate::error::{ExtractionError, GenerationError, Result};
use crate::generation::{CompletionParams, GenerationClient, OpenAiClient};
use crate::jurisdiction::Jurisdiction;
use crate::prompts::compose;
use crate::recovery::{is_fallback, recover};
use crate::schemas::SchemaRegistry;

/// Lease analysis orchestrator.
///
/// Cheap to clone; all state is shared behind `Arc`.
#[derive(Clone)]
pub struct LeaseAnalyzer {
    registry: Arc<SchemaRegistry>,
    client: Arc<dyn GenerationClient>,
    cache: Arc<ResultCache>,
    params: CompletionParams,
}

impl LeaseAnalyzer {
    pub fn new(
        registry: Arc<SchemaRegistry>,
        client: Arc<dyn GenerationClient>,
        cache: Arc<ResultCache>,
        params: CompletionParams,
    ) -> Self {
        Self {
            registry,
            client,
            cache,
            params,
        }
    }

    /// Build an analyzer backed by the OpenAI client described in `config`
    pub fn from_config(
        config: &EngineConfig,
        registry: Arc<SchemaRegistry>,
    ) -> std::result::Result<Self, GenerationError> {
        let client = OpenAiClient::new(config.openai.clone())?;
        Ok(Self::new(
            registry,
            Arc::new(client),
            Arc::new(ResultCache::with_capacity(
                config.cache_ttl,
                config.cache_max_entries,
            )),
            config.completion_params(),
        ))
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Cached assessment for a document, if one is still live.
    ///
    /// Lets callers skip fetching and extracting a document whose analysis
    /// is already known.
    pub async fn cached(
        &self,
        document_identity: &str,
        country_code: &str,
        region_code: Option<&str>,
    ) -> Option<LeaseAnalysisResponse> {
        let jurisdiction = Jurisdiction::new(country_code, region_code);
        self.cache.get(&cache_key(document_identity, &jurisdiction)).await
    }

    /// Analyze lease text, using the text itself as the document identity
    pub async fn analyze(
        &self,
        lease_text: &str,
        country_code: &str,
        region_code: Option<&str>,
    ) -> Result<LeaseAnalysisResponse> {
        self.analyze_document(lease_text, lease_text, country_code, region_code)
            .await
    }

    /// Analyze lease text extracted from a stored document.
    ///
    /// `document_identity` (typically the storage address) keys the cache.
    /// Generation failures propagate and are never cached; a fallback
    /// assessment from unparseable output is cached like any other result.
    pub async fn analyze_document(
        &self,
        document_identity: &str,
        lease_text: &str,
        country_code: &str,
        region_code: Option<&str>,
    ) -> Result<LeaseAnalysisResponse> {
        if lease_text.trim().is_empty() {
            return Err(ExtractionError::Empty.into());
        }

        let jurisdiction = Jurisdiction::new(country_code, region_code);
        let span = info_span!("analyze", jurisdiction = %jurisdiction);

        self.run(document_identity, lease_text, jurisdiction)
            .instrument(span)
            .await
    }

    async fn run(
        &self,
        document_identity: &str,
        lease_text: &str,
        jurisdiction: Jurisdiction,
    ) -> Result<LeaseAnalysisResponse> {
        let key = cache_key(document_identity, &jurisdiction);

        if let Some(cached) = self.cache.get(&key).await {
            info!("Returning cached analysis");
            return Ok(cached);
        }

        let resolved = self.registry.resolve(
            &jurisdiction.country_code,
            jurisdiction.region_code.as_deref(),
        );
        let prompt = compose(lease_text, &resolved);
        debug!(
            "Composed prompt: {} messages, {} chars, default schema: {}",
            prompt.messages().len(),
            prompt.total_chars(),
            resolved.is_default()
        );

        let raw = self.client.complete(prompt.messages(), &self.params).await?;

        let assessment = recover(&raw);
        if is_fallback(&assessment) {
            info!("Caching fallback assessment");
        }

        self.cache.insert(&key, assessment.clone()).await;
        info!(
            "Analysis complete: {} clauses, {} missing",
            assessment.clauses.len(),
            assessment.missing_clauses.len()
        );

        Ok(assessment)
    }
}

fn cache_key(document_identity: &str, jurisdiction: &Jurisdiction) -> String {
    ResultCache::generate_key(
        document_identity,
        &jurisdiction.country_code,
        jurisdiction.region_code.as_deref(),
    )
}

impl std::fmt::Debug for LeaseAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeaseAnalyzer")
            .field("jurisdictions", &self.registry.jurisdictions())
            .field("cache", &self.cache)
            .field("params", &self.params)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AnalysisError, ExtractionError};
    use crate::prompts::Message;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const RESPONSE: &str = r#"{
        "clauses": [{"title":"Rent","text":"Rs 20,000 monthly","riskLevel":"low","suggestions":[],"legalBasis":"Section 8"}],
        "missingClauses": [],
        "metadata": {
            "partiesInvolved": "A and B",
            "rentAndPaymentTerms": {"monthlyRentAmount": "Rs 20,000", "dueDate": "1st", "paymentMethods": "UPI"},
            "securityDeposit": {"amount": "Rs 40,000", "conditionsForReturn": "On vacating"},
            "leaseDuration": {"startDate": "2024-01-01", "endDate": "2024-12-31", "renewalTerms": "None"}
        }
    }"#;

    struct ScriptedClient {
        reply: std::result::Result<String, ()>,
        calls: AtomicUsize,
        last_prompt: Mutex<Vec<Message>>,
    }

    impl ScriptedClient {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(()),
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl GenerationClient for ScriptedClient {
        async fn complete(
            &self,
            messages: &[Message],
            _params: &CompletionParams,
        ) -> std::result::Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock().unwrap() = messages.to_vec();
            self.reply.clone().map_err(|_| GenerationError::Timeout)
        }
    }

    fn analyzer(client: Arc<ScriptedClient>) -> LeaseAnalyzer {
        LeaseAnalyzer::new(
            Arc::new(SchemaRegistry::embedded()),
            client,
            Arc::new(ResultCache::default()),
            CompletionParams::default(),
        )
    }

    #[tokio::test]
    async fn test_blank_text_is_rejected_before_generation() {
        let client = Arc::new(ScriptedClient::replying(RESPONSE));
        let result = analyzer(client.clone()).analyze("   ", "in", None).await;

        assert!(matches!(
            result,
            Err(AnalysisError::Extraction(ExtractionError::Empty))
        ));
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_second_call_is_served_from_cache() {
        let client = Arc::new(ScriptedClient::replying(RESPONSE));
        let analyzer = analyzer(client.clone());

        let first = analyzer.analyze("lease", "in", None).await.unwrap();
        let second = analyzer.analyze("lease", "IN ", None).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cached_lookup_matches_analyze() {
        let client = Arc::new(ScriptedClient::replying(RESPONSE));
        let analyzer = analyzer(client.clone());
        let url = "https://files.example.com/lease.pdf";

        assert!(analyzer.cached(url, "in", None).await.is_none());

        let assessment = analyzer
            .analyze_document(url, "lease", "in", None)
            .await
            .unwrap();
        assert_eq!(analyzer.cached(url, " IN", None).await, Some(assessment));
        assert!(analyzer.cached(url, "in", Some("mh")).await.is_none());
    }

    #[tokio::test]
    async fn test_region_is_part_of_the_cache_key() {
        let client = Arc::new(ScriptedClient::replying(RESPONSE));
        let analyzer = analyzer(client.clone());

        analyzer.analyze("lease", "us", Some("ca")).await.unwrap();
        analyzer.analyze("lease", "us", Some("ny")).await.unwrap();

        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unknown_country_uses_generic_prompt() {
        let client = Arc::new(ScriptedClient::replying(RESPONSE));
        analyzer(client.clone())
            .analyze("lease", "xx", None)
            .await
            .unwrap();

        let prompt = client.last_prompt.lock().unwrap().clone();
        assert!(prompt[1]
            .content
            .contains("No jurisdiction-specific legal schema applies"));
    }

    #[tokio::test]
    async fn test_generation_failure_is_not_cached() {
        let client = Arc::new(ScriptedClient::failing());
        let analyzer = analyzer(client.clone());

        for _ in 0..2 {
            let result = analyzer.analyze("lease", "in", None).await;
            assert!(matches!(
                result,
                Err(AnalysisError::Generation(GenerationError::Timeout))
            ));
        }
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
        assert!(analyzer.cache().is_empty().await);
    }

    #[tokio::test]
    async fn test_unparseable_output_caches_fallback() {
        let client = Arc::new(ScriptedClient::replying("I cannot help with that."));
        let analyzer = analyzer(client.clone());

        let first = analyzer.analyze("lease", "gb", None).await.unwrap();
        assert!(is_fallback(&first));

        let second = analyzer.analyze("lease", "gb", None).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }
}
