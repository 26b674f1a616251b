//! Jurisdiction schema registry
//!
//! Loads the catalog of legal schemas once at startup and resolves a
//! jurisdiction to the schema the prompt is built from. Resolution never
//! fails: unknown countries resolve to [`default_schema`].
//!
//! Catalog sources, later overriding earlier:
//! 1. Records embedded from `catalog/*.json`
//! 2. `<code>.json` files in an optional schema directory

pub mod default;
pub mod embedded;

pub use default::default_schema;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use shared_types::LegalSchema;
use tracing::{debug, error, info, warn};

use crate::error::CatalogError;
use crate::jurisdiction::Jurisdiction;

/// Outcome of schema resolution
#[derive(Debug, Clone)]
pub enum ResolvedSchema {
    /// A catalog record matched the country code
    Jurisdiction {
        country_code: String,
        schema: Arc<LegalSchema>,
    },
    /// No record matched; the generic schema applies
    Default(Arc<LegalSchema>),
}

impl ResolvedSchema {
    pub fn schema(&self) -> &LegalSchema {
        match self {
            ResolvedSchema::Jurisdiction { schema, .. } => schema,
            ResolvedSchema::Default(schema) => schema,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, ResolvedSchema::Default(_))
    }

    /// Country code of the matched record, `None` for the default schema
    pub fn country_code(&self) -> Option<&str> {
        match self {
            ResolvedSchema::Jurisdiction { country_code, .. } => Some(country_code),
            ResolvedSchema::Default(_) => None,
        }
    }
}

/// Immutable index of jurisdiction schemas keyed by lowercase country code
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Arc<LegalSchema>>,
    default: Arc<LegalSchema>,
}

impl SchemaRegistry {
    /// Registry with no catalog; everything resolves to the default schema
    pub fn empty() -> Self {
        Self {
            schemas: HashMap::new(),
            default: Arc::new(default_schema()),
        }
    }

    /// Registry built from the embedded catalog
    pub fn embedded() -> Self {
        let mut registry = Self::empty();

        for code in embedded::list_embedded_schemas() {
            let Some(raw) = embedded::get_embedded_schema(code) else {
                continue;
            };
            match parse_catalog_record(code, raw) {
                Ok(schema) => registry.insert(code, schema),
                Err(e) => error!("Skipping embedded schema: {}", e),
            }
        }

        registry
    }

    /// Embedded catalog plus any `<code>.json` records found in `schema_dir`.
    ///
    /// Records that fail to parse or validate are logged and skipped; only a
    /// failure to read the directory itself is an error.
    pub fn load(schema_dir: Option<&Path>) -> Result<Self, CatalogError> {
        let mut registry = Self::embedded();

        if let Some(dir) = schema_dir {
            registry.load_dir(dir)?;
        }

        info!(
            "Schema registry loaded: {} jurisdictions ({})",
            registry.schemas.len(),
            registry.jurisdictions().join(", ")
        );

        Ok(registry)
    }

    fn load_dir(&mut self, dir: &Path) -> Result<(), CatalogError> {
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(code) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(|s| s.trim().to_lowercase())
            else {
                continue;
            };

            let raw = std::fs::read_to_string(&path)?;
            match parse_catalog_record(&code, &raw) {
                Ok(schema) => {
                    if self.schemas.contains_key(&code) {
                        debug!("Schema '{}' overridden by {}", code, path.display());
                    }
                    self.insert(&code, schema);
                }
                Err(e) => error!("Skipping schema file {}: {}", path.display(), e),
            }
        }

        Ok(())
    }

    fn insert(&mut self, code: &str, schema: LegalSchema) {
        self.schemas.insert(code.to_lowercase(), Arc::new(schema));
    }

    /// Resolve a country/region pair to a schema.
    ///
    /// `region_code` is accepted but does not select a schema yet.
    pub fn resolve(&self, country_code: &str, region_code: Option<&str>) -> ResolvedSchema {
        let jurisdiction = Jurisdiction::new(country_code, region_code);

        match self.schemas.get(&jurisdiction.country_code) {
            Some(schema) => {
                debug!("Resolved schema for {}", jurisdiction);
                ResolvedSchema::Jurisdiction {
                    country_code: jurisdiction.country_code,
                    schema: Arc::clone(schema),
                }
            }
            None => {
                warn!(
                    "No legal schema for jurisdiction {}, falling back to default schema",
                    jurisdiction
                );
                ResolvedSchema::Default(Arc::clone(&self.default))
            }
        }
    }

    pub fn get(&self, country_code: &str) -> Option<Arc<LegalSchema>> {
        self.schemas.get(&country_code.to_lowercase()).cloned()
    }

    /// Sorted list of country codes with a catalog record
    pub fn jurisdictions(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.schemas.keys().map(|k| k.as_str()).collect();
        codes.sort_unstable();
        codes
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::embedded()
    }
}

/// Parse and validate one catalog record
pub fn parse_catalog_record(code: &str, raw: &str) -> Result<LegalSchema, CatalogError> {
    let schema: LegalSchema = serde_json::from_str(raw).map_err(|source| CatalogError::Parse {
        code: code.to_string(),
        source,
    })?;

    schema.validate().map_err(|source| CatalogError::Invalid {
        code: code.to_string(),
        source,
    })?;

    Ok(schema)
}
