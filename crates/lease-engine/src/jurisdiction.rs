//! Jurisdiction keys for lease analysis
//!
//! A jurisdiction is a country code plus an optional sub-national region.
//! Only the country selects a legal schema today; the region is carried
//! through prompts, cache keys and logs so region-specific schemas can be
//! added without changing the request shape.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    /// Normalized country codes: ISO-3166 alpha-2 or alpha-3, lowercase
    static ref COUNTRY_CODE_PATTERN: Regex = Regex::new(r"^[a-z]{2,3}$").unwrap();
}

/// Normalized (country, region) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Jurisdiction {
    pub country_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_code: Option<String>,
}

impl Jurisdiction {
    /// Build a jurisdiction, trimming and lowercasing both codes.
    /// A blank region is treated as absent.
    pub fn new(country_code: &str, region_code: Option<&str>) -> Self {
        let region_code = region_code
            .map(|r| r.trim().to_lowercase())
            .filter(|r| !r.is_empty());

        Self {
            country_code: country_code.trim().to_lowercase(),
            region_code,
        }
    }

    pub fn country(country_code: &str) -> Self {
        Self::new(country_code, None)
    }

    /// Whether the country code has the expected shape
    pub fn has_valid_country_code(&self) -> bool {
        COUNTRY_CODE_PATTERN.is_match(&self.country_code)
    }

    /// Jurisdiction ID string (e.g., "IN", "US-CA")
    pub fn id(&self) -> String {
        match &self.region_code {
            Some(region) => format!(
                "{}-{}",
                self.country_code.to_uppercase(),
                region.to_uppercase()
            ),
            None => self.country_code.to_uppercase(),
        }
    }

    /// Human-readable country name for the codes shipped in the catalog
    pub fn country_name(&self) -> Option<&'static str> {
        country_name(&self.country_code)
    }
}

impl std::fmt::Display for Jurisdiction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.id())
    }
}

/// Country names for codes the catalog knows about
pub fn country_name(code: &str) -> Option<&'static str> {
    match code {
        "in" => Some("India"),
        "us" => Some("United States"),
        "gb" => Some("United Kingdom"),
        "au" => Some("Australia"),
        _ => None,
    }
}
