//! Embedded jurisdiction catalog
//!
//! Catalog records live in `catalog/<code>.json` and are compiled into the
//! binary. Adding a jurisdiction means adding a file here and to the list.

/// India - Model Tenancy Act 2021
const IN_SCHEMA: &str = include_str!("../../catalog/in.json");

/// United States - URLTA baseline plus federal disclosures
const US_SCHEMA: &str = include_str!("../../catalog/us.json");

/// United Kingdom - England assured shorthold tenancies
const GB_SCHEMA: &str = include_str!("../../catalog/gb.json");

/// Australia - state residential tenancies acts
const AU_SCHEMA: &str = include_str!("../../catalog/au.json");

/// Get the raw catalog record for a country code
pub fn get_embedded_schema(code: &str) -> Option<&'static str> {
    match code {
        "in" => Some(IN_SCHEMA),
        "us" => Some(US_SCHEMA),
        "gb" => Some(GB_SCHEMA),
        "au" => Some(AU_SCHEMA),
        _ => None,
    }
}

/// List all embedded country codes
pub fn list_embedded_schemas() -> Vec<&'static str> {
    vec!["in", "us", "gb", "au"]
}
