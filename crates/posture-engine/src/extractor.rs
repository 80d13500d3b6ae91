//! Normalization of raw directory documents into an [`AttributeSet`].
//!
//! The first matching document is deserialized into a typed schema where every
//! field is optional. Identity fields are mandatory; numeric fields fall back
//! to documented defaults so sparse upstream data never reaches the formulas
//! as an absent value.

use posture_core::{AttributeSet, PostureError};
use serde::Deserialize;
use std::collections::BTreeMap;

const DEFAULT_AREA: f64 = 1.0;
const DEFAULT_LANGUAGE_COUNT: u32 = 1;
const DEFAULT_CURRENCY: &str = "N/A";

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawName {
    Plain(String),
    Structured { common: Option<String> },
}

impl RawName {
    fn common(&self) -> Option<&str> {
        match self {
            RawName::Plain(s) => Some(s.as_str()),
            RawName::Structured { common } => common.as_deref(),
        }
    }
}

/// Typed view of one directory document.
#[derive(Debug, Default, Deserialize)]
struct RawCountryRecord {
    cca3: Option<String>,
    cca2: Option<String>,
    name: Option<RawName>,
    population: Option<f64>,
    area: Option<f64>,
    borders: Option<Vec<String>>,
    region: Option<String>,
    subregion: Option<String>,
    landlocked: Option<bool>,
    languages: Option<BTreeMap<String, serde_json::Value>>,
    currencies: Option<BTreeMap<String, serde_json::Value>>,
}

fn non_empty(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

pub struct AttributeExtractor;

impl AttributeExtractor {
    /// Build an [`AttributeSet`] from the directory's match sequence.
    pub fn extract(documents: &serde_json::Value) -> Result<AttributeSet, PostureError> {
        let first = documents
            .as_array()
            .and_then(|records| records.first())
            .ok_or_else(|| PostureError::NotFound("directory returned no records".to_string()))?;

        let raw: RawCountryRecord = serde_json::from_value(first.clone())
            .map_err(|e| PostureError::MalformedRecord(e.to_string()))?;

        Self::normalize(raw)
    }

    fn normalize(raw: RawCountryRecord) -> Result<AttributeSet, PostureError> {
        let id = non_empty(raw.cca3.as_deref())
            .or_else(|| non_empty(raw.cca2.as_deref()))
            .ok_or_else(|| PostureError::MalformedRecord("record has no entity code".to_string()))?;

        let name = non_empty(raw.name.as_ref().and_then(RawName::common))
            .ok_or_else(|| PostureError::MalformedRecord(format!("record {} has no name", id)))?;

        let population = raw
            .population
            .filter(|p| p.is_finite() && *p > 0.0)
            .map(|p| p.round() as u64)
            .unwrap_or(0);

        let area = raw
            .area
            .filter(|a| a.is_finite() && *a > 0.0)
            .unwrap_or(DEFAULT_AREA);

        let language_count = raw
            .languages
            .map(|l| l.len() as u32)
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_LANGUAGE_COUNT);

        let currency_codes: Vec<String> = raw
            .currencies
            .map(|c| c.into_keys().collect::<Vec<_>>())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| vec![DEFAULT_CURRENCY.to_string()]);

        Ok(AttributeSet {
            id,
            name,
            population,
            area,
            neighbor_codes: raw.borders.unwrap_or_default(),
            region: raw.region.unwrap_or_default(),
            subregion: raw.subregion.unwrap_or_default(),
            is_landlocked: raw.landlocked.unwrap_or(false),
            language_count,
            currency_codes,
        })
    }
}
