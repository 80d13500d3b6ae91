use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::PostureError;

/// Normalized attributes of one entity, built fresh per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeSet {
    pub id: String,
    pub name: String,
    pub population: u64,
    /// km², always > 0
    pub area: f64,
    pub neighbor_codes: Vec<String>,
    pub region: String,
    pub subregion: String,
    pub is_landlocked: bool,
    pub language_count: u32,
    pub currency_codes: Vec<String>,
}

impl AttributeSet {
    pub fn neighbor_count(&self) -> usize {
        self.neighbor_codes.len()
    }

    /// Inhabitants per km².
    pub fn density(&self) -> f64 {
        self.population as f64 / self.area
    }
}

/// Per-index calibration multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BiasMultipliers {
    pub domino: f64,
    pub vulnerability: f64,
    pub centrality: f64,
}

impl Default for BiasMultipliers {
    fn default() -> Self {
        Self {
            domino: 1.15,
            vulnerability: 0.95,
            centrality: 1.10,
        }
    }
}

/// Process-wide calibration layer. Built once at startup, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningState {
    pub version: String,
    pub reliability_index: f64,
    pub bias_multipliers: BiasMultipliers,
}

impl LearningState {
    /// Validated constructor: reliability must lie in [0,1] and every
    /// multiplier must be a positive finite number.
    pub fn new(
        version: impl Into<String>,
        reliability_index: f64,
        bias_multipliers: BiasMultipliers,
    ) -> Result<Self, PostureError> {
        let version = version.into();
        if version.trim().is_empty() {
            return Err(PostureError::Validation("calibration version is empty".to_string()));
        }
        if !(0.0..=1.0).contains(&reliability_index) {
            return Err(PostureError::Validation(format!(
                "reliability index {} outside [0,1]",
                reliability_index
            )));
        }
        for (name, value) in [
            ("domino", bias_multipliers.domino),
            ("vulnerability", bias_multipliers.vulnerability),
            ("centrality", bias_multipliers.centrality),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(PostureError::Validation(format!(
                    "bias multiplier '{}' must be positive, got {}",
                    name, value
                )));
            }
        }
        Ok(Self {
            version,
            reliability_index,
            bias_multipliers,
        })
    }
}

impl Default for LearningState {
    fn default() -> Self {
        Self {
            version: "v6".to_string(),
            reliability_index: 0.85,
            bias_multipliers: BiasMultipliers::default(),
        }
    }
}

/// Revision of the scoring formula table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormulaVersion {
    /// Five indices: no openness, no regional complexity.
    V5,
    #[default]
    V6,
}

impl FormulaVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormulaVersion::V5 => "v5",
            FormulaVersion::V6 => "v6",
        }
    }
}

impl FromStr for FormulaVersion {
    type Err = PostureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v5" | "5" => Ok(FormulaVersion::V5),
            "v6" | "6" => Ok(FormulaVersion::V6),
            other => Err(PostureError::Validation(format!(
                "unknown formula version '{}'",
                other
            ))),
        }
    }
}

/// Names of the composite indices, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexName {
    Power,
    Domino,
    Agility,
    Vulnerability,
    Centrality,
    Openness,
    RegionalComplexity,
}

impl IndexName {
    /// Wire key used in the `scores` payload.
    pub fn key(&self) -> &'static str {
        match self {
            IndexName::Power => "power",
            IndexName::Domino => "domino",
            IndexName::Agility => "agility",
            IndexName::Vulnerability => "vulnerability",
            IndexName::Centrality => "centrality",
            IndexName::Openness => "openness",
            IndexName::RegionalComplexity => "regionalComplexity",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            IndexName::Power => "POWER",
            IndexName::Domino => "DOMINO IMPACT",
            IndexName::Agility => "AGILITY / HUB",
            IndexName::Vulnerability => "VULNERABILITY",
            IndexName::Centrality => "CENTRALITY",
            IndexName::Openness => "OPENNESS",
            IndexName::RegionalComplexity => "REGIONAL PRESSURE",
        }
    }
}

/// Composite indices for one entity. Every value lies in [0,100] except
/// `domino`, which is only bounded below by 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexSet {
    pub power: f64,
    pub domino: f64,
    pub agility: f64,
    pub vulnerability: f64,
    pub centrality: f64,
    pub openness: Option<f64>,
    pub regional_complexity: Option<f64>,
}

impl IndexSet {
    /// Present indices in report order.
    pub fn entries(&self) -> Vec<(IndexName, f64)> {
        let mut out = vec![
            (IndexName::Power, self.power),
            (IndexName::Domino, self.domino),
            (IndexName::Agility, self.agility),
            (IndexName::Vulnerability, self.vulnerability),
            (IndexName::Centrality, self.centrality),
        ];
        if let Some(v) = self.openness {
            out.push((IndexName::Openness, v));
        }
        if let Some(v) = self.regional_complexity {
            out.push((IndexName::RegionalComplexity, v));
        }
        out
    }
}

/// Scores travel as string-formatted numerics (two decimals).
impl Serialize for IndexSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entries = self.entries();
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (name, value) in entries {
            map.serialize_entry(name.key(), &format!("{:.2}", value))?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerTier {
    SmallState,
    MajorPower,
    Superpower,
}

impl PowerTier {
    pub fn label(&self) -> &'static str {
        match self {
            PowerTier::SmallState => "Small State",
            PowerTier::MajorPower => "Major Power",
            PowerTier::Superpower => "Superpower",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InfluenceBloc {
    AtlanticAlliance,
    BricsPlus,
    GulfCooperation,
    EuropeanUnion,
    EurasianSphere,
    Asean,
    AfricanUnion,
    LatinAmerican,
    Neutral,
}

impl InfluenceBloc {
    pub fn label(&self) -> &'static str {
        match self {
            InfluenceBloc::AtlanticAlliance => "Atlantic Alliance",
            InfluenceBloc::BricsPlus => "BRICS+",
            InfluenceBloc::GulfCooperation => "Gulf Cooperation",
            InfluenceBloc::EuropeanUnion => "European Union",
            InfluenceBloc::EurasianSphere => "Eurasian Sphere",
            InfluenceBloc::Asean => "ASEAN",
            InfluenceBloc::AfricanUnion => "African Union",
            InfluenceBloc::LatinAmerican => "Latin American",
            InfluenceBloc::Neutral => "Neutral",
        }
    }
}

/// Market asset most correlated with the entity's posture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketAsset {
    #[serde(rename = "US treasuries")]
    UsTreasuries,
    #[serde(rename = "emerging market equities")]
    EmergingEquities,
    #[serde(rename = "crude oil futures")]
    CrudeOil,
    #[serde(rename = "euro sovereign bonds")]
    EuroBonds,
    #[serde(rename = "frontier sovereign debt")]
    FrontierDebt,
    #[serde(rename = "industrial metals")]
    IndustrialMetals,
    #[serde(rename = "agricultural commodities")]
    Agricultural,
    #[serde(rename = "gold")]
    Gold,
    #[serde(rename = "diversified equity indices")]
    DiversifiedEquity,
}

impl MarketAsset {
    pub fn label(&self) -> &'static str {
        match self {
            MarketAsset::UsTreasuries => "US treasuries",
            MarketAsset::EmergingEquities => "emerging market equities",
            MarketAsset::CrudeOil => "crude oil futures",
            MarketAsset::EuroBonds => "euro sovereign bonds",
            MarketAsset::FrontierDebt => "frontier sovereign debt",
            MarketAsset::IndustrialMetals => "industrial metals",
            MarketAsset::Agricultural => "agricultural commodities",
            MarketAsset::Gold => "gold",
            MarketAsset::DiversifiedEquity => "diversified equity indices",
        }
    }
}

/// Categorical labels derived from attributes and indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub power_tier: PowerTier,
    pub influence_bloc: InfluenceBloc,
    pub market_asset: MarketAsset,
    pub is_hub: bool,
    pub is_fragile: bool,
    pub is_pivot: bool,
}

/// Lifecycle of one analyze request, used as a structured log field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStage {
    Received,
    Fetching,
    Extracted,
    Scored,
    Classified,
    Rendered,
    Responded,
    Rejected,
    Failed,
}

impl fmt::Display for RequestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RequestStage::Received => "received",
            RequestStage::Fetching => "fetching",
            RequestStage::Extracted => "extracted",
            RequestStage::Scored => "scored",
            RequestStage::Classified => "classified",
            RequestStage::Rendered => "rendered",
            RequestStage::Responded => "responded",
            RequestStage::Rejected => "rejected",
            RequestStage::Failed => "failed",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_learning_state_rejects_out_of_range_reliability() {
        let err = LearningState::new("v6", 1.2, BiasMultipliers::default()).unwrap_err();
        assert!(matches!(err, PostureError::Validation(_)));
    }

    #[test]
    fn test_learning_state_rejects_non_positive_multiplier() {
        let bias = BiasMultipliers {
            domino: 0.0,
            ..BiasMultipliers::default()
        };
        assert!(LearningState::new("v6", 0.85, bias).is_err());
    }

    #[test]
    fn test_default_learning_state_is_valid() {
        let d = LearningState::default();
        let rebuilt =
            LearningState::new(d.version.clone(), d.reliability_index, d.bias_multipliers)
                .unwrap();
        assert_eq!(rebuilt, d);
    }

    #[test]
    fn test_formula_version_parse() {
        assert_eq!("V5".parse::<FormulaVersion>().unwrap(), FormulaVersion::V5);
        assert_eq!(" v6 ".parse::<FormulaVersion>().unwrap(), FormulaVersion::V6);
        assert!("v7".parse::<FormulaVersion>().is_err());
    }

    #[test]
    fn test_index_set_serializes_as_strings() {
        let set = IndexSet {
            power: 61.2149,
            domino: 36.0,
            agility: 40.0,
            vulnerability: 28.5,
            centrality: 78.4,
            openness: None,
            regional_complexity: Some(40.0),
        };
        let v = serde_json::to_value(set).unwrap();
        assert_eq!(v["power"], "61.21");
        assert_eq!(v["regionalComplexity"], "40.00");
        assert!(v.get("openness").is_none());
    }

    #[test]
    fn test_classification_wire_format() {
        let c = Classification {
            power_tier: PowerTier::MajorPower,
            influence_bloc: InfluenceBloc::EuropeanUnion,
            market_asset: MarketAsset::DiversifiedEquity,
            is_hub: true,
            is_fragile: false,
            is_pivot: false,
        };
        let v = serde_json::to_value(c).unwrap();
        assert_eq!(v["powerTier"], "MajorPower");
        assert_eq!(v["influenceBloc"], "EuropeanUnion");
        assert_eq!(v["marketAsset"], "diversified equity indices");
        assert_eq!(v["isHub"], true);
    }

    #[test]
    fn test_density() {
        let attrs = AttributeSet {
            id: "X".into(),
            name: "X".into(),
            population: 1000,
            area: 4.0,
            neighbor_codes: vec![],
            region: String::new(),
            subregion: String::new(),
            is_landlocked: false,
            language_count: 1,
            currency_codes: vec!["N/A".into()],
        };
        assert_eq!(attrs.density(), 250.0);
        assert_eq!(attrs.neighbor_count(), 0);
    }
}
