//! Categorical labels. Every rule table is evaluated top to bottom and the
//! first satisfied rule wins; later, broader rules act as defaults.

use posture_core::{AttributeSet, Classification, IndexSet, InfluenceBloc, MarketAsset, PowerTier};

const SUPERPOWER_POPULATION: u64 = 100_000_000;
const MAJOR_POWER_POPULATION: u64 = 10_000_000;
const HUB_OPENNESS: f64 = 70.0;
const FRAGILE_VULNERABILITY: f64 = 60.0;
const PIVOT_CENTRALITY: f64 = 50.0;
const PIVOT_AREA_LIMIT: f64 = 500_000.0;

enum Matcher {
    Name(&'static [&'static str]),
    Subregion(&'static [&'static str]),
}

impl Matcher {
    fn matches(&self, attrs: &AttributeSet) -> bool {
        let (candidates, value) = match self {
            Matcher::Name(names) => (names, attrs.name.trim()),
            Matcher::Subregion(subregions) => (subregions, attrs.subregion.trim()),
        };
        candidates.iter().any(|c| c.eq_ignore_ascii_case(value))
    }
}

const INFLUENCE_RULES: &[(Matcher, InfluenceBloc)] = &[
    (
        Matcher::Name(&["United States", "Canada", "United Kingdom", "Turkey", "Norway"]),
        InfluenceBloc::AtlanticAlliance,
    ),
    (
        Matcher::Name(&[
            "China",
            "Russia",
            "India",
            "Brazil",
            "South Africa",
            "Iran",
            "Egypt",
            "Ethiopia",
            "United Arab Emirates",
        ]),
        InfluenceBloc::BricsPlus,
    ),
    (
        Matcher::Name(&[
            "Saudi Arabia",
            "United Arab Emirates",
            "Qatar",
            "Kuwait",
            "Bahrain",
            "Oman",
        ]),
        InfluenceBloc::GulfCooperation,
    ),
    (
        Matcher::Subregion(&[
            "Western Europe",
            "Northern Europe",
            "Southern Europe",
            "Central Europe",
        ]),
        InfluenceBloc::EuropeanUnion,
    ),
    (
        Matcher::Subregion(&["Eastern Europe", "Central Asia"]),
        InfluenceBloc::EurasianSphere,
    ),
    (Matcher::Subregion(&["South-Eastern Asia"]), InfluenceBloc::Asean),
    (
        Matcher::Subregion(&[
            "Northern Africa",
            "Western Africa",
            "Eastern Africa",
            "Middle Africa",
            "Southern Africa",
        ]),
        InfluenceBloc::AfricanUnion,
    ),
    (
        Matcher::Subregion(&["South America", "Central America", "Caribbean"]),
        InfluenceBloc::LatinAmerican,
    ),
];

struct AssetRule {
    region: Option<&'static str>,
    landlocked: Option<bool>,
    min_population: Option<u64>,
    asset: MarketAsset,
}

impl AssetRule {
    fn matches(&self, attrs: &AttributeSet) -> bool {
        self.region.map_or(true, |r| r.eq_ignore_ascii_case(attrs.region.trim()))
            && self.landlocked.map_or(true, |l| l == attrs.is_landlocked)
            && self.min_population.map_or(true, |p| attrs.population > p)
    }
}

const ASSET_RULES: &[AssetRule] = &[
    AssetRule {
        region: Some("Americas"),
        landlocked: None,
        min_population: Some(100_000_000),
        asset: MarketAsset::UsTreasuries,
    },
    AssetRule {
        region: Some("Asia"),
        landlocked: None,
        min_population: Some(100_000_000),
        asset: MarketAsset::EmergingEquities,
    },
    AssetRule {
        region: Some("Asia"),
        landlocked: Some(false),
        min_population: None,
        asset: MarketAsset::CrudeOil,
    },
    AssetRule {
        region: Some("Europe"),
        landlocked: None,
        min_population: Some(10_000_000),
        asset: MarketAsset::EuroBonds,
    },
    AssetRule {
        region: Some("Africa"),
        landlocked: Some(true),
        min_population: None,
        asset: MarketAsset::FrontierDebt,
    },
    AssetRule {
        region: Some("Africa"),
        landlocked: None,
        min_population: None,
        asset: MarketAsset::IndustrialMetals,
    },
    AssetRule {
        region: Some("Americas"),
        landlocked: None,
        min_population: None,
        asset: MarketAsset::Agricultural,
    },
    AssetRule {
        region: None,
        landlocked: Some(true),
        min_population: None,
        asset: MarketAsset::Gold,
    },
];

pub fn power_tier(attrs: &AttributeSet) -> PowerTier {
    if attrs.population > SUPERPOWER_POPULATION {
        PowerTier::Superpower
    } else if attrs.population > MAJOR_POWER_POPULATION {
        PowerTier::MajorPower
    } else {
        PowerTier::SmallState
    }
}

pub fn influence_bloc(attrs: &AttributeSet) -> InfluenceBloc {
    INFLUENCE_RULES
        .iter()
        .find(|(matcher, _)| matcher.matches(attrs))
        .map(|(_, bloc)| *bloc)
        .unwrap_or(InfluenceBloc::Neutral)
}

pub fn market_asset(attrs: &AttributeSet) -> MarketAsset {
    ASSET_RULES
        .iter()
        .find(|rule| rule.matches(attrs))
        .map(|rule| rule.asset)
        .unwrap_or(MarketAsset::DiversifiedEquity)
}

pub struct ClassificationEngine;

impl ClassificationEngine {
    pub fn classify(attrs: &AttributeSet, indices: &IndexSet) -> Classification {
        Classification {
            power_tier: power_tier(attrs),
            influence_bloc: influence_bloc(attrs),
            market_asset: market_asset(attrs),
            is_hub: indices.openness.is_some_and(|o| o > HUB_OPENNESS),
            is_fragile: indices.vulnerability > FRAGILE_VULNERABILITY,
            is_pivot: indices.centrality > PIVOT_CENTRALITY && attrs.area < PIVOT_AREA_LIMIT,
        }
    }
}
