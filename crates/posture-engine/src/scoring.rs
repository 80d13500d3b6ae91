//! Composite index derivation.
//!
//! Every index is a bounded, monotone combination of a handful of raw
//! attributes, scaled by the process-wide [`LearningState`]. Which indices
//! are produced depends on the configured [`FormulaVersion`].

use posture_core::{AttributeSet, FormulaVersion, IndexName, IndexSet, LearningState};

const AGILITY_HUB: f64 = 85.0;
const AGILITY_BASE: f64 = 40.0;
const PIVOT_AREA_LIMIT: f64 = 500_000.0;
const DENSE_THRESHOLD: f64 = 400.0;
const DEFAULT_REGIONAL_PRESSURE: f64 = 50.0;

const V5_TABLE: &[IndexName] = &[
    IndexName::Power,
    IndexName::Domino,
    IndexName::Agility,
    IndexName::Vulnerability,
    IndexName::Centrality,
];

const V6_TABLE: &[IndexName] = &[
    IndexName::Power,
    IndexName::Domino,
    IndexName::Agility,
    IndexName::Vulnerability,
    IndexName::Centrality,
    IndexName::Openness,
    IndexName::RegionalComplexity,
];

/// Pressure weight per subregion. Subregions not listed score 50.
const REGIONAL_PRESSURE: &[(&str, f64)] = &[
    ("Western Asia", 90.0),
    ("Middle East", 90.0),
    ("Eastern Europe", 80.0),
    ("Eastern Asia", 75.0),
    ("Southern Asia", 75.0),
    ("Central Asia", 70.0),
    ("Northern Africa", 70.0),
    ("Middle Africa", 70.0),
    ("Western Africa", 65.0),
    ("Eastern Africa", 65.0),
    ("South-Eastern Asia", 60.0),
    ("Southeast Europe", 60.0),
    ("Central America", 55.0),
    ("Southern Africa", 55.0),
    ("South America", 45.0),
    ("Southern Europe", 45.0),
    ("Central Europe", 45.0),
    ("Western Europe", 40.0),
    ("Caribbean", 40.0),
    ("Northern Europe", 35.0),
    ("North America", 30.0),
    ("Melanesia", 30.0),
    ("Micronesia", 30.0),
    ("Polynesia", 30.0),
    ("Australia and New Zealand", 25.0),
];

/// Indices produced by a formula revision, in report order.
pub fn formula_table(version: FormulaVersion) -> &'static [IndexName] {
    match version {
        FormulaVersion::V5 => V5_TABLE,
        FormulaVersion::V6 => V6_TABLE,
    }
}

fn bounded(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

pub fn power(attrs: &AttributeSet, learning: &LearningState) -> f64 {
    if attrs.population == 0 {
        return 0.0;
    }
    let raw = (attrs.population as f64 + 1.0).log10() * 7.0 + (attrs.area + 1.0).log10() * 3.0;
    bounded(raw * learning.reliability_index)
}

/// Unbounded above; conventionally read against 5 and 6.
pub fn domino(attrs: &AttributeSet, learning: &LearningState) -> f64 {
    let n = attrs.neighbor_count();
    if n == 0 || attrs.population == 0 {
        return 0.0;
    }
    let raw = (attrs.population as f64).log10() * n as f64 / 2.0;
    let value = raw * learning.bias_multipliers.domino;
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

/// Step function: coastal, compact and connected entities are hubs.
pub fn agility(attrs: &AttributeSet) -> f64 {
    if !attrs.is_landlocked && attrs.area < PIVOT_AREA_LIMIT && attrs.neighbor_count() >= 2 {
        AGILITY_HUB
    } else {
        AGILITY_BASE
    }
}

pub fn vulnerability(attrs: &AttributeSet, learning: &LearningState) -> f64 {
    let mut raw = if attrs.is_landlocked { 35.0 } else { 5.0 };
    if attrs.neighbor_count() > 5 {
        raw += 25.0;
    }
    if attrs.density() > DENSE_THRESHOLD {
        raw += 20.0;
    }
    bounded(raw * learning.bias_multipliers.vulnerability)
}

pub fn centrality(attrs: &AttributeSet, learning: &LearningState) -> f64 {
    let raw = (attrs.population as f64 + 1.0).log10() * 4.0 + attrs.neighbor_count() as f64 * 5.0;
    bounded(raw * learning.bias_multipliers.centrality)
}

pub fn openness(attrs: &AttributeSet) -> f64 {
    let sea = if attrs.is_landlocked { 10.0 } else { 40.0 };
    bounded(sea + attrs.language_count as f64 * 10.0 + attrs.neighbor_count() as f64 * 5.0)
}

pub fn regional_complexity(subregion: &str) -> f64 {
    let key = subregion.trim();
    REGIONAL_PRESSURE
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(key))
        .map(|(_, weight)| *weight)
        .unwrap_or(DEFAULT_REGIONAL_PRESSURE)
}

/// Pure scoring over a fixed calibration.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    learning: LearningState,
    version: FormulaVersion,
}

impl ScoringEngine {
    pub fn new(learning: LearningState, version: FormulaVersion) -> Self {
        Self { learning, version }
    }

    pub fn learning(&self) -> &LearningState {
        &self.learning
    }

    pub fn version(&self) -> FormulaVersion {
        self.version
    }

    pub fn score(&self, attrs: &AttributeSet) -> IndexSet {
        let table = formula_table(self.version);
        let includes = |name: IndexName| table.contains(&name);

        IndexSet {
            power: power(attrs, &self.learning),
            domino: domino(attrs, &self.learning),
            agility: agility(attrs),
            vulnerability: vulnerability(attrs, &self.learning),
            centrality: centrality(attrs, &self.learning),
            openness: includes(IndexName::Openness).then(|| openness(attrs)),
            regional_complexity: includes(IndexName::RegionalComplexity)
                .then(|| regional_complexity(&attrs.subregion)),
        }
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new(LearningState::default(), FormulaVersion::default())
    }
}
