//! Narrative report assembly.
//!
//! A [`Report`] is an ordered list of [`Section`] values chosen from already
//! computed attributes, indices and labels. Threshold decisions are made when
//! the sections are built, so they can be inspected without parsing text;
//! rendering only formats.

use posture_core::{AttributeSet, Classification, IndexName, IndexSet, LearningState};
use std::fmt;

const RULE_WIDTH: usize = 48;
const GAUGE_SEGMENTS: usize = 10;
const CONTAGION_THRESHOLD: f64 = 5.0;
const SEVERE_CONTAGION_THRESHOLD: f64 = 6.0;

pub const REPORT_TITLE: &str = "STRATSCOPE // GEOPOLITICAL POSTURE REPORT";
pub const SIGNATURE: &str = "StratScope Strategic Intelligence";

/// Ten-segment proportional bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gauge {
    pub filled: usize,
    pub empty: usize,
}

impl Gauge {
    pub fn new(value: f64) -> Self {
        let filled = if value.is_finite() {
            (value / 10.0).floor().clamp(0.0, GAUGE_SEGMENTS as f64) as usize
        } else {
            0
        };
        Self {
            filled,
            empty: GAUGE_SEGMENTS - filled,
        }
    }
}

impl fmt::Display for Gauge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", "█".repeat(self.filled), "░".repeat(self.empty))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GaugeRow {
    pub index: IndexName,
    pub value: f64,
    pub gauge: Gauge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outlook {
    Stability,
    ContagionAlert,
    SevereContagion,
}

impl Outlook {
    pub fn from_domino(domino: f64) -> Self {
        if domino > SEVERE_CONTAGION_THRESHOLD {
            Outlook::SevereContagion
        } else if domino > CONTAGION_THRESHOLD {
            Outlook::ContagionAlert
        } else {
            Outlook::Stability
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Positioning {
    Hub,
    Pivot,
    HubAndPivot,
}

impl Positioning {
    pub fn from_flags(is_hub: bool, is_pivot: bool) -> Option<Self> {
        match (is_hub, is_pivot) {
            (true, true) => Some(Positioning::HubAndPivot),
            (true, false) => Some(Positioning::Hub),
            (false, true) => Some(Positioning::Pivot),
            (false, false) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    Banner,
    Identification {
        name: String,
        id: String,
        region: String,
        subregion: String,
        population: u64,
        area: f64,
        neighbor_count: usize,
        language_count: u32,
        currencies: Vec<String>,
    },
    IndexTable(Vec<GaugeRow>),
    Labels(Classification),
    Narrative {
        name: String,
        neighbor_count: usize,
        domino: f64,
        outlook: Outlook,
        fragile_at: Option<f64>,
        positioning: Option<Positioning>,
    },
    Footer {
        calibration: String,
        reliability: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    sections: Vec<Section>,
}

impl Report {
    pub fn build(
        attrs: &AttributeSet,
        indices: &IndexSet,
        classification: &Classification,
        learning: &LearningState,
    ) -> Self {
        let rows = indices
            .entries()
            .into_iter()
            .map(|(index, value)| GaugeRow {
                index,
                value,
                gauge: Gauge::new(value),
            })
            .collect();

        let sections = vec![
            Section::Banner,
            Section::Identification {
                name: attrs.name.clone(),
                id: attrs.id.clone(),
                region: attrs.region.clone(),
                subregion: attrs.subregion.clone(),
                population: attrs.population,
                area: attrs.area,
                neighbor_count: attrs.neighbor_count(),
                language_count: attrs.language_count,
                currencies: attrs.currency_codes.clone(),
            },
            Section::IndexTable(rows),
            Section::Labels(*classification),
            Section::Narrative {
                name: attrs.name.clone(),
                neighbor_count: attrs.neighbor_count(),
                domino: indices.domino,
                outlook: Outlook::from_domino(indices.domino),
                fragile_at: classification.is_fragile.then_some(indices.vulnerability),
                positioning: Positioning::from_flags(
                    classification.is_hub,
                    classification.is_pivot,
                ),
            },
            Section::Footer {
                calibration: learning.version.clone(),
                reliability: learning.reliability_index,
            },
        ];

        Self { sections }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn render(&self) -> String {
        self.sections
            .iter()
            .map(render_section)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn or_unknown(s: &str) -> &str {
    if s.is_empty() {
        "unclassified"
    } else {
        s
    }
}

fn render_section(section: &Section) -> String {
    match section {
        Section::Banner => {
            let rule = "═".repeat(RULE_WIDTH);
            format!("{rule}\n  {REPORT_TITLE}\n{rule}")
        }
        Section::Identification {
            name,
            id,
            region,
            subregion,
            population,
            area,
            neighbor_count,
            language_count,
            currencies,
        } => format!(
            "[ TARGET ]\n  Entity      : {name} ({id})\n  Region      : {} / {}\n  Population  : {}\n  Area        : {} km²\n  Borders     : {neighbor_count}\n  Languages   : {language_count}\n  Currencies  : {}",
            or_unknown(region),
            or_unknown(subregion),
            thousands(*population),
            thousands(area.round() as u64),
            currencies.join(", "),
        ),
        Section::IndexTable(rows) => {
            let mut out = String::from("[ INDICES ]");
            for row in rows {
                out.push_str(&format!(
                    "\n  {:<18} {} {:>7.2}",
                    row.index.label(),
                    row.gauge,
                    row.value
                ));
            }
            out
        }
        Section::Labels(c) => {
            let mut flags = Vec::new();
            if c.is_hub {
                flags.push("HUB");
            }
            if c.is_fragile {
                flags.push("FRAGILE");
            }
            if c.is_pivot {
                flags.push("PIVOT");
            }
            let flags = if flags.is_empty() {
                "none".to_string()
            } else {
                flags.join(" · ")
            };
            format!(
                "[ CLASSIFICATION ]\n  Power tier     : {}\n  Influence bloc : {}\n  Market asset   : {}\n  Flags          : {flags}",
                c.power_tier.label(),
                c.influence_bloc.label(),
                c.market_asset.label(),
            )
        }
        Section::Narrative {
            name,
            neighbor_count,
            domino,
            outlook,
            fragile_at,
            positioning,
        } => {
            let mut lines = vec!["[ ASSESSMENT ]".to_string()];
            lines.push(match outlook {
                Outlook::SevereContagion => format!(
                    "  SEVERE CONTAGION ALERT: a crisis in {name} would cascade across all {neighbor_count} bordering states (domino impact {domino:.2})."
                ),
                Outlook::ContagionAlert => format!(
                    "  CONTAGION ALERT: instability in {name} would propagate to its {neighbor_count} neighbors (domino impact {domino:.2})."
                ),
                Outlook::Stability => format!(
                    "  STABILITY: {name} shows limited spillover potential toward its neighbors (domino impact {domino:.2})."
                ),
            });
            if let Some(v) = fragile_at {
                lines.push(format!(
                    "  FRAGILITY WARNING: structural vulnerability stands at {v:.2}, above the tolerance threshold."
                ));
            }
            if let Some(p) = positioning {
                let role = match p {
                    Positioning::Hub => "an open logistics hub",
                    Positioning::Pivot => "a strategic pivot",
                    Positioning::HubAndPivot => "both an open logistics hub and a strategic pivot",
                };
                lines.push(format!("  POSITIONING: {name} operates as {role}."));
            }
            lines.join("\n")
        }
        Section::Footer {
            calibration,
            reliability,
        } => format!(
            "{}\n  End of report. Calibration {calibration}, reliability {reliability:.2}.\n  {SIGNATURE}",
            "─".repeat(RULE_WIDTH)
        ),
    }
}
