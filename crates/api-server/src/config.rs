use anyhow::Context;
use intel_client::IntelConfig;
use posture_core::{BiasMultipliers, FormulaVersion, LearningState};
use std::collections::HashMap;
use std::net::SocketAddr;

/// Server settings, read once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub directory_url: String,
    pub intel: IntelConfig,
    pub learning: LearningState,
    pub formula_version: FormulaVersion,
    pub enable_hsts: bool,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_source(|key| std::env::var(key).ok())
    }

    pub fn from_map(values: &HashMap<String, String>) -> anyhow::Result<Self> {
        Self::from_source(|key| values.get(key).cloned())
    }

    /// Build from any key lookup. Unset keys take their defaults; set but
    /// unparseable keys are an error.
    pub fn from_source<F>(get: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let parse_f64 = |key: &str, default: f64| -> anyhow::Result<f64> {
            match var(key) {
                Some(v) => v
                    .parse::<f64>()
                    .with_context(|| format!("{} must be a number, got '{}'", key, v)),
                None => Ok(default),
            }
        };

        let bind_addr = var("BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0:3000".to_string())
            .parse::<SocketAddr>()
            .context("BIND_ADDR must be a socket address")?;

        let defaults = LearningState::default();
        let bias = BiasMultipliers {
            domino: parse_f64("LEARNING_DOMINO_BIAS", defaults.bias_multipliers.domino)?,
            vulnerability: parse_f64(
                "LEARNING_VULNERABILITY_BIAS",
                defaults.bias_multipliers.vulnerability,
            )?,
            centrality: parse_f64(
                "LEARNING_CENTRALITY_BIAS",
                defaults.bias_multipliers.centrality,
            )?,
        };
        let learning = LearningState::new(
            var("LEARNING_VERSION").unwrap_or(defaults.version),
            parse_f64("LEARNING_RELIABILITY_INDEX", defaults.reliability_index)?,
            bias,
        )
        .context("invalid calibration")?;

        let formula_version = match var("POSTURE_FORMULA_VERSION") {
            Some(v) => v.parse::<FormulaVersion>().context("invalid POSTURE_FORMULA_VERSION")?,
            None => FormulaVersion::default(),
        };

        let intel = IntelConfig {
            reasoning_url: var("REASONING_BASE_URL")
                .unwrap_or_else(|| "https://api.deepseek.com".to_string()),
            reasoning_api_key: var("REASONING_API_KEY").or_else(|| var("DEEPSEEK_API_KEY")),
            reasoning_model: var("REASONING_MODEL").unwrap_or_else(|| "deepseek-chat".to_string()),
            headlines_url: var("HEADLINES_BASE_URL")
                .unwrap_or_else(|| "https://newsapi.org/v2".to_string()),
            headlines_api_key: var("NEWS_API_KEY"),
        };

        let enable_hsts = var("ENABLE_HSTS")
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(false);

        Ok(Self {
            bind_addr,
            directory_url: var("DIRECTORY_BASE_URL")
                .unwrap_or_else(|| directory_client::DEFAULT_BASE_URL.to_string()),
            intel,
            learning,
            formula_version,
            enable_hsts,
        })
    }
}
