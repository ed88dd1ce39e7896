use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::PricingError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    pub decay: f64,
    pub outlier_sigma: f64,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            decay: 0.9,
            outlier_sigma: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    pub default_cpm_weight: f64,
    pub default_cpa_weight: f64,
    pub band_low: f64,
    pub band_high: f64,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            default_cpm_weight: 0.7,
            default_cpa_weight: 0.3,
            band_low: 0.85,
            band_high: 1.15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankerConfig {
    pub cpm_weight: f64,
    pub cpa_weight: f64,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            cpm_weight: 0.6,
            cpa_weight: 0.4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub decay: f64,
    pub grace_days: i64,
    pub max_decay_steps: i32,
    pub cpm_weight: f64,
    pub cpa_weight: f64,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            decay: 0.9,
            grace_days: 7,
            max_decay_steps: 4,
            cpm_weight: 0.7,
            cpa_weight: 0.3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub creators_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            creators_path: PathBuf::from("data/creators.json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub predictor: PredictorConfig,
    pub composer: ComposerConfig,
    pub ranker: RankerConfig,
    pub theme: ThemeConfig,
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

impl PricingConfig {
    /// Loads the TOML file at `path` (or the default location), then applies
    /// environment overrides. A missing file yields the defaults.
    pub fn load(path: Option<PathBuf>) -> Result<(Self, Option<PathBuf>), PricingError> {
        Self::load_with(path, |key| env::var(key).ok())
    }

    fn load_with<F>(
        path: Option<PathBuf>,
        lookup: F,
    ) -> Result<(Self, Option<PathBuf>), PricingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config_path = path.or_else(|| default_config_path(&lookup));
        let mut config = match config_path.as_ref() {
            Some(path) if path.exists() => {
                let contents = std::fs::read_to_string(path).map_err(|err| {
                    PricingError::Config(format!("failed to read {}: {}", path.display(), err))
                })?;
                Self::from_toml(&contents)?
            }
            _ => PricingConfig::default(),
        };

        config.apply_overrides(&lookup)?;
        config.validate()?;
        Ok((config, config_path))
    }

    pub fn from_toml(contents: &str) -> Result<Self, PricingError> {
        toml::from_str(contents)
            .map_err(|err| PricingError::Config(format!("failed to parse config: {}", err)))
    }

    pub fn write(&self, path: &Path) -> Result<(), PricingError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|err| {
                PricingError::Config(format!("failed to create config dir: {}", err))
            })?;
        }
        let payload = toml::to_string_pretty(self)
            .map_err(|err| PricingError::Config(format!("failed to serialize config: {}", err)))?;
        std::fs::write(path, payload)
            .map_err(|err| PricingError::Config(format!("failed to write config: {}", err)))
    }

    fn apply_overrides<F>(&mut self, lookup: &F) -> Result<(), PricingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = parse_f64(lookup, "PRICING_OUTLIER_SIGMA")? {
            self.predictor.outlier_sigma = value;
        }
        if let Some(value) = parse_f64(lookup, "PRICING_DECAY")? {
            self.predictor.decay = value;
        }
        if let Some(value) = parse_f64(lookup, "PRICING_RANKER_CPM_WEIGHT")? {
            self.ranker.cpm_weight = value;
        }
        if let Some(value) = parse_f64(lookup, "PRICING_RANKER_CPA_WEIGHT")? {
            self.ranker.cpa_weight = value;
        }
        if let Some(path) = non_empty(lookup, "PRICING_CREATORS_PATH") {
            self.store.creators_path = PathBuf::from(path);
        }
        if let Some(level) = non_empty(lookup, "PRICING_LOG_LEVEL") {
            self.logging.level = level;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), PricingError> {
        let unit = |name: &str, value: f64| -> Result<(), PricingError> {
            if value.is_finite() && (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(PricingError::Config(format!("{} must be within 0..=1, got {}", name, value)))
            }
        };
        unit("predictor.decay", self.predictor.decay)?;
        unit("theme.decay", self.theme.decay)?;
        unit("composer.default_cpm_weight", self.composer.default_cpm_weight)?;
        unit("composer.default_cpa_weight", self.composer.default_cpa_weight)?;
        unit("ranker.cpm_weight", self.ranker.cpm_weight)?;
        unit("ranker.cpa_weight", self.ranker.cpa_weight)?;
        unit("theme.cpm_weight", self.theme.cpm_weight)?;
        unit("theme.cpa_weight", self.theme.cpa_weight)?;
        if !(self.predictor.outlier_sigma.is_finite() && self.predictor.outlier_sigma > 0.0) {
            return Err(PricingError::Config(format!(
                "predictor.outlier_sigma must be positive, got {}",
                self.predictor.outlier_sigma
            )));
        }
        if self.composer.band_low > 1.0 || self.composer.band_high < 1.0 {
            return Err(PricingError::Config(
                "composer band must straddle 1.0 (band_low <= 1.0 <= band_high)".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_config_path<F>(lookup: &F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup, "PRICING_CONFIG_PATH")
        .map(PathBuf::from)
        .or_else(|| Some(PathBuf::from("config/pricing.toml")))
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|value| !value.trim().is_empty())
}

fn parse_f64<F>(lookup: &F, key: &str) -> Result<Option<f64>, PricingError>
where
    F: Fn(&str) -> Option<String>,
{
    match non_empty(lookup, key) {
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|err| PricingError::Config(format!("{}: {}", key, err))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_file_yields_defaults() {
        let path = env::temp_dir().join("collab-pricing-missing-config.toml");
        let (config, resolved) = PricingConfig::load_with(Some(path.clone()), lookup_from(&[]))
            .expect("defaults load");
        assert_eq!(resolved, Some(path));
        assert_eq!(config.predictor.decay, 0.9);
        assert_eq!(config.composer.default_cpm_weight, 0.7);
        assert_eq!(config.ranker.cpa_weight, 0.4);
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = PricingConfig::from_toml("[ranker]\ncpm_weight = 0.5\n").expect("parse");
        assert_eq!(config.ranker.cpm_weight, 0.5);
        assert_eq!(config.ranker.cpa_weight, 0.4);
        assert_eq!(config.predictor.outlier_sigma, 2.0);
    }

    #[test]
    fn env_overrides_apply() {
        let path = env::temp_dir().join("collab-pricing-missing-config.toml");
        let lookup = lookup_from(&[
            ("PRICING_OUTLIER_SIGMA", "3"),
            ("PRICING_CREATORS_PATH", "/tmp/pool.json"),
            ("PRICING_LOG_LEVEL", "debug"),
        ]);
        let (config, _) = PricingConfig::load_with(Some(path), lookup).expect("load");
        assert_eq!(config.predictor.outlier_sigma, 3.0);
        assert_eq!(config.store.creators_path, PathBuf::from("/tmp/pool.json"));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn malformed_override_is_a_config_error() {
        let path = env::temp_dir().join("collab-pricing-missing-config.toml");
        let err = PricingConfig::load_with(Some(path), lookup_from(&[("PRICING_DECAY", "fast")]))
            .expect_err("must fail");
        assert_eq!(err.kind(), "config_error");
    }

    #[test]
    fn out_of_range_weight_is_rejected() {
        let path = env::temp_dir().join("collab-pricing-missing-config.toml");
        let err = PricingConfig::load_with(
            Some(path),
            lookup_from(&[("PRICING_RANKER_CPM_WEIGHT", "1.5")]),
        )
        .expect_err("must fail");
        assert!(err.to_string().contains("ranker.cpm_weight"));
    }

    #[test]
    fn write_then_load_round_trips() {
        let path = env::temp_dir().join(format!(
            "collab-pricing-config-{}.toml",
            std::process::id()
        ));
        let mut config = PricingConfig::default();
        config.theme.grace_days = 10;
        config.write(&path).expect("write");
        let (loaded, _) = PricingConfig::load_with(Some(path.clone()), lookup_from(&[]))
            .expect("load");
        assert_eq!(loaded.theme.grace_days, 10);
        let _ = std::fs::remove_file(path);
    }
}
