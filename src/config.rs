//! Pipeline configuration
//!
//! Loaded from YAML; every section has defaults so a partial file is valid.
//!
//! ```yaml
//! propagation:
//!   intensity: 1.2
//!   weighting: incident_usage
//! consensus:
//!   trials: 10
//!   frequency_ratio: 0.5
//!   merge_threshold: 0.5
//!   rng_seed: 7
//! tracing:
//!   similarity_threshold: 0.5
//!   cohort_targets: [5, 10, 20, 100]
//! seeding:
//!   measure: page_rank
//!   blend: { kind: linear, a: 0.5, b: 0.5 }
//!   k: [5, 10, 20, 100]
//! ```

use crate::graph::Weighting;
use crate::lineage::CohortBuckets;
use crate::scoring::{Blend, ScoringMeasure};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropagationConfig {
    /// Rescaling factor `k`
    pub intensity: f64,
    /// Source of `W(v)` when no explicit weights are given
    pub weighting: Weighting,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            intensity: 1.2,
            weighting: Weighting::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsensusConfig {
    pub trials: usize,
    /// `r`: fraction of trials a vertex must appear in
    pub frequency_ratio: f64,
    /// `t`: overlap above which two seeds are merged
    pub merge_threshold: f64,
    /// Base seed for reproducible trials; entropy when absent
    pub rng_seed: Option<u64>,
    pub parallel: bool,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            trials: 10,
            frequency_ratio: 0.5,
            merge_threshold: 0.5,
            rng_seed: None,
            parallel: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracingConfig {
    /// `t2`: overlap above which a later topic continues a lineage
    pub similarity_threshold: f64,
    pub cohort_targets: Vec<usize>,
    pub allow_gaps: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.5,
            cohort_targets: CohortBuckets::default().targets().to_vec(),
            allow_gaps: true,
        }
    }
}

impl TracingConfig {
    pub fn buckets(&self) -> ConfigResult<CohortBuckets> {
        CohortBuckets::new(self.cohort_targets.iter().copied()).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedingConfig {
    pub measure: ScoringMeasure,
    pub blend: Blend,
    /// Seed-set sizes to produce per period
    pub k: Vec<usize>,
}

impl Default for SeedingConfig {
    fn default() -> Self {
        Self {
            measure: ScoringMeasure::PageRank,
            blend: Blend::None,
            k: vec![5, 10, 20, 100],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicflowConfig {
    pub propagation: PropagationConfig,
    pub consensus: ConsensusConfig,
    pub tracing: TracingConfig,
    pub seeding: SeedingConfig,
}

impl TopicflowConfig {
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let config: TopicflowConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let p = &self.propagation;
        if !p.intensity.is_finite() || p.intensity < 0.0 {
            return Err(invalid(format!("propagation.intensity must be finite and >= 0, got {}", p.intensity)));
        }

        let c = &self.consensus;
        if c.trials == 0 {
            return Err(invalid("consensus.trials must be at least 1".to_string()));
        }
        if !in_unit_interval_open_left(c.frequency_ratio) {
            return Err(invalid(format!("consensus.frequency_ratio must be in (0, 1], got {}", c.frequency_ratio)));
        }
        if !in_unit_interval_open_left(c.merge_threshold) {
            return Err(invalid(format!("consensus.merge_threshold must be in (0, 1], got {}", c.merge_threshold)));
        }

        let t = &self.tracing;
        if !(0.0..=1.0).contains(&t.similarity_threshold) {
            return Err(invalid(format!(
                "tracing.similarity_threshold must be in [0, 1], got {}",
                t.similarity_threshold
            )));
        }
        if t.cohort_targets.is_empty() || t.cohort_targets.contains(&0) {
            return Err(invalid("tracing.cohort_targets must be non-empty and positive".to_string()));
        }

        if self.seeding.k.contains(&0) {
            return Err(invalid("seeding.k entries must be positive".to_string()));
        }
        Ok(())
    }
}

fn in_unit_interval_open_left(x: f64) -> bool {
    x > 0.0 && x <= 1.0
}

fn invalid(message: String) -> ConfigError {
    ConfigError::Invalid(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TopicflowConfig::default();
        assert_eq!(config.propagation.intensity, 1.2);
        assert_eq!(config.consensus.trials, 10);
        assert_eq!(config.consensus.frequency_ratio, 0.5);
        assert_eq!(config.consensus.merge_threshold, 0.5);
        assert_eq!(config.tracing.similarity_threshold, 0.5);
        assert_eq!(config.tracing.cohort_targets, vec![5, 10, 20, 100]);
        assert!(config.tracing.allow_gaps);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml() {
        let config = TopicflowConfig::from_yaml_str(
            "consensus:\n  trials: 25\n  rng_seed: 9\nseeding:\n  measure: harmonic_closeness\n  blend: { kind: linear, a: 0.7, b: 0.3 }\n",
        )
        .unwrap();
        assert_eq!(config.consensus.trials, 25);
        assert_eq!(config.consensus.rng_seed, Some(9));
        assert_eq!(config.consensus.frequency_ratio, 0.5);
        assert_eq!(config.seeding.measure, ScoringMeasure::HarmonicCloseness);
        assert_eq!(config.seeding.blend, Blend::Linear { a: 0.7, b: 0.3 });
        assert_eq!(config.propagation.weighting, Weighting::IncidentUsage);
    }

    #[test]
    fn test_validation() {
        for yaml in [
            "propagation: { intensity: -1.0 }",
            "consensus: { trials: 0 }",
            "consensus: { frequency_ratio: 0.0 }",
            "consensus: { merge_threshold: 1.5 }",
            "tracing: { similarity_threshold: 2.0 }",
            "tracing: { cohort_targets: [] }",
        ] {
            assert!(
                matches!(TopicflowConfig::from_yaml_str(yaml), Err(ConfigError::Invalid(_))),
                "{yaml}"
            );
        }
        assert!(matches!(
            TopicflowConfig::from_yaml_str("consensus: [1, 2"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_yaml_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("topicflow.yaml");
        let mut config = TopicflowConfig::default();
        config.consensus.rng_seed = Some(3);
        std::fs::write(&path, config.to_yaml().unwrap()).unwrap();

        assert_eq!(TopicflowConfig::from_yaml_file(&path).unwrap(), config);
        assert!(matches!(
            TopicflowConfig::from_yaml_file(dir.path().join("missing.yaml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
