use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use thiserror::Error;

use crate::domain::models::QaConfig;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid max_cost_usd: {0}. Must be positive")]
    InvalidMaxCost(f64),

    #[error("Invalid warn_cost_usd: {0}. Must be positive and <= max_cost_usd ({1})")]
    InvalidWarnCost(f64, f64),

    #[error("Invalid session_timeout_minutes: {0}. Must be at least 1")]
    InvalidSessionTimeout(u64),

    #[error("Invalid agent_timeout_seconds: {0}. Must be at least 1")]
    InvalidAgentTimeout(u64),

    #[error("Invalid high_risk_threshold: {0}. Must be within 0.0..=1.0")]
    InvalidRiskThreshold(f64),

    #[error("Invalid endpoint cap for {0}: must be at least 1")]
    InvalidEndpointCap(&'static str),

    #[error("base_url cannot be empty")]
    EmptyBaseUrl,

    #[error("qa_root cannot be empty")]
    EmptyQaRoot,
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .swarm/qa/config.yaml (project config)
    /// 3. Environment variables (QASWARM_* prefix, highest priority)
    ///
    /// Configuration is always project-local (pwd/.swarm/qa/) so separate
    /// checkouts keep separate QA state.
    pub fn load() -> Result<QaConfig> {
        let config: QaConfig = Figment::new()
            .merge(Serialized::defaults(QaConfig::default()))
            .merge(Yaml::file(".swarm/qa/config.yaml"))
            .merge(Env::prefixed("QASWARM_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<QaConfig> {
        let config: QaConfig = Figment::new()
            .merge(Serialized::defaults(QaConfig::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &QaConfig) -> Result<(), ConfigError> {
        if config.qa_root.is_empty() {
            return Err(ConfigError::EmptyQaRoot);
        }

        if config.base_url.is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }

        let limits = &config.limits;
        if limits.max_cost_usd <= 0.0 {
            return Err(ConfigError::InvalidMaxCost(limits.max_cost_usd));
        }

        if limits.warn_cost_usd <= 0.0 || limits.warn_cost_usd > limits.max_cost_usd {
            return Err(ConfigError::InvalidWarnCost(
                limits.warn_cost_usd,
                limits.max_cost_usd,
            ));
        }

        if limits.session_timeout_minutes == 0 {
            return Err(ConfigError::InvalidSessionTimeout(
                limits.session_timeout_minutes,
            ));
        }

        if config.agent_timeout_seconds == 0 {
            return Err(ConfigError::InvalidAgentTimeout(
                config.agent_timeout_seconds,
            ));
        }

        let caps = &limits.endpoint_caps;
        for (name, cap) in [
            ("shallow", caps.shallow),
            ("standard", caps.standard),
            ("deep", caps.deep),
            ("regression", caps.regression),
            ("semantic", caps.semantic),
        ] {
            if cap == 0 {
                return Err(ConfigError::InvalidEndpointCap(name));
            }
        }

        let threshold = config.selector.high_risk_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::InvalidRiskThreshold(threshold));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = QaConfig::default();
        assert!(ConfigLoader::validate(&config).is_ok());
    }

    #[test]
    fn test_warn_cost_above_max_is_rejected() {
        let mut config = QaConfig::default();
        config.limits.warn_cost_usd = config.limits.max_cost_usd + 1.0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidWarnCost(_, _))
        ));
    }

    #[test]
    fn test_zero_endpoint_cap_is_rejected() {
        let mut config = QaConfig::default();
        config.limits.endpoint_caps.deep = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidEndpointCap("deep"))
        ));
    }

    #[test]
    fn test_risk_threshold_bounds() {
        let mut config = QaConfig::default();
        config.selector.high_risk_threshold = 1.5;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidRiskThreshold(_))
        ));
    }

    #[test]
    fn test_load_from_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "base_url: http://localhost:8080\nlimits:\n  max_cost_usd: 10.0\n",
        )
        .unwrap();

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert!((config.limits.max_cost_usd - 10.0).abs() < f64::EPSILON);
        // Untouched fields keep their defaults.
        assert!((config.limits.warn_cost_usd - 3.0).abs() < f64::EPSILON);
    }
}
