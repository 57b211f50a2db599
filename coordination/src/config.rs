//! Engine configuration.
//!
//! Every tunable the debate engine and research store need is passed in
//! through [`EngineConfig`]; nothing reads process globals after
//! construction. Defaults come from the environment (`OLLAMA_HOST`,
//! `OLLAMA_MODEL`) and can be overridden from a TOML file:
//!
//! ```toml
//! [backend]
//! model = "llama3:8b"
//!
//! [debate]
//! max_rounds = 4
//! consensus_threshold = 7.5
//!
//! [research]
//! cache_path = "/var/cache/techdoc/research_summaries.json"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::agent_profile::AgentRole;
use crate::error::ConfigError;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434/api/generate";
pub const DEFAULT_MODEL: &str = "llama2-uncensored:7b";

/// Generation backend endpoint and call limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Full URL of the generate endpoint.
    pub endpoint: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Wall-clock limit for one reviewer call.
    pub timeout_secs: u64,
    /// Wall-clock limit for the synthesis and draft calls.
    pub synthesis_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: 120,
            synthesis_timeout_secs: 180,
        }
    }
}

impl BackendConfig {
    /// Defaults with `OLLAMA_HOST` / `OLLAMA_MODEL` applied.
    pub fn from_env() -> Self {
        Self {
            endpoint: std::env::var("OLLAMA_HOST").unwrap_or_else(|_| DEFAULT_ENDPOINT.into()),
            model: std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into()),
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn synthesis_timeout(&self) -> Duration {
        Duration::from_secs(self.synthesis_timeout_secs)
    }
}

/// Debate loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebateConfig {
    /// Upper bound on rounds per session.
    pub max_rounds: u32,
    /// Consensus score that ends the debate (once past the minimum rounds).
    pub consensus_threshold: f64,
    /// Sampling temperature for reviewer calls.
    pub agent_temperature: f64,
    /// Sampling temperature for the synthesis call. Lower than the reviewers'.
    pub synthesis_temperature: f64,
    /// Final consensus below this raises a low-quality warning.
    pub quality_floor: f64,
    /// Participating reviewers, in invocation order.
    pub roles: Vec<AgentRole>,
}

impl Default for DebateConfig {
    fn default() -> Self {
        Self {
            max_rounds: 3,
            consensus_threshold: 8.0,
            agent_temperature: 0.6,
            synthesis_temperature: 0.4,
            quality_floor: 7.0,
            roles: AgentRole::all().to_vec(),
        }
    }
}

/// Research summary cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchConfig {
    /// Location of the aggregate JSON document.
    pub cache_path: PathBuf,
    /// Age threshold used by cleanup passes.
    pub max_age_days: u32,
    /// Raw snippets kept per summary for later re-derivation.
    pub max_retained_snippets: usize,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            cache_path: PathBuf::from("/tmp/research_summaries/research_summaries.json"),
            max_age_days: 30,
            max_retained_snippets: 5,
        }
    }
}

/// Initial-draft settings for the generate-then-debate pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub draft_temperature: f64,
    /// Extra attempts after the first failed draft call.
    pub draft_retries: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            draft_temperature: 0.7,
            draft_retries: 0,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub backend: BackendConfig,
    pub debate: DebateConfig,
    pub research: ResearchConfig,
    pub pipeline: PipelineConfig,
}

impl EngineConfig {
    /// Defaults with environment overrides applied to the backend section.
    pub fn from_env() -> Self {
        Self {
            backend: BackendConfig::from_env(),
            ..Self::default()
        }
    }

    /// Parse and validate a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&raw)
            .with_context(|| format!("Failed to load config file {}", path.display()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let debate = &self.debate;
        if !(0.0..=10.0).contains(&debate.consensus_threshold) {
            return Err(ConfigError::invalid(format!(
                "consensus_threshold {} outside [0, 10]",
                debate.consensus_threshold
            )));
        }
        if !(0.0..=10.0).contains(&debate.quality_floor) {
            return Err(ConfigError::invalid(format!(
                "quality_floor {} outside [0, 10]",
                debate.quality_floor
            )));
        }
        for (name, value) in [
            ("agent_temperature", debate.agent_temperature),
            ("synthesis_temperature", debate.synthesis_temperature),
            ("draft_temperature", self.pipeline.draft_temperature),
        ] {
            if !(0.0..=2.0).contains(&value) {
                return Err(ConfigError::invalid(format!(
                    "{} {} outside [0, 2]",
                    name, value
                )));
            }
        }
        if debate.max_rounds == 0 {
            return Err(ConfigError::invalid("max_rounds must be at least 1"));
        }
        if debate.roles.is_empty() {
            return Err(ConfigError::invalid("at least one reviewer role is required"));
        }
        if self.backend.timeout_secs == 0 || self.backend.synthesis_timeout_secs == 0 {
            return Err(ConfigError::invalid("backend timeouts must be non-zero"));
        }
        if self.research.max_retained_snippets == 0 {
            return Err(ConfigError::invalid(
                "max_retained_snippets must be at least 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.debate.max_rounds, 3);
        assert_eq!(config.debate.roles.len(), 6);
        assert!(config.debate.synthesis_temperature < config.debate.agent_temperature);
        assert_eq!(config.backend.timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            [backend]
            model = "llama3:8b"

            [debate]
            max_rounds = 4
            roles = ["security_analyst", "content_critic"]
            "#,
        )
        .unwrap();

        assert_eq!(config.backend.model, "llama3:8b");
        assert_eq!(config.backend.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.debate.max_rounds, 4);
        assert!((config.debate.consensus_threshold - 8.0).abs() < f64::EPSILON);
        assert_eq!(
            config.debate.roles,
            vec![AgentRole::SecurityAnalyst, AgentRole::ContentCritic]
        );
        assert_eq!(config.research.max_retained_snippets, 5);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let err = EngineConfig::from_toml_str("[debate]\nconsensus_threshold = 12.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_empty_roles_rejected() {
        let err = EngineConfig::from_toml_str("[debate]\nroles = []\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_zero_rounds_rejected() {
        let err = EngineConfig::from_toml_str("[debate]\nmax_rounds = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_malformed_toml() {
        let err = EngineConfig::from_toml_str("[debate\nmax_rounds = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        std::fs::write(&path, "[research]\nmax_age_days = 7\n").unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.research.max_age_days, 7);

        let missing = EngineConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(
            missing.downcast_ref::<ConfigError>(),
            Some(ConfigError::Io(_))
        ));

        std::fs::write(&path, "[debate]\nmax_rounds = 0\n").unwrap();
        let invalid = EngineConfig::load(&path).unwrap_err();
        assert!(matches!(
            invalid.downcast_ref::<ConfigError>(),
            Some(ConfigError::Invalid { .. })
        ));
    }
}
