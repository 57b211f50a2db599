//! Research summary records and the batches that feed them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::extract::{extract_findings, key_insights};

/// Confidence contributed by each distinct source.
pub const SOURCE_WEIGHT: f64 = 0.5;
/// Confidence contributed by each raw snippet.
pub const SNIPPET_WEIGHT: f64 = 0.3;
pub const MAX_CONFIDENCE: f64 = 10.0;

/// A repository, post or paper found during research.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalSource {
    #[serde(alias = "title")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ExternalSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Display label, `Unknown` when the name is blank.
    pub fn label(&self) -> &str {
        if self.name.trim().is_empty() {
            "Unknown"
        } else {
            &self.name
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalFindings {
    pub repositories: Vec<ExternalSource>,
    pub posts: Vec<ExternalSource>,
    pub papers: Vec<ExternalSource>,
}

impl ExternalFindings {
    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty() && self.posts.is_empty() && self.papers.is_empty()
    }

    /// Append `other`, skipping entries already present.
    pub fn merge(&mut self, other: &ExternalFindings) {
        for (mine, theirs) in [
            (&mut self.repositories, &other.repositories),
            (&mut self.posts, &other.posts),
            (&mut self.papers, &other.papers),
        ] {
            for source in theirs {
                if !mine.contains(source) {
                    mine.push(source.clone());
                }
            }
        }
    }
}

/// Threat intelligence that cannot be derived from raw text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreatIntel {
    pub threat_actors: Vec<String>,
    pub campaigns: Vec<String>,
    pub malware_families: Vec<String>,
}

/// Input to a research pass.
#[derive(Debug, Clone, Default)]
pub struct ResearchBatch {
    pub raw_texts: Vec<String>,
    pub sources: Vec<String>,
    pub external: ExternalFindings,
    pub threat_intel: ThreatIntel,
}

impl ResearchBatch {
    pub fn new<T, S>(raw_texts: T, sources: S) -> Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
        S: IntoIterator,
        S::Item: Into<String>,
    {
        Self {
            raw_texts: raw_texts.into_iter().map(Into::into).collect(),
            sources: sources.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_external(mut self, external: ExternalFindings) -> Self {
        self.external = external;
        self
    }

    pub fn with_threat_intel(mut self, intel: ThreatIntel) -> Self {
        self.threat_intel = intel;
        self
    }
}

/// Distilled findings for one (subject, platform) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchSummary {
    pub subject: String,
    pub platform: String,
    pub last_updated: DateTime<Utc>,
    /// 0–10, never decreases across updates.
    pub confidence_score: f64,
    pub source_count: usize,

    pub key_insights: Vec<String>,
    pub tools_mentioned: Vec<String>,
    pub indicators_of_compromise: Vec<String>,
    pub detection_methods: Vec<String>,
    pub mitigation_strategies: Vec<String>,

    #[serde(default)]
    pub code_examples: Vec<String>,
    pub command_signatures: Vec<String>,
    #[serde(default)]
    pub file_artifacts: Vec<String>,
    #[serde(default)]
    pub registry_keys: Vec<String>,
    #[serde(default)]
    pub network_indicators: Vec<String>,

    #[serde(default)]
    pub threat_actors: Vec<String>,
    #[serde(default)]
    pub campaigns: Vec<String>,
    #[serde(default)]
    pub malware_families: Vec<String>,

    #[serde(default)]
    pub external: ExternalFindings,
    #[serde(default)]
    pub sources: Vec<String>,
    /// Most recent raw snippets, kept for re-derivation on update.
    #[serde(default)]
    pub raw_snippets: Vec<String>,
}

impl ResearchSummary {
    /// Storage key for a (subject, platform) pair.
    pub fn key(subject: &str, platform: &str) -> String {
        format!("{}_{}", subject, platform.to_lowercase())
    }

    pub fn storage_key(&self) -> String {
        Self::key(&self.subject, &self.platform)
    }

    /// Derive a fresh summary from a batch.
    ///
    /// Deterministic apart from `last_updated`. Sources count as given;
    /// [`merged_with`](Self::merged_with) deduplicates before calling this.
    /// Snippets beyond `max_snippets` are dropped from the retained list but
    /// still count towards confidence.
    pub fn derive(subject: &str, platform: &str, batch: &ResearchBatch, max_snippets: usize) -> Self {
        let combined = batch.raw_texts.join("\n\n");
        let findings = extract_findings(&combined);
        let sources = batch.sources.clone();

        let confidence_score = (sources.len() as f64 * SOURCE_WEIGHT
            + batch.raw_texts.len() as f64 * SNIPPET_WEIGHT)
            .min(MAX_CONFIDENCE);

        let skip = batch.raw_texts.len().saturating_sub(max_snippets);

        Self {
            subject: subject.to_string(),
            platform: platform.to_string(),
            last_updated: Utc::now(),
            confidence_score,
            source_count: sources.len(),
            key_insights: key_insights(&batch.raw_texts),
            tools_mentioned: findings.tools,
            indicators_of_compromise: findings.indicators,
            detection_methods: findings.detection_methods,
            mitigation_strategies: findings.mitigations,
            code_examples: findings.code_examples,
            command_signatures: findings.command_signatures,
            file_artifacts: findings.file_artifacts,
            registry_keys: findings.registry_keys,
            network_indicators: findings.network_indicators,
            threat_actors: union(&[], &batch.threat_intel.threat_actors),
            campaigns: union(&[], &batch.threat_intel.campaigns),
            malware_families: union(&[], &batch.threat_intel.malware_families),
            external: batch.external.clone(),
            sources,
            raw_snippets: batch.raw_texts[skip..].to_vec(),
        }
    }

    /// Re-derive from this record's retained snippets plus `batch`.
    pub fn merged_with(&self, batch: &ResearchBatch, max_snippets: usize) -> Self {
        let mut combined = ResearchBatch {
            raw_texts: self.raw_snippets.clone(),
            sources: self.sources.clone(),
            external: self.external.clone(),
            threat_intel: ThreatIntel {
                threat_actors: self.threat_actors.clone(),
                campaigns: self.campaigns.clone(),
                malware_families: self.malware_families.clone(),
            },
        };
        combined.raw_texts.extend(batch.raw_texts.iter().cloned());
        combined.sources = union(&combined.sources, &batch.sources);
        combined.external.merge(&batch.external);
        let intel = &mut combined.threat_intel;
        intel.threat_actors = union(&intel.threat_actors, &batch.threat_intel.threat_actors);
        intel.campaigns = union(&intel.campaigns, &batch.threat_intel.campaigns);
        intel.malware_families =
            union(&intel.malware_families, &batch.threat_intel.malware_families);

        let mut merged = Self::derive(&self.subject, &self.platform, &combined, max_snippets);
        merged.confidence_score = merged
            .confidence_score
            .max(self.confidence_score)
            .min(MAX_CONFIDENCE);
        merged
    }

    /// Age of the record relative to `now`.
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.last_updated
    }
}

/// Order-preserving union without duplicates.
fn union(existing: &[String], incoming: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(existing.len() + incoming.len());
    for item in existing.iter().chain(incoming) {
        if !out.contains(item) {
            out.push(item.clone());
        }
    }
    out
}
