//! Content synthesizer: merges one round's judgements into one artifact.

use tracing::{debug, warn};

use crate::generation::{GenerationClient, GenerationRequest};

use super::prompts::SynthesisPrompt;
use super::state::JudgementResponse;

pub const MAX_SUGGESTIONS: usize = 10;
pub const MAX_IMPROVEMENTS: usize = 10;
pub const MAX_CRITICISMS: usize = 5;
pub const MAX_ENHANCED_VERSIONS: usize = 3;

/// Capped feedback collected from a round.
#[derive(Debug, Default, PartialEq)]
pub struct FeedbackDigest<'a> {
    pub suggestions: Vec<&'a str>,
    pub improvements: Vec<&'a str>,
    pub criticisms: Vec<&'a str>,
    /// Distinct reviewer rewrites that differ from the original.
    pub enhanced_versions: Vec<&'a str>,
}

impl<'a> FeedbackDigest<'a> {
    pub fn collect(original_content: &str, responses: &'a [JudgementResponse]) -> Self {
        let mut digest = Self::default();
        for response in responses {
            digest
                .suggestions
                .extend(response.suggestions.iter().map(String::as_str));
            digest
                .improvements
                .extend(response.improvements.iter().map(String::as_str));
            digest
                .criticisms
                .extend(response.criticisms.iter().map(String::as_str));

            let content = response.content.as_str();
            if !content.is_empty()
                && content != original_content
                && !digest.enhanced_versions.contains(&content)
            {
                digest.enhanced_versions.push(content);
            }
        }
        digest.suggestions.truncate(MAX_SUGGESTIONS);
        digest.improvements.truncate(MAX_IMPROVEMENTS);
        digest.criticisms.truncate(MAX_CRITICISMS);
        digest.enhanced_versions.truncate(MAX_ENHANCED_VERSIONS);
        digest
    }
}

/// Issues the single synthesis call for a round.
pub struct ContentSynthesizer<'c, C: GenerationClient + ?Sized> {
    client: &'c C,
    model: String,
    temperature: f64,
    timeout: std::time::Duration,
}

impl<'c, C: GenerationClient + ?Sized> ContentSynthesizer<'c, C> {
    pub fn new(
        client: &'c C,
        model: impl Into<String>,
        temperature: f64,
        timeout: std::time::Duration,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            temperature,
            timeout,
        }
    }

    /// Produce the round's final content. Never fails.
    ///
    /// On backend failure the first distinct reviewer rewrite is used, or
    /// the original content when there is none.
    pub fn synthesize(
        &self,
        original_content: &str,
        responses: &[JudgementResponse],
        context: &str,
    ) -> String {
        let digest = FeedbackDigest::collect(original_content, responses);
        let prompt = SynthesisPrompt {
            original_content,
            context,
            suggestions: &digest.suggestions,
            improvements: &digest.improvements,
            criticisms: &digest.criticisms,
            enhanced_versions: &digest.enhanced_versions,
        }
        .render();

        let request = GenerationRequest::new(self.model.as_str(), prompt, self.temperature)
            .with_timeout(self.timeout);

        match self.client.generate(&request) {
            Ok(text) => {
                debug!(chars = text.len(), "synthesis complete");
                text
            }
            Err(e) => {
                warn!(error = %e, "content synthesis failed, using best available variant");
                digest
                    .enhanced_versions
                    .first()
                    .map_or_else(|| original_content.to_string(), |v| v.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent_profile::AgentRole;
    use crate::error::GenerationError;
    use chrono::Utc;
    use std::cell::RefCell;
    use std::time::Duration;

    struct RecordingClient {
        reply: Option<String>,
        requests: RefCell<Vec<GenerationRequest>>,
    }

    impl GenerationClient for RecordingClient {
        fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
            self.requests.borrow_mut().push(request.clone());
            self.reply
                .clone()
                .ok_or_else(|| GenerationError::transport("connection refused", false))
        }
    }

    fn judgement(content: &str, n: usize) -> JudgementResponse {
        JudgementResponse {
            role: AgentRole::ContentCritic,
            content: content.to_string(),
            confidence: 7.0,
            suggestions: (0..n).map(|i| format!("s{}", i)).collect(),
            criticisms: (0..n).map(|i| format!("c{}", i)).collect(),
            improvements: (0..n).map(|i| format!("i{}", i)).collect(),
            strengths: vec![],
            weaknesses: vec![],
            rationale: String::new(),
            parse_fallback: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_digest_caps_and_dedupes() {
        let responses = vec![
            judgement("orig", 4),
            judgement("alt A", 4),
            judgement("alt A", 4),
            judgement("alt B", 4),
            judgement("", 0),
            judgement("alt C", 0),
            judgement("alt D", 0),
        ];
        let digest = FeedbackDigest::collect("orig", &responses);
        assert_eq!(digest.suggestions.len(), MAX_SUGGESTIONS);
        assert_eq!(digest.improvements.len(), MAX_IMPROVEMENTS);
        assert_eq!(digest.criticisms.len(), MAX_CRITICISMS);
        assert_eq!(digest.enhanced_versions, vec!["alt A", "alt B", "alt C"]);
        assert_eq!(digest.suggestions[0], "s0");
    }

    #[test]
    fn test_synthesis_uses_lower_temperature_reply() {
        let client = RecordingClient {
            reply: Some("merged".to_string()),
            requests: RefCell::new(Vec::new()),
        };
        let synthesizer = ContentSynthesizer::new(&client, "m", 0.4, Duration::from_secs(180));
        let out = synthesizer.synthesize("orig", &[judgement("alt", 1)], "T1003");

        assert_eq!(out, "merged");
        let requests = client.requests.borrow();
        assert_eq!(requests.len(), 1);
        assert!((requests[0].temperature - 0.4).abs() < f64::EPSILON);
        assert_eq!(requests[0].timeout, Duration::from_secs(180));
        assert!(requests[0].prompt.contains("content synthesis specialist"));
    }

    #[test]
    fn test_failure_falls_back_to_first_variant() {
        let client = RecordingClient {
            reply: None,
            requests: RefCell::new(Vec::new()),
        };
        let synthesizer = ContentSynthesizer::new(&client, "m", 0.4, Duration::from_secs(1));
        let responses = vec![judgement("orig", 0), judgement("alt A", 0), judgement("alt B", 0)];
        assert_eq!(synthesizer.synthesize("orig", &responses, "ctx"), "alt A");
    }

    #[test]
    fn test_failure_without_variants_returns_original() {
        let client = RecordingClient {
            reply: None,
            requests: RefCell::new(Vec::new()),
        };
        let synthesizer = ContentSynthesizer::new(&client, "m", 0.4, Duration::from_secs(1));
        assert_eq!(
            synthesizer.synthesize("orig", &[judgement("orig", 2)], "ctx"),
            "orig"
        );
    }
}
