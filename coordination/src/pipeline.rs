//! Draft-then-debate driver.
//!
//! The initial draft is the only step allowed to fail: once a draft exists
//! the debate always returns content.

use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::debate::{DebateOrchestrator, DebateOutcome, DebateSummary};
use crate::error::{GenerationError, PipelineError};
use crate::generation::{GenerationClient, GenerationRequest};
use crate::research::{ContentKind, ResearchStore};

/// Final artifact of a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub content: String,
    pub summary: DebateSummary,
    pub outcome: DebateOutcome,
}

/// Generate a draft for `prompt`, then improve it through a multi-round
/// debate.
pub fn generate_with_debate<C: GenerationClient>(
    client: &C,
    prompt: &str,
    context: &str,
    research_context: &str,
    config: &EngineConfig,
) -> Result<(String, DebateSummary), PipelineError> {
    let output = run_pipeline(client, prompt, context, research_context, config)?;
    Ok((output.content, output.summary))
}

/// [`generate_with_debate`] keeping the debate outcome and its warnings.
pub fn run_pipeline<C: GenerationClient>(
    client: &C,
    prompt: &str,
    context: &str,
    research_context: &str,
    config: &EngineConfig,
) -> Result<PipelineOutput, PipelineError> {
    let draft = generate_draft(client, prompt, config)?;
    info!(chars = draft.len(), "initial draft generated, starting debate");

    let mut orchestrator = DebateOrchestrator::from_config(client, config);
    let outcome = orchestrator.run(&draft, context, research_context);
    for warning in &outcome.warnings {
        warn!(context, "{}", warning);
    }

    Ok(PipelineOutput {
        content: outcome.content.clone(),
        summary: orchestrator.summary(),
        outcome,
    })
}

/// Initial draft with `draft_retries` extra attempts.
///
/// An empty reply counts as a failed attempt.
pub fn generate_draft<C: GenerationClient>(
    client: &C,
    prompt: &str,
    config: &EngineConfig,
) -> Result<String, PipelineError> {
    let attempts = config.pipeline.draft_retries.saturating_add(1);
    let request = GenerationRequest::new(
        config.backend.model.as_str(),
        prompt,
        config.pipeline.draft_temperature,
    )
    .with_timeout(config.backend.timeout());

    let mut last_error: Option<GenerationError> = None;
    for attempt in 1..=attempts {
        match client.generate(&request) {
            Ok(text) if !text.trim().is_empty() => return Ok(text),
            Ok(_) => {
                warn!(attempt, attempts, "initial draft was empty");
                last_error = None;
            }
            Err(e) => {
                warn!(attempt, attempts, error = %e, "initial draft generation failed");
                last_error = Some(e);
            }
        }
    }

    Err(match last_error {
        Some(source) => PipelineError::DraftFailed { attempts, source },
        None => PipelineError::EmptyDraft,
    })
}

/// Research projection for a document, ready to pass as research context.
pub fn research_context_for(
    store: &ResearchStore,
    subject: &str,
    platform: &str,
    kind: ContentKind,
) -> String {
    store.project(subject, platform, kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    struct QueueClient {
        replies: RefCell<VecDeque<Result<String, GenerationError>>>,
        calls: RefCell<usize>,
    }

    impl QueueClient {
        fn new(replies: Vec<Result<String, GenerationError>>) -> Self {
            Self {
                replies: RefCell::new(replies.into()),
                calls: RefCell::new(0),
            }
        }
    }

    impl GenerationClient for QueueClient {
        fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerationError> {
            *self.calls.borrow_mut() += 1;
            self.replies
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Ok(r#"{"confidence": 9}"#.to_string()))
        }
    }

    fn config(retries: u32) -> EngineConfig {
        let mut config = EngineConfig::default();
        config.pipeline.draft_retries = retries;
        config
    }

    #[test]
    fn test_draft_retries_then_succeeds() {
        let client = QueueClient::new(vec![
            Err(GenerationError::transport("refused", false)),
            Ok("# Draft".to_string()),
        ]);
        assert_eq!(generate_draft(&client, "p", &config(1)).unwrap(), "# Draft");
        assert_eq!(*client.calls.borrow(), 2);
    }

    #[test]
    fn test_draft_failure_is_fatal() {
        let client = QueueClient::new(vec![
            Err(GenerationError::transport("refused", false)),
            Err(GenerationError::Status {
                status: 500,
                body: "boom".to_string(),
            }),
        ]);
        let err = generate_draft(&client, "p", &config(1)).unwrap_err();
        match err {
            PipelineError::DraftFailed { attempts, source } => {
                assert_eq!(attempts, 2);
                assert!(matches!(source, GenerationError::Status { status: 500, .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_draft_is_fatal() {
        let client = QueueClient::new(vec![Ok("   ".to_string())]);
        assert!(matches!(
            generate_draft(&client, "p", &config(0)),
            Err(PipelineError::EmptyDraft)
        ));
    }

    #[test]
    fn test_pipeline_runs_debate_on_draft() {
        let client = QueueClient::new(vec![Ok("# Draft".to_string())]);
        let mut config = config(0);
        config.debate.max_rounds = 2;

        let (content, summary) =
            generate_with_debate(&client, "write it", "T1059", "", &config).unwrap();

        assert_eq!(summary.total_rounds, 2);
        assert!(!content.is_empty());
        // draft + 2 rounds * (6 reviews + 1 synthesis)
        assert_eq!(*client.calls.borrow(), 1 + 2 * 7);
    }
}
