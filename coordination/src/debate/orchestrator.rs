//! Debate orchestrator: drives reviewer rounds to a final artifact.
//!
//! Ties together the reviewer registry, normalizer, consensus scoring and
//! synthesizer. Reviewers within a round run strictly in order because each
//! prompt carries the feedback of the reviewers before it.

use std::time::{Duration, Instant};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn};

use crate::agent_profile::AgentRole;
use crate::config::{BackendConfig, DebateConfig, EngineConfig};
use crate::generation::{GenerationClient, GenerationRequest};

use super::consensus::{consensus_score, critical_roles, DebateSummary};
use super::normalizer::normalize;
use super::prompts::{ReviewPrompt, RoundTranscript};
use super::state::{DebatePhase, DebateRound, DebateSession, JudgementResponse, TerminationReason};
use super::synthesizer::ContentSynthesizer;

/// Rounds that always run before any termination rule is consulted.
pub const MIN_ROUNDS: u32 = 2;

/// Result of a multi-round debate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateOutcome {
    /// Final working content. Equals the input when no round ran.
    pub content: String,
    pub rounds_run: u32,
    pub final_consensus: f64,
    pub termination: TerminationReason,
    /// Caller-visible quality warnings.
    pub warnings: Vec<String>,
}

impl DebateOutcome {
    /// Whether the final consensus cleared the quality floor.
    pub fn is_low_quality(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Compact summary line.
    pub fn summary_line(&self) -> String {
        format!(
            "[{}] {} rounds | consensus={:.2} | {} chars",
            self.termination,
            self.rounds_run,
            self.final_consensus,
            self.content.len()
        )
    }
}

/// Runs debate rounds against a generation backend.
///
/// Usage:
/// 1. Create with `new()` (or `with_roles()` to narrow the panel)
/// 2. Call `multi_round_debate()` or `run()` for a full session,
///    or `conduct_round()` for a single pass
/// 3. Read `summary()` / `history()` for per-round statistics
pub struct DebateOrchestrator<C: GenerationClient> {
    client: C,
    backend: BackendConfig,
    config: DebateConfig,
    session: DebateSession,
}

impl<C: GenerationClient> DebateOrchestrator<C> {
    pub fn new(client: C, backend: BackendConfig, config: DebateConfig) -> Self {
        Self {
            client,
            backend,
            config,
            session: DebateSession::new(""),
        }
    }

    pub fn from_config(client: C, config: &EngineConfig) -> Self {
        Self::new(client, config.backend.clone(), config.debate.clone())
    }

    /// Replace the participating reviewers and their order.
    pub fn with_roles(mut self, roles: Vec<AgentRole>) -> Self {
        self.config.roles = roles;
        self
    }

    pub fn config(&self) -> &DebateConfig {
        &self.config
    }

    /// The current (or most recent) session.
    pub fn session(&self) -> &DebateSession {
        &self.session
    }

    /// Completed rounds of the current session.
    pub fn history(&self) -> &[DebateRound] {
        &self.session.rounds
    }

    /// Per-round statistics of the current session.
    pub fn summary(&self) -> DebateSummary {
        DebateSummary::from_rounds(&self.session.rounds)
    }

    /// Run one round: every role in `roles`, in order, then synthesis.
    ///
    /// The round is appended to the session history when its number follows
    /// the last recorded round.
    pub fn conduct_round(
        &mut self,
        content: &str,
        context: &str,
        roles: &[AgentRole],
        round_number: u32,
        research_context: &str,
    ) -> DebateRound {
        let span = info_span!("debate_round", round = round_number, agents = roles.len());
        let _guard = span.enter();

        let started_at = Utc::now();
        let clock = Instant::now();
        info!(round = round_number, agents = roles.len(), "starting debate round");

        let mut transcript = RoundTranscript::new();
        let mut responses = Vec::with_capacity(roles.len());

        for &role in roles {
            let judgement = self.review(role, content, context, research_context, &transcript);
            transcript.record(&judgement);
            responses.push(judgement);
        }

        let consensus = consensus_score(&responses);
        let final_content = ContentSynthesizer::new(
            &self.client,
            self.backend.model.as_str(),
            self.config.synthesis_temperature,
            self.backend.synthesis_timeout(),
        )
        .synthesize(content, &responses, context);

        let round = DebateRound {
            round_number,
            topic: context.to_string(),
            roles: roles.to_vec(),
            responses,
            consensus_score: consensus,
            final_content,
            started_at,
            duration_ms: saturating_millis(clock.elapsed()),
        };

        if !self.session.record_round(round.clone()) {
            warn!(
                round = round_number,
                last = self.session.rounds.last().map(|r| r.round_number),
                "round number does not follow session history, not recorded"
            );
        }

        info!(
            round = round_number,
            consensus = consensus,
            duration_ms = round.duration_ms,
            "debate round complete"
        );
        round
    }

    /// One reviewer call. Backend failure degrades to a fallback judgement.
    fn review(
        &self,
        role: AgentRole,
        content: &str,
        context: &str,
        research_context: &str,
        transcript: &RoundTranscript,
    ) -> JudgementResponse {
        let profile = role.profile();
        debug!(role = %role, name = profile.name, prior_feedback = transcript.len(), "requesting review");

        let prompt = ReviewPrompt {
            role,
            context,
            research_context,
            content,
            transcript,
        }
        .render();
        let request = GenerationRequest::new(
            self.backend.model.as_str(),
            prompt,
            self.config.agent_temperature,
        )
        .with_timeout(self.backend.timeout());

        match self.client.generate(&request) {
            Ok(raw) => {
                let judgement = normalize(&raw, role, content);
                if judgement.parse_fallback {
                    debug!(role = %role, "reply was not decodable JSON, using fallback judgement");
                }
                judgement
            }
            Err(e) => {
                warn!(role = %role, error = %e, timed_out = e.is_timeout(), "review call failed");
                JudgementResponse::backend_failure(role, content, &e.to_string())
            }
        }
    }

    /// Debate with the configured round budget and threshold.
    pub fn run(&mut self, content: &str, context: &str, research_context: &str) -> DebateOutcome {
        let max_rounds = self.config.max_rounds;
        let threshold = self.config.consensus_threshold;
        self.multi_round_debate(content, context, max_rounds, threshold, research_context)
    }

    /// Run rounds until a termination rule fires.
    ///
    /// Rounds 1..MIN_ROUNDS always run. After that the loop stops when
    /// consensus reaches `consensus_threshold`, when `max_rounds` is spent,
    /// or when no reviewer remains critical. Always returns content.
    pub fn multi_round_debate(
        &mut self,
        content: &str,
        context: &str,
        max_rounds: u32,
        consensus_threshold: f64,
        research_context: &str,
    ) -> DebateOutcome {
        self.session = DebateSession::new(content);
        let roles = self.config.roles.clone();
        info!(
            session = %self.session.id,
            max_rounds,
            threshold = consensus_threshold,
            agents = roles.len(),
            "starting multi-round debate"
        );

        let mut termination = TerminationReason::NoRounds;
        let mut previous_score: Option<f64> = None;

        for round_num in 1..=max_rounds {
            self.advance(DebatePhase::RoundRunning, "round started");
            let working = self.session.working_content.clone();
            let round =
                self.conduct_round(&working, context, &roles, round_num, research_context);
            let score = round.consensus_score;

            if let Some(prev) = previous_score {
                info!(round = round_num, delta = score - prev, "quality change");
            }
            previous_score = Some(score);

            let stop = if round_num < MIN_ROUNDS {
                debug!(round = round_num, min_rounds = MIN_ROUNDS, "minimum rounds not reached");
                None
            } else if score >= consensus_threshold {
                info!(round = round_num, score, threshold = consensus_threshold, "quality threshold reached");
                Some(TerminationReason::ThresholdReached)
            } else if round_num == max_rounds {
                None
            } else {
                let critical = critical_roles(&round.responses);
                if critical.is_empty() {
                    info!(round = round_num, "no major criticisms after minimum rounds");
                    Some(TerminationReason::NoMajorCriticisms)
                } else {
                    // All roles still run next round; the critical set is informational.
                    info!(round = round_num, critical = ?critical, "continuing debate");
                    None
                }
            };

            if let Some(reason) = stop {
                termination = reason;
                break;
            }
            if round_num == max_rounds {
                warn!(round = round_num, score, "max rounds reached");
                termination = TerminationReason::MaxRoundsExhausted;
                break;
            }
            self.advance(DebatePhase::Continue, "below threshold");
        }

        self.advance(DebatePhase::Terminated, &termination.to_string());

        let final_consensus = self.session.last_round().map_or(0.0, |r| r.consensus_score);
        let mut warnings = Vec::new();
        if final_consensus < self.config.quality_floor {
            warn!(
                score = final_consensus,
                floor = self.config.quality_floor,
                "final quality score below acceptable threshold"
            );
            warnings.push(format!(
                "Final quality score {:.2} below acceptable threshold {:.1}",
                final_consensus, self.config.quality_floor
            ));
        }

        let outcome = DebateOutcome {
            content: self.session.working_content.clone(),
            rounds_run: self.session.rounds.len() as u32,
            final_consensus,
            termination,
            warnings,
        };
        info!(outcome = %outcome.summary_line(), "multi-round debate complete");
        outcome
    }

    fn advance(&mut self, to: DebatePhase, reason: &str) {
        if let Err(e) = self.session.transition(to, reason) {
            warn!(error = %e, "debate phase transition rejected");
        }
    }
}

fn saturating_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
