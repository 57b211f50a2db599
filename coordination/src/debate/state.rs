//! Debate state machine: phases, round records, and session tracking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agent_profile::AgentRole;

/// Phase of a debate session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebatePhase {
    /// Session created, no round started.
    Idle,
    /// Reviewers are being invoked for the current round.
    RoundRunning,
    /// Round finished and the loop decided to run another.
    Continue,
    /// Loop ended; the working content is final.
    Terminated,
}

impl DebatePhase {
    /// Whether this is a terminal phase.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Terminated)
    }

    /// Valid transitions from this phase.
    pub fn valid_transitions(self) -> &'static [DebatePhase] {
        match self {
            Self::Idle => &[Self::RoundRunning, Self::Terminated],
            Self::RoundRunning => &[Self::Continue, Self::Terminated],
            Self::Continue => &[Self::RoundRunning],
            Self::Terminated => &[],
        }
    }
}

impl std::fmt::Display for DebatePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::RoundRunning => write!(f, "round_running"),
            Self::Continue => write!(f, "continue"),
            Self::Terminated => write!(f, "terminated"),
        }
    }
}

/// Why the debate loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// Consensus met the threshold after the minimum rounds.
    ThresholdReached,
    /// The configured round budget ran out.
    MaxRoundsExhausted,
    /// No reviewer raised a criticism or scored below 7.
    NoMajorCriticisms,
    /// `max_rounds` was zero; the input is returned untouched.
    NoRounds,
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ThresholdReached => write!(f, "threshold_reached"),
            Self::MaxRoundsExhausted => write!(f, "max_rounds_exhausted"),
            Self::NoMajorCriticisms => write!(f, "no_major_criticisms"),
            Self::NoRounds => write!(f, "no_rounds"),
        }
    }
}

/// One reviewer's judgement of the content in one round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgementResponse {
    pub role: AgentRole,
    /// The reviewer's revised version of the content.
    pub content: String,
    /// Confidence in the content, 0–10.
    pub confidence: f64,
    pub suggestions: Vec<String>,
    pub criticisms: Vec<String>,
    pub improvements: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub strengths: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weaknesses: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub rationale: String,
    /// Set when the reply was not usable JSON and was reconstructed.
    #[serde(default)]
    pub parse_fallback: bool,
    pub created_at: DateTime<Utc>,
}

impl JudgementResponse {
    /// Degenerate judgement for a reviewer whose backend call failed.
    ///
    /// Carries the pre-round content forward so the round still completes.
    pub fn backend_failure(role: AgentRole, content: &str, error: &str) -> Self {
        Self {
            role,
            content: content.to_string(),
            confidence: 5.0,
            suggestions: Vec::new(),
            criticisms: vec![format!("{} analysis failed: {}", role, error)],
            improvements: Vec::new(),
            strengths: Vec::new(),
            weaknesses: Vec::new(),
            rationale: String::new(),
            parse_fallback: false,
            created_at: Utc::now(),
        }
    }

    /// Whether this reviewer still has substantive objections.
    pub fn is_critical(&self) -> bool {
        !self.criticisms.is_empty() || self.confidence < super::consensus::CRITICAL_CONFIDENCE
    }
}

/// One complete pass of all reviewers over a single draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateRound {
    /// Round number (1-indexed).
    pub round_number: u32,
    /// Review context the round ran under.
    pub topic: String,
    /// Participating roles, in invocation order.
    pub roles: Vec<AgentRole>,
    /// One judgement per role, in invocation order.
    pub responses: Vec<JudgementResponse>,
    pub consensus_score: f64,
    /// Synthesized content produced at the end of the round.
    pub final_content: String,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

/// A phase transition record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateTransition {
    pub from: DebatePhase,
    pub to: DebatePhase,
    pub timestamp: DateTime<Utc>,
    pub reason: String,
}

/// Error for invalid state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionError {
    pub from: DebatePhase,
    pub to: DebatePhase,
}

impl std::fmt::Display for TransitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid transition {} → {} (allowed: {:?})",
            self.from,
            self.to,
            self.from.valid_transitions()
        )
    }
}

impl std::error::Error for TransitionError {}

/// Round history and working content of one debate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateSession {
    pub id: String,
    pub phase: DebatePhase,
    pub rounds: Vec<DebateRound>,
    pub transitions: Vec<DebateTransition>,
    /// Content the next round will review.
    pub working_content: String,
    pub created_at: DateTime<Utc>,
}

impl DebateSession {
    pub fn new(working_content: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            phase: DebatePhase::Idle,
            rounds: Vec::new(),
            transitions: Vec::new(),
            working_content: working_content.to_string(),
            created_at: Utc::now(),
        }
    }

    /// Transition to a new phase with a reason.
    pub fn transition(&mut self, to: DebatePhase, reason: &str) -> Result<(), TransitionError> {
        if !self.phase.valid_transitions().contains(&to) {
            return Err(TransitionError {
                from: self.phase,
                to,
            });
        }
        self.transitions.push(DebateTransition {
            from: self.phase,
            to,
            timestamp: Utc::now(),
            reason: reason.to_string(),
        });
        self.phase = to;
        Ok(())
    }

    /// Append a completed round and adopt its output as the working content.
    ///
    /// Round numbers must strictly increase; a stale round is rejected
    /// and `false` is returned.
    pub fn record_round(&mut self, round: DebateRound) -> bool {
        if let Some(last) = self.rounds.last() {
            if round.round_number <= last.round_number {
                return false;
            }
        }
        self.working_content = round.final_content.clone();
        self.rounds.push(round);
        true
    }

    /// Number of the next round to run.
    pub fn next_round_number(&self) -> u32 {
        self.rounds.last().map_or(1, |r| r.round_number + 1)
    }

    pub fn last_round(&self) -> Option<&DebateRound> {
        self.rounds.last()
    }

    pub fn is_complete(&self) -> bool {
        self.phase.is_terminal()
    }
}
