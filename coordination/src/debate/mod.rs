//! Debate Engine: multi-reviewer rounds over a draft artifact
//!
//! Each round asks every reviewer persona, in fixed order, to judge the
//! working content. Later reviewers see the earlier reviewers' feedback from
//! the same round. The judgements are scored into one consensus value and
//! merged into the next working content by a synthesis call.
//!
//! # Debate Flow
//!
//! ```text
//! Idle → RoundRunning → [round < 2?] ── yes ──→ Continue → RoundRunning
//!            │                │
//!            │                no
//!            │                ├─ consensus ≥ threshold  → Terminated
//!            │                ├─ round == max_rounds    → Terminated
//!            │                ├─ no critical reviewers  → Terminated
//!            │                └─ otherwise              → Continue
//!            │
//!            └─ max_rounds == 0 → Terminated (input returned as-is)
//! ```
//!
//! Backend and parse failures never abort a round: they become fallback
//! judgements (see [`normalizer`]) and the synthesizer falls back to the
//! best available variant.

pub mod consensus;
pub mod normalizer;
pub mod orchestrator;
pub mod prompts;
pub mod state;
pub mod synthesizer;

pub use consensus::{consensus_score, critical_roles, DebateSummary, RoundStats};
pub use normalizer::{normalize, parse_reply, RawJudgement};
pub use orchestrator::{DebateOrchestrator, DebateOutcome, MIN_ROUNDS};
pub use prompts::{ReviewPrompt, RoundTranscript, SynthesisPrompt};
pub use state::{
    DebatePhase, DebateRound, DebateSession, DebateTransition, JudgementResponse,
    TerminationReason, TransitionError,
};
pub use synthesizer::{ContentSynthesizer, FeedbackDigest};
