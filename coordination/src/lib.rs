//! Techdoc Coordination Library
//!
//! Multi-agent review engine for security technique documentation:
//! - Reviewer personas that judge a draft in ordered rounds
//! - Tolerant normalization of model replies into structured judgements
//! - Consensus scoring with a multi-round termination policy
//! - Synthesis of each round's feedback into the next working draft
//! - A persistent research-summary cache projected into reviewer prompts
//!
//! # Architecture
//!
//! ```text
//! prompt ──→ pipeline::generate_draft ──→ draft
//!                                           │
//!   ResearchStore::project ──→ research ──→ DebateOrchestrator
//!                                           │   per round:
//!                                           │     AgentRole × N ──→ GenerationClient ──→ normalize
//!                                           │     consensus_score
//!                                           │     ContentSynthesizer ──→ next draft
//!                                           ▼
//!                               DebateOutcome + DebateSummary
//! ```
//!
//! Everything is synchronous. The only fatal error is failing to produce
//! the initial draft; backend, parse, synthesis and store failures degrade
//! output instead of aborting.
//!
//! # Usage
//!
//! ```no_run
//! use techdoc_coordination::{
//!     generate_with_debate, research_context_for, ContentKind, EngineConfig, OllamaClient,
//!     ResearchStore,
//! };
//!
//! let config = EngineConfig::from_env();
//! let client = OllamaClient::from_config(&config.backend)?;
//! let store = ResearchStore::from_config(&config.research);
//! let research = research_context_for(&store, "T1003", "windows", ContentKind::Detection);
//!
//! let (content, summary) = generate_with_debate(
//!     &client,
//!     "Write detection guidance for OS Credential Dumping",
//!     "T1003 OS Credential Dumping (windows)",
//!     &research,
//!     &config,
//! )?;
//! println!("{} rounds, consensus {:.2}", summary.total_rounds, summary.final_consensus);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![allow(clippy::uninlined_format_args)]

pub mod agent_profile;
pub mod config;
pub mod debate;
pub mod error;
pub mod generation;
pub mod logging;
pub mod pipeline;
pub mod research;

pub use agent_profile::{AgentProfile, AgentRole};
pub use config::{BackendConfig, DebateConfig, EngineConfig, PipelineConfig, ResearchConfig};
pub use error::{ConfigError, GenerationError, PipelineError, StoreError};
pub use generation::{GenerationClient, GenerationRequest, OllamaClient};
pub use logging::init_tracing;
pub use pipeline::{
    generate_draft, generate_with_debate, research_context_for, run_pipeline, PipelineOutput,
};

// Re-export key debate types
pub use debate::{
    DebateOrchestrator, DebateOutcome, DebatePhase, DebateRound, DebateSession, DebateSummary,
    JudgementResponse, RoundStats, TerminationReason,
};

// Re-export key research types
pub use research::{
    ContentKind, ExternalFindings, ExternalSource, ResearchBatch, ResearchStore, ResearchSummary,
    ThreatIntel,
};
