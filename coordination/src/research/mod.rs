//! Research Summary Store
//!
//! Distills raw research snippets into a reusable [`ResearchSummary`] per
//! (subject, platform) pair, merges new findings into existing records, and
//! renders content-kind projections that are injected into reviewer prompts
//! as research context.
//!
//! ```text
//! raw snippets + sources ──→ extract ──→ ResearchSummary ──→ store (JSON)
//!                                              │
//!                                              └──→ project(kind) ──→ prompt text
//! ```

pub mod extract;
pub mod projection;
pub mod store;
pub mod summary;

pub use extract::{extract_findings, key_insights, Findings, TOOL_VOCABULARY};
pub use projection::{render, ContentKind, NO_SUMMARY};
pub use store::ResearchStore;
pub use summary::{ExternalFindings, ExternalSource, ResearchBatch, ResearchSummary, ThreatIntel};
