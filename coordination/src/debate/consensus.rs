//! Consensus scoring: turns a round's judgements into one number.
//!
//! `consensus = max(0, mean(confidence) - min(0.1 * criticisms, 2.0))`

use serde::{Deserialize, Serialize};

use crate::agent_profile::AgentRole;

use super::state::{DebateRound, JudgementResponse};

/// Penalty applied per criticism raised in a round.
pub const CRITICISM_PENALTY: f64 = 0.1;
/// Upper bound on the total criticism penalty.
pub const MAX_CRITICISM_PENALTY: f64 = 2.0;
/// Reviewers scoring below this are considered critical.
pub const CRITICAL_CONFIDENCE: f64 = 7.0;

/// Mean reviewer confidence, 0 for an empty round.
pub fn average_confidence(responses: &[JudgementResponse]) -> f64 {
    if responses.is_empty() {
        return 0.0;
    }
    responses.iter().map(|r| r.confidence).sum::<f64>() / responses.len() as f64
}

/// Consensus score for a round's responses.
pub fn consensus_score(responses: &[JudgementResponse]) -> f64 {
    if responses.is_empty() {
        return 0.0;
    }
    let criticisms: usize = responses.iter().map(|r| r.criticisms.len()).sum();
    let penalty = (criticisms as f64 * CRITICISM_PENALTY).min(MAX_CRITICISM_PENALTY);
    (average_confidence(responses) - penalty).max(0.0)
}

/// Roles that still object: any criticism, or confidence below 7.
pub fn critical_roles(responses: &[JudgementResponse]) -> Vec<AgentRole> {
    responses
        .iter()
        .filter(|r| r.is_critical())
        .map(|r| r.role)
        .collect()
}

/// Per-round statistics reported to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundStats {
    pub round: u32,
    pub consensus: f64,
    pub agent_count: usize,
    pub avg_confidence: f64,
    pub total_suggestions: usize,
    pub total_criticisms: usize,
}

impl RoundStats {
    pub fn from_round(round: &DebateRound) -> Self {
        Self {
            round: round.round_number,
            consensus: round.consensus_score,
            agent_count: round.responses.len(),
            avg_confidence: average_confidence(&round.responses),
            total_suggestions: round.responses.iter().map(|r| r.suggestions.len()).sum(),
            total_criticisms: round.responses.iter().map(|r| r.criticisms.len()).sum(),
        }
    }
}

/// Caller-facing summary of every round in a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebateSummary {
    pub total_rounds: usize,
    pub final_consensus: f64,
    pub round_details: Vec<RoundStats>,
}

impl DebateSummary {
    pub fn from_rounds(rounds: &[DebateRound]) -> Self {
        Self {
            total_rounds: rounds.len(),
            final_consensus: rounds.last().map_or(0.0, |r| r.consensus_score),
            round_details: rounds.iter().map(RoundStats::from_round).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn judgement(role: AgentRole, confidence: f64, criticisms: usize) -> JudgementResponse {
        JudgementResponse {
            role,
            content: String::new(),
            confidence,
            suggestions: vec!["add sigma rule".to_string()],
            criticisms: (0..criticisms).map(|i| format!("issue-{}", i)).collect(),
            improvements: vec![],
            strengths: vec![],
            weaknesses: vec![],
            rationale: String::new(),
            parse_fallback: false,
            created_at: Utc::now(),
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_consensus_with_small_penalty() {
        let responses = vec![
            judgement(AgentRole::TechnicalExpert, 6.0, 1),
            judgement(AgentRole::SecurityAnalyst, 7.0, 1),
            judgement(AgentRole::DetectionEngineer, 8.0, 0),
        ];
        assert!(approx(consensus_score(&responses), 6.8));
    }

    #[test]
    fn test_penalty_is_capped() {
        let responses = vec![
            judgement(AgentRole::TechnicalExpert, 9.0, 30),
            judgement(AgentRole::SecurityAnalyst, 9.0, 30),
        ];
        assert!(approx(consensus_score(&responses), 7.0));
    }

    #[test]
    fn test_consensus_floors_at_zero() {
        let responses = vec![judgement(AgentRole::ContentCritic, 1.0, 25)];
        assert!(approx(consensus_score(&responses), 0.0));
    }

    #[test]
    fn test_empty_round_scores_zero() {
        assert!(approx(consensus_score(&[]), 0.0));
        assert!(approx(average_confidence(&[]), 0.0));
    }

    #[test]
    fn test_critical_roles() {
        let responses = vec![
            judgement(AgentRole::TechnicalExpert, 9.0, 0),
            judgement(AgentRole::SecurityAnalyst, 6.5, 0),
            judgement(AgentRole::CodeReviewer, 9.0, 1),
        ];
        assert_eq!(
            critical_roles(&responses),
            vec![AgentRole::SecurityAnalyst, AgentRole::CodeReviewer]
        );
    }

    #[test]
    fn test_summary_shape() {
        let round = DebateRound {
            round_number: 1,
            topic: "T1003".to_string(),
            roles: vec![AgentRole::TechnicalExpert, AgentRole::ContentCritic],
            responses: vec![
                judgement(AgentRole::TechnicalExpert, 8.0, 1),
                judgement(AgentRole::ContentCritic, 6.0, 2),
            ],
            consensus_score: 6.7,
            final_content: "v1".to_string(),
            started_at: Utc::now(),
            duration_ms: 12,
        };
        let summary = DebateSummary::from_rounds(&[round]);
        assert_eq!(summary.total_rounds, 1);
        assert!(approx(summary.final_consensus, 6.7));
        let stats = &summary.round_details[0];
        assert_eq!(stats.agent_count, 2);
        assert!(approx(stats.avg_confidence, 7.0));
        assert_eq!(stats.total_suggestions, 2);
        assert_eq!(stats.total_criticisms, 3);

        let json = serde_json::to_value(&summary).unwrap();
        assert!(json["round_details"][0]["avg_confidence"].is_number());
    }

    #[test]
    fn test_empty_summary() {
        let summary = DebateSummary::from_rounds(&[]);
        assert_eq!(summary.total_rounds, 0);
        assert!(approx(summary.final_consensus, 0.0));
    }
}
