//! Content-kind projections of a research summary for prompt injection.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::summary::ResearchSummary;

/// Returned when no summary exists for the requested pair.
pub const NO_SUMMARY: &str = "No research summary available for this technique.";

/// Kind of document the projection will be injected into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Detection,
    Mitigation,
    /// Purple-team exercise playbooks.
    Exercise,
    Generic,
}

impl ContentKind {
    /// Map an output file name (with or without `.md`) to a kind.
    pub fn from_file_name(name: &str) -> Self {
        match name.strip_suffix(".md").unwrap_or(name) {
            "detection" => Self::Detection,
            "mitigation" => Self::Mitigation,
            "purple_playbook" => Self::Exercise,
            _ => Self::Generic,
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Detection => write!(f, "detection"),
            Self::Mitigation => write!(f, "mitigation"),
            Self::Exercise => write!(f, "exercise"),
            Self::Generic => write!(f, "generic"),
        }
    }
}

/// Render the subset of `summary` relevant to `kind`.
pub fn render(summary: &ResearchSummary, kind: ContentKind) -> String {
    let header = format!(
        "Confidence Score: {:.1}/10.0 | Sources: {}",
        summary.confidence_score, summary.source_count
    );

    match kind {
        ContentKind::Detection => {
            let external = summary
                .external
                .repositories
                .iter()
                .take(3)
                .map(|r| format!("GitHub: {}", r.label()))
                .chain(
                    summary
                        .external
                        .posts
                        .iter()
                        .take(3)
                        .map(|p| format!("Blog: {}", p.label())),
                );
            format!(
                "RESEARCH SUMMARY - DETECTION FOCUS:\n{header}\n\n\
                 KEY DETECTION METHODS:\n{}\n\n\
                 TOOLS TO DETECT:\n{}\n\n\
                 INDICATORS OF COMPROMISE:\n{}\n\n\
                 COMMAND SIGNATURES:\n{}\n\n\
                 ARTIFACTS:\n{}\n\n\
                 AUTHORITATIVE SOURCES:\n{}\n",
                bullets(&summary.detection_methods),
                bullets(&summary.tools_mentioned),
                bullets(summary.indicators_of_compromise.iter().take(10)),
                bullets(summary.command_signatures.iter().take(5)),
                bullets(
                    summary
                        .registry_keys
                        .iter()
                        .chain(&summary.file_artifacts)
                        .chain(&summary.network_indicators)
                        .take(10)
                ),
                bullets(external),
                header = header,
            )
        }
        ContentKind::Mitigation => format!(
            "RESEARCH SUMMARY - MITIGATION FOCUS:\n{header}\n\n\
             MITIGATION STRATEGIES:\n{}\n\n\
             TOOLS TO MITIGATE:\n{}\n\n\
             KEY INSIGHTS:\n{}\n",
            bullets(&summary.mitigation_strategies),
            bullets(summary.tools_mentioned.iter().take(5)),
            bullets(summary.key_insights.iter().take(5).map(|i| excerpt(i, 200))),
            header = header,
        ),
        ContentKind::Exercise => format!(
            "RESEARCH SUMMARY - PURPLE TEAM FOCUS:\n{header}\n\n\
             TOOLS FOR SIMULATION:\n{}\n\n\
             DETECTION METHODS TO TEST:\n{}\n\n\
             COMMAND EXAMPLES:\n{}\n\n\
             THREAT ACTORS USING THIS:\n{}\n",
            bullets(summary.tools_mentioned.iter().take(8)),
            bullets(&summary.detection_methods),
            bullets(summary.command_signatures.iter().take(3)),
            bullets(summary.threat_actors.iter().take(3)),
            header = header,
        ),
        ContentKind::Generic => format!(
            "RESEARCH SUMMARY:\n{header}\nLast Updated: {}\n\n\
             KEY INSIGHTS:\n{}\n\n\
             TOOLS MENTIONED:\n{}\n\n\
             EXTERNAL SOURCES:\n\
             • GitHub Repositories: {}\n\
             • Blog Posts: {}\n\
             • Research Papers: {}\n",
            summary.last_updated.format("%Y-%m-%d"),
            bullets(summary.key_insights.iter().take(5).map(|i| excerpt(i, 150))),
            bullets(summary.tools_mentioned.iter().take(8)),
            summary.external.repositories.len(),
            summary.external.posts.len(),
            summary.external.papers.len(),
            header = header,
        ),
    }
}

fn bullets<I>(items: I) -> String
where
    I: IntoIterator,
    I::Item: Display,
{
    items
        .into_iter()
        .map(|item| format!("• {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// First `max_chars` characters followed by an ellipsis.
fn excerpt(text: &str, max_chars: usize) -> String {
    let head: String = text.chars().take(max_chars).collect();
    format!("{}...", head)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::research::extract::TOOL_VOCABULARY;
    use crate::research::summary::{ExternalFindings, ExternalSource, ResearchBatch};

    fn summary_with_all_tools() -> ResearchSummary {
        let text = TOOL_VOCABULARY.join(" and ");
        let mut summary =
            ResearchSummary::derive("T1059", "Windows", &ResearchBatch::new([text], ["a", "b"]), 5);
        summary.external = ExternalFindings {
            repositories: vec![ExternalSource::new("gentilkiwi/mimikatz"), ExternalSource::default()],
            posts: vec![ExternalSource::new("Hunting LSASS access")],
            papers: vec![ExternalSource::new("paper")],
        };
        summary
    }

    #[test]
    fn test_kind_from_file_name() {
        assert_eq!(ContentKind::from_file_name("detection.md"), ContentKind::Detection);
        assert_eq!(ContentKind::from_file_name("detection"), ContentKind::Detection);
        assert_eq!(ContentKind::from_file_name("mitigation.md"), ContentKind::Mitigation);
        assert_eq!(ContentKind::from_file_name("purple_playbook.md"), ContentKind::Exercise);
        assert_eq!(ContentKind::from_file_name("overview.md"), ContentKind::Generic);
        assert_eq!(ContentKind::from_file_name("Detection.md"), ContentKind::Generic);
    }

    #[test]
    fn test_detection_lists_every_tool() {
        let summary = summary_with_all_tools();
        assert_eq!(summary.tools_mentioned.len(), TOOL_VOCABULARY.len());

        let text = render(&summary, ContentKind::Detection);
        assert!(text.starts_with("RESEARCH SUMMARY - DETECTION FOCUS:"));
        assert!(text.contains("Confidence Score: 1.3/10.0 | Sources: 2"));
        for tool in &summary.tools_mentioned {
            assert!(text.contains(&format!("• {}", tool)), "missing {}", tool);
        }
        assert!(text.contains("• GitHub: gentilkiwi/mimikatz"));
        assert!(text.contains("• GitHub: Unknown"));
        assert!(text.contains("• Blog: Hunting LSASS access"));
    }

    #[test]
    fn test_mitigation_truncates_insights() {
        let mut summary = summary_with_all_tools();
        summary.key_insights = vec!["é".repeat(300)];
        summary.mitigation_strategies = vec!["Implement least privilege access".to_string()];

        let text = render(&summary, ContentKind::Mitigation);
        assert!(text.contains("MITIGATION STRATEGIES:\n• Implement least privilege access"));
        assert!(text.contains(&format!("• {}...", "é".repeat(200))));
        assert!(!text.contains(&"é".repeat(201)));
        assert_eq!(text.matches("• ").count(), 1 + 5 + 1);
    }

    #[test]
    fn test_exercise_and_generic_sections() {
        let mut summary = summary_with_all_tools();
        summary.threat_actors = vec!["APT29".to_string()];

        let exercise = render(&summary, ContentKind::Exercise);
        assert!(exercise.contains("PURPLE TEAM FOCUS"));
        assert!(exercise.contains("THREAT ACTORS USING THIS:\n• APT29"));

        let generic = render(&summary, ContentKind::Generic);
        assert!(generic.starts_with("RESEARCH SUMMARY:\n"));
        assert!(generic.contains(&format!(
            "Last Updated: {}",
            summary.last_updated.format("%Y-%m-%d")
        )));
        assert!(generic.contains("• GitHub Repositories: 2"));
        assert!(generic.contains("• Research Papers: 1"));
    }
}
