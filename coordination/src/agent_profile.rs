//! Agent profile registry: reviewer personas for the debate engine.
//!
//! Each [`AgentRole`] owns one static [`AgentProfile`]. The orchestrator
//! reads personas through the role, so adding a reviewer means adding a
//! variant and its profile here; orchestration code does not change.
//!
//! # Roles
//!
//! - **TechnicalExpert**: implementation depth and feasibility
//! - **SecurityAnalyst**: threat landscape and risk
//! - **DetectionEngineer**: detection logic and observability
//! - **CodeReviewer**: code examples and syntax
//! - **ContentCritic**: structure, clarity, completeness
//! - **IntegrationSpecialist**: enterprise deployment and operations

use serde::{Deserialize, Serialize};

/// Reviewer role in a debate round.
///
/// Declaration order is the default invocation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    TechnicalExpert,
    SecurityAnalyst,
    DetectionEngineer,
    CodeReviewer,
    ContentCritic,
    IntegrationSpecialist,
}

/// Static persona description for one reviewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentProfile {
    pub role: AgentRole,
    /// Display name used in prompts and logs.
    pub name: &'static str,
    pub expertise: &'static str,
    pub personality: &'static str,
    pub focus_areas: &'static [&'static str],
    /// One-line task framing for the review prompt.
    pub prompt_style: &'static str,
}

static PROFILES: [AgentProfile; 6] = [
    AgentProfile {
        role: AgentRole::TechnicalExpert,
        name: "Dr. TechSpec",
        expertise: "Deep technical knowledge, implementation details, system architecture",
        personality: "Analytical, detail-oriented, focuses on technical accuracy and feasibility",
        focus_areas: &[
            "technical implementation",
            "system internals",
            "architecture",
            "performance",
        ],
        prompt_style: "Provide precise technical analysis with implementation details",
    },
    AgentProfile {
        role: AgentRole::SecurityAnalyst,
        name: "Agent SecOps",
        expertise: "Threat landscape, attack vectors, defensive strategies, risk assessment",
        personality: "Risk-focused, practical, emphasizes real-world applicability",
        focus_areas: &[
            "threat modeling",
            "attack vectors",
            "defensive measures",
            "risk analysis",
        ],
        prompt_style: "Analyze from security and threat perspective with practical insights",
    },
    AgentProfile {
        role: AgentRole::DetectionEngineer,
        name: "Det-Eng Alpha",
        expertise: "Detection logic, monitoring, observability, incident response",
        personality: "Methodical, precision-focused, emphasizes observable behaviors",
        focus_areas: &[
            "detection rules",
            "monitoring strategies",
            "observability",
            "false positives",
        ],
        prompt_style: "Focus on detection engineering and monitoring effectiveness",
    },
    AgentProfile {
        role: AgentRole::CodeReviewer,
        name: "CodeGuard",
        expertise: "Code quality, examples, syntax, best practices, implementation patterns",
        personality: "Meticulous, standards-focused, emphasizes code quality and examples",
        focus_areas: &[
            "code examples",
            "syntax accuracy",
            "best practices",
            "implementation patterns",
        ],
        prompt_style: "Review code examples and provide implementation guidance",
    },
    AgentProfile {
        role: AgentRole::ContentCritic,
        name: "QualityCheck",
        expertise: "Content structure, clarity, completeness, documentation standards",
        personality: "Critical, quality-focused, emphasizes clarity and completeness",
        focus_areas: &[
            "content structure",
            "clarity",
            "completeness",
            "documentation quality",
        ],
        prompt_style: "Critically evaluate content quality and structure",
    },
    AgentProfile {
        role: AgentRole::IntegrationSpecialist,
        name: "SysIntegrator",
        expertise: "Enterprise integration, compatibility, deployment, operational considerations",
        personality: "Holistic, integration-focused, emphasizes enterprise compatibility",
        focus_areas: &[
            "enterprise integration",
            "compatibility",
            "deployment",
            "operations",
        ],
        prompt_style: "Consider enterprise integration and operational aspects",
    },
];

impl AgentRole {
    /// All defined roles, in default invocation order.
    pub fn all() -> &'static [AgentRole] {
        &[
            Self::TechnicalExpert,
            Self::SecurityAnalyst,
            Self::DetectionEngineer,
            Self::CodeReviewer,
            Self::ContentCritic,
            Self::IntegrationSpecialist,
        ]
    }

    /// Snake-case identifier, identical to the serde form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TechnicalExpert => "technical_expert",
            Self::SecurityAnalyst => "security_analyst",
            Self::DetectionEngineer => "detection_engineer",
            Self::CodeReviewer => "code_reviewer",
            Self::ContentCritic => "content_critic",
            Self::IntegrationSpecialist => "integration_specialist",
        }
    }

    /// The persona record for this role.
    pub fn profile(self) -> &'static AgentProfile {
        let index = match self {
            Self::TechnicalExpert => 0,
            Self::SecurityAnalyst => 1,
            Self::DetectionEngineer => 2,
            Self::CodeReviewer => 3,
            Self::ContentCritic => 4,
            Self::IntegrationSpecialist => 5,
        };
        &PROFILES[index]
    }

    /// Role-specific review checklist injected into the agent prompt.
    pub fn analysis_requirements(self) -> &'static [&'static str] {
        match self {
            Self::TechnicalExpert => &[
                "System architecture and implementation feasibility",
                "Performance implications and optimization opportunities",
                "Technical accuracy of procedures and configurations",
                "Platform-specific implementation details and variations",
                "Integration with existing system components",
                "Scalability and maintenance considerations",
            ],
            Self::SecurityAnalyst => &[
                "Threat landscape alignment and attack vector coverage",
                "Risk assessment and impact analysis",
                "Defensive strategy effectiveness and gaps",
                "Real-world attack scenario applicability",
                "Security control recommendations and priorities",
                "Threat intelligence integration opportunities",
            ],
            Self::DetectionEngineer => &[
                "Detection rule effectiveness and false positive rates",
                "Observable behaviors and monitoring strategies",
                "Log source requirements and data collection",
                "Alert tuning and threshold optimization",
                "Detection coverage gaps and blind spots",
                "Incident response workflow integration",
            ],
            Self::CodeReviewer => &[
                "Code syntax accuracy and best practices compliance",
                "Error handling and edge case coverage",
                "Security implications of code implementations",
                "Code maintainability and documentation quality",
                "Performance optimization opportunities",
                "Platform compatibility and dependency management",
            ],
            Self::ContentCritic => &[
                "Content structure and logical flow",
                "Clarity and readability for target audience",
                "Completeness of coverage and information gaps",
                "Documentation standards compliance",
                "Actionability and practical implementation guidance",
                "Consistency with established knowledge base patterns",
            ],
            Self::IntegrationSpecialist => &[
                "Enterprise environment compatibility",
                "Deployment complexity and operational overhead",
                "Tool integration and workflow automation",
                "Change management and rollback procedures",
                "Training and skill requirement assessment",
                "Cost-benefit analysis and resource allocation",
            ],
        }
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognised role identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl std::fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown agent role: {}", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl std::str::FromStr for AgentRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|role| role.as_str() == wanted)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_role_has_matching_profile() {
        for role in AgentRole::all() {
            let profile = role.profile();
            assert_eq!(profile.role, *role);
            assert!(!profile.name.is_empty());
            assert_eq!(profile.focus_areas.len(), 4);
        }
    }

    #[test]
    fn test_default_order_is_declaration_order() {
        let roles = AgentRole::all();
        assert_eq!(roles.len(), 6);
        assert_eq!(roles[0], AgentRole::TechnicalExpert);
        assert_eq!(roles[5], AgentRole::IntegrationSpecialist);
        let mut sorted = roles.to_vec();
        sorted.sort();
        assert_eq!(sorted, roles);
    }

    #[test]
    fn test_analysis_requirements_nonempty() {
        for role in AgentRole::all() {
            assert_eq!(role.analysis_requirements().len(), 6);
        }
    }

    #[test]
    fn test_role_display_and_parse() {
        assert_eq!(AgentRole::DetectionEngineer.to_string(), "detection_engineer");
        assert_eq!(
            "Code_Reviewer".parse::<AgentRole>().unwrap(),
            AgentRole::CodeReviewer
        );
        assert!("red_teamer".parse::<AgentRole>().is_err());
    }

    #[test]
    fn test_role_serde_matches_display() {
        for role in AgentRole::all() {
            let json = serde_json::to_string(role).unwrap();
            assert_eq!(json, format!("\"{}\"", role));
            let parsed: AgentRole = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, *role);
        }
    }
}
