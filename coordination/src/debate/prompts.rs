//! Prompt builders for reviewer and synthesis calls.

use crate::agent_profile::AgentRole;

use super::state::JudgementResponse;

/// Quality bar quoted to every reviewer.
pub const TARGET_QUALITY: f64 = 8.5;

/// Running digest of earlier reviewers' output within one round.
///
/// Reviewer N sees entries 0..N only; the transcript is rebuilt per round.
#[derive(Debug, Clone, Default)]
pub struct RoundTranscript {
    text: String,
    entries: usize,
}

impl RoundTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a compact digest of one judgement.
    pub fn record(&mut self, judgement: &JudgementResponse) {
        self.text.push_str(&format!(
            "\n\nPREVIOUS AGENT FEEDBACK ({}):\nConfidence: {:.1}\nSuggestions: {}\nCriticisms: {}\n",
            judgement.role,
            judgement.confidence,
            judgement.suggestions.join("; "),
            judgement.criticisms.join("; "),
        ));
        self.entries += 1;
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }
}

/// Inputs for one reviewer prompt.
pub struct ReviewPrompt<'a> {
    pub role: AgentRole,
    pub context: &'a str,
    pub research_context: &'a str,
    pub content: &'a str,
    pub transcript: &'a RoundTranscript,
}

impl ReviewPrompt<'_> {
    pub fn render(&self) -> String {
        let profile = self.role.profile();
        let requirements = self
            .role
            .analysis_requirements()
            .iter()
            .map(|r| format!("- {}", r))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"You are {name}, a highly specialized AI agent with deep expertise in: {expertise}

Your personality: {personality}
Your focus areas: {focus}

CRITICAL QUALITY STANDARDS:
- Target quality: {target:.1}+ out of 10
- Provide specific, actionable, detailed recommendations
- Include concrete code examples and technical specifics
- NO generic responses like "Thank you for your suggestions"
- Each suggestion must be implementation-ready

TASK: {style} for the following content with EXCEPTIONAL depth and specificity.

CONTEXT:
{context}

RESEARCH CONTEXT (Authoritative information - MUST be integrated into your analysis):
{research}

CONTENT TO REVIEW:
{content}
{transcript}

ENHANCED ANALYSIS REQUIREMENTS:
As {name}, provide an expert-level analysis addressing these specific areas:
{requirements}

Provide your analysis in this JSON format:
{{
    "agent_role": "{role}",
    "confidence": [0-10 rating - be harsh, demand excellence],
    "strengths": ["specific technical strengths with evidence"],
    "weaknesses": ["specific technical weaknesses with examples"],
    "suggestions": ["detailed, implementation-ready suggestions"],
    "criticisms": ["critical technical issues requiring immediate attention"],
    "improvements": ["step-by-step concrete improvements with code/commands"],
    "enhanced_content": "Your significantly improved version with technical depth",
    "code_examples": ["working code examples relevant to your expertise"],
    "technical_details": ["platform-specific implementation details"],
    "security_considerations": ["security implications and mitigations"],
    "rationale": "Detailed technical explanation of your assessment"
}}

REQUIREMENTS:
- Include working code examples where applicable
- Reference research context specifically
- Be critical - scores below 8.0 indicate significant issues
- Focus on your expertise area but ensure overall quality"#,
            name = profile.name,
            expertise = profile.expertise,
            personality = profile.personality,
            focus = profile.focus_areas.join(", "),
            target = TARGET_QUALITY,
            style = profile.prompt_style,
            context = self.context,
            research = self.research_context,
            content = self.content,
            transcript = self.transcript.as_str(),
            requirements = requirements,
            role = self.role,
        )
    }
}

/// Inputs for the synthesis prompt, already capped by the synthesizer.
pub struct SynthesisPrompt<'a> {
    pub original_content: &'a str,
    pub context: &'a str,
    pub suggestions: &'a [&'a str],
    pub improvements: &'a [&'a str],
    pub criticisms: &'a [&'a str],
    pub enhanced_versions: &'a [&'a str],
}

impl SynthesisPrompt<'_> {
    pub fn render(&self) -> String {
        format!(
            r#"You are a content synthesis specialist. Your job is to create the highest quality final content by incorporating feedback from multiple expert agents.

ORIGINAL CONTENT:
{original}

CONTEXT: {context}

AGENT FEEDBACK SUMMARY:
Suggestions: {suggestions}
Improvements: {improvements}
Critical Issues: {criticisms}

ENHANCED VERSIONS FROM AGENTS:
{versions}

TASK: Create the final, highest-quality version that:
1. Addresses all critical issues
2. Incorporates the best suggestions and improvements
3. Maintains technical accuracy and clarity
4. Includes specific, actionable code examples where relevant
5. Follows best practices for security documentation

Focus on technical depth, practical examples, and actionable content.
"#,
            original = self.original_content,
            context = self.context,
            suggestions = self.suggestions.join("; "),
            improvements = self.improvements.join("; "),
            criticisms = self.criticisms.join("; "),
            versions = self.enhanced_versions.join("\n"),
        )
    }
}
