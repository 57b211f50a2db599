//! Deterministic finding extraction from raw research text.
//!
//! Keyword classification is case-insensitive substring matching. Artifact
//! extraction uses regexes; every list is deduplicated in first-seen order
//! and capped.

use std::sync::LazyLock;

use regex::Regex;

/// Tools recognized in research text, in reporting order.
pub const TOOL_VOCABULARY: &[&str] = &[
    "mimikatz",
    "powershell",
    "cmd",
    "wmic",
    "net.exe",
    "rundll32",
    "regsvr32",
    "mshta",
    "cscript",
    "wscript",
    "psexec",
    "winrm",
    "cobalt strike",
    "metasploit",
    "empire",
    "bloodhound",
];

/// Line markers that identify a command-like line.
const COMMAND_MARKERS: &[&str] = &["powershell", "cmd", "net ", "reg "];

pub const MAX_KEY_INSIGHTS: usize = 10;
pub const MAX_COMMANDS: usize = 5;
pub const MAX_ARTIFACTS: usize = 10;
pub const MAX_CODE_EXAMPLES: usize = 5;

const INSIGHT_TEXTS: usize = 3;
const INSIGHTS_PER_TEXT: usize = 2;
const MIN_INSIGHT_CHARS: usize = 50;

static REGISTRY_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bHK(?:LM|CU|CR|U|CC|EY_[A-Z_]+)\\[^\s"'<>|,;]+"#)
        .expect("REGISTRY_KEY regex should compile")
});

static WINDOWS_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b[a-z]:\\[^\s"'<>|,;]+"#).expect("WINDOWS_PATH regex should compile")
});

static POSIX_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:^|[\s"'(])(/(?:etc|tmp|var|usr|home|root)/[^\s"'<>|,;)]*)"#)
        .expect("POSIX_PATH regex should compile")
});

static SUSPICIOUS_FILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b[\w.-]+\.(?:exe|dll|ps1|bat|vbs|hta)\b")
        .expect("SUSPICIOUS_FILE regex should compile")
});

static IPV4: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)\.){3}(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)(?::\d{1,5})?\b")
        .expect("IPV4 regex should compile")
});

static HOST_PORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b[a-z0-9](?:[a-z0-9-]*[a-z0-9])?(?:\.[a-z0-9](?:[a-z0-9-]*[a-z0-9])?)*\.[a-z]{2,}:\d{1,5}\b")
        .expect("HOST_PORT regex should compile")
});

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[\w+-]*[ \t]*\r?\n(.*?)```").expect("CODE_FENCE regex should compile")
});

/// Everything derivable from a block of research text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Findings {
    pub tools: Vec<String>,
    pub indicators: Vec<String>,
    pub detection_methods: Vec<String>,
    pub mitigations: Vec<String>,
    pub command_signatures: Vec<String>,
    pub registry_keys: Vec<String>,
    pub file_artifacts: Vec<String>,
    pub network_indicators: Vec<String>,
    pub code_examples: Vec<String>,
}

pub fn extract_findings(text: &str) -> Findings {
    let lower = text.to_lowercase();
    Findings {
        tools: tools_mentioned(&lower),
        indicators: indicator_hints(&lower),
        detection_methods: detection_hints(&lower),
        mitigations: mitigation_hints(&lower),
        command_signatures: command_signatures(text),
        registry_keys: registry_keys(text),
        file_artifacts: file_artifacts(text),
        network_indicators: network_indicators(text),
        code_examples: code_examples(text),
    }
}

/// Leading sentences of the first few texts.
///
/// Sentences are split on `.`, and only those longer than 50 characters
/// after trimming qualify.
pub fn key_insights(texts: &[String]) -> Vec<String> {
    texts
        .iter()
        .take(INSIGHT_TEXTS)
        .flat_map(|text| {
            text.split('.')
                .map(str::trim)
                .filter(|s| s.chars().count() > MIN_INSIGHT_CHARS)
                .take(INSIGHTS_PER_TEXT)
                .map(str::to_string)
        })
        .take(MAX_KEY_INSIGHTS)
        .collect()
}

fn tools_mentioned(lower: &str) -> Vec<String> {
    TOOL_VOCABULARY
        .iter()
        .filter(|tool| lower.contains(*tool))
        .map(|tool| tool.to_string())
        .collect()
}

fn indicator_hints(lower: &str) -> Vec<String> {
    let mut out = Vec::new();
    if lower.contains("registry") {
        out.extend(["Registry modifications detected", "HKLM/HKCU key access"]);
    }
    if lower.contains("process") {
        out.extend([
            "Suspicious process creation",
            "Parent-child process relationships",
        ]);
    }
    if lower.contains("network") {
        out.extend(["Network connections", "DNS queries", "HTTP requests"]);
    }
    out.into_iter().map(str::to_string).collect()
}

fn detection_hints(lower: &str) -> Vec<String> {
    let rules: [(&[&str], &str); 4] = [
        (&["event log", "eventlog"], "Windows Event Log analysis"),
        (&["sysmon"], "Sysmon monitoring"),
        (&["edr", "endpoint detection"], "EDR/EPP solutions"),
        (&["network monitoring"], "Network traffic analysis"),
    ];
    apply_rules(lower, &rules)
}

fn mitigation_hints(lower: &str) -> Vec<String> {
    let rules: [(&[&str], &str); 3] = [
        (&["privilege"], "Implement least privilege access"),
        (&["monitoring"], "Enhanced logging and monitoring"),
        (&["application control"], "Application whitelisting/control"),
    ];
    apply_rules(lower, &rules)
}

fn apply_rules(lower: &str, rules: &[(&[&str], &str)]) -> Vec<String> {
    rules
        .iter()
        .filter(|(needles, _)| needles.iter().any(|n| lower.contains(n)))
        .map(|(_, label)| label.to_string())
        .collect()
}

/// Trimmed lines that look like shell commands.
pub fn command_signatures(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    for line in text.lines() {
        let lower = line.to_lowercase();
        if COMMAND_MARKERS.iter().any(|m| lower.contains(m)) {
            push_capped(&mut out, line.trim(), MAX_COMMANDS);
        }
    }
    out
}

pub fn registry_keys(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    for m in REGISTRY_KEY.find_iter(text) {
        push_capped(&mut out, clean(m.as_str()), MAX_ARTIFACTS);
    }
    out
}

/// Windows and POSIX paths, then bare suspicious file names not already
/// covered by a captured path.
pub fn file_artifacts(text: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for m in WINDOWS_PATH.find_iter(text) {
        push_capped(&mut out, clean(m.as_str()), MAX_ARTIFACTS);
    }
    for caps in POSIX_PATH.captures_iter(text) {
        if let Some(path) = caps.get(1) {
            push_capped(&mut out, clean(path.as_str()), MAX_ARTIFACTS);
        }
    }
    for m in SUSPICIOUS_FILE.find_iter(text) {
        let name = clean(m.as_str());
        if !out.iter().any(|p| p.contains(name)) {
            push_capped(&mut out, name, MAX_ARTIFACTS);
        }
    }
    out
}

pub fn network_indicators(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    for m in IPV4.find_iter(text).chain(HOST_PORT.find_iter(text)) {
        push_capped(&mut out, m.as_str(), MAX_ARTIFACTS);
    }
    out
}

/// Bodies of fenced code blocks.
pub fn code_examples(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    for caps in CODE_FENCE.captures_iter(text) {
        if let Some(body) = caps.get(1) {
            let body = body.as_str().trim();
            if !body.is_empty() {
                push_capped(&mut out, body, MAX_CODE_EXAMPLES);
            }
        }
    }
    out
}

fn clean(raw: &str) -> &str {
    raw.trim_end_matches(['.', ')', ']', ':'])
}

fn push_capped(out: &mut Vec<String>, item: &str, cap: usize) {
    if out.len() < cap && !item.is_empty() && !out.iter().any(|x| x == item) {
        out.push(item.to_string());
    }
}
