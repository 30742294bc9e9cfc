//! Metadata Lint - Rule/Policy Separation
//!
//! Rules produce structured violations.
//! Severity decides whether the metadata still counts as installable.

use serde::{Deserialize, Serialize};

use crate::metadata::{DirectiveValue, MetadataConfig};
use crate::render::{GRANT_KEY, UNSAFE_WINDOW};

/// The GM API surface a host manager can grant, per the Greasemonkey 4
/// type declarations shipped to generated scripts.
pub const KNOWN_CAPABILITIES: &[&str] = &[
    "deleteValue",
    "getResourceURL",
    "getValue",
    "info",
    "listValues",
    "notification",
    "openInTab",
    "setClipboard",
    "setValue",
    "xmlHttpRequest",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViolationSeverity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationViolation {
    pub rule: String,
    pub severity: ViolationSeverity,
    pub message: String,
    pub directive: Option<String>,
    pub remediation: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub violations: Vec<ValidationViolation>,
}

impl ValidationResult {
    pub fn has_errors(&self) -> bool {
        self.violations
            .iter()
            .any(|v| v.severity == ViolationSeverity::Error)
    }
}

/// Lint rule trait - produces violations
pub trait LintRule {
    fn name(&self) -> &'static str;
    fn check(&self, config: &MetadataConfig) -> Vec<ValidationViolation>;
}

// --- Concrete Rules ---

/// Script managers refuse installs without a name and a version.
pub struct RequiredDirectivesRule;

impl LintRule for RequiredDirectivesRule {
    fn name(&self) -> &'static str {
        "required_directives"
    }

    fn check(&self, config: &MetadataConfig) -> Vec<ValidationViolation> {
        let mut violations = vec![];

        for required in ["name", "version"] {
            let present = matches!(
                config.get(required),
                Some(DirectiveValue::Text(s)) if !s.trim().is_empty()
            );
            if !present {
                violations.push(ValidationViolation {
                    rule: self.name().to_string(),
                    severity: ViolationSeverity::Error,
                    message: format!("missing required directive `{}`", required),
                    directive: Some(required.to_string()),
                    remediation: vec![format!(
                        "Declare `{}` as a non-empty string in the metadata document",
                        required
                    )],
                });
            }
        }

        violations
    }
}

/// Without a match or include pattern the script's run targets depend
/// entirely on the host manager's default.
pub struct TargetRule;

impl LintRule for TargetRule {
    fn name(&self) -> &'static str {
        "run_targets"
    }

    fn check(&self, config: &MetadataConfig) -> Vec<ValidationViolation> {
        let has_target = ["match", "include"].iter().any(|key| match config.get(key) {
            Some(DirectiveValue::Text(s)) => !s.is_empty(),
            Some(DirectiveValue::List(items)) => !items.is_empty(),
            _ => false,
        });

        if has_target {
            vec![]
        } else {
            vec![ValidationViolation {
                rule: self.name().to_string(),
                severity: ViolationSeverity::Warning,
                message: "no `match` or `include` target declared".to_string(),
                directive: None,
                remediation: vec![
                    "Add a `match` pattern listing the pages the script runs on".to_string(),
                ],
            }]
        }
    }
}

/// Grant entries should name a documented GM capability; anything else is
/// silently unavailable at runtime.
pub struct GrantCapabilityRule;

impl LintRule for GrantCapabilityRule {
    fn name(&self) -> &'static str {
        "grant_capabilities"
    }

    fn check(&self, config: &MetadataConfig) -> Vec<ValidationViolation> {
        let items = match config.get(GRANT_KEY) {
            Some(DirectiveValue::List(items)) => items,
            _ => return vec![],
        };

        items
            .iter()
            .filter(|item| item.as_str() != UNSAFE_WINDOW)
            .filter(|item| !KNOWN_CAPABILITIES.contains(&item.as_str()))
            .map(|item| ValidationViolation {
                rule: self.name().to_string(),
                severity: ViolationSeverity::Warning,
                message: format!("unknown grant capability `{}`", item),
                directive: Some(GRANT_KEY.to_string()),
                remediation: vec![
                    "Use one of the documented GM capabilities or `unsafeWindow`".to_string(),
                ],
            })
            .collect()
    }
}

/// Linter orchestrates rules over a loaded configuration
pub struct Linter {
    rules: Vec<Box<dyn LintRule>>,
}

impl Linter {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(RequiredDirectivesRule),
                Box::new(TargetRule),
                Box::new(GrantCapabilityRule),
            ],
        }
    }

    pub fn check(&self, config: &MetadataConfig) -> ValidationResult {
        let mut all_violations = vec![];

        for rule in &self.rules {
            all_violations.extend(rule.check(config));
        }

        let has_errors = all_violations
            .iter()
            .any(|v| v.severity == ViolationSeverity::Error);

        ValidationResult {
            valid: !has_errors,
            violations: all_violations,
        }
    }
}

impl Default for Linter {
    fn default() -> Self {
        Self::new()
    }
}
