//! Rule set registry.
//!
//! Built-in rule sets are JSON documents embedded in the crate. Each call to
//! [`RuleSet::config`] parses a fresh, immutable [`RuleSetConfig`]; callers
//! that need a bespoke rule set pass their own document to
//! [`RuleSetConfig::from_json`].

use std::fmt;
use std::str::FromStr;

use regex::{Regex, RegexBuilder};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use utoipa::ToSchema;

use crate::error::{ComplianceError, Result};

const DOD_RULES: &str = include_str!("../rulesets/dod.json");
const PARTNER_RULES: &str = include_str!("../rulesets/partner.json");
const CUSTOM_RULES: &str = include_str!("../rulesets/custom.json");

/// Identifier of a built-in rule set.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RuleSet {
    /// Definition-of-done rules for published templates.
    Dod,
    /// Rules for partner-contributed templates.
    Partner,
    /// Minimal baseline for custom evaluations.
    Custom,
}

impl RuleSet {
    /// All built-in rule sets.
    pub const ALL: [RuleSet; 3] = [RuleSet::Dod, RuleSet::Partner, RuleSet::Custom];

    /// Lower-case identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleSet::Dod => "dod",
            RuleSet::Partner => "partner",
            RuleSet::Custom => "custom",
        }
    }

    /// Parse the embedded configuration for this rule set.
    pub fn config(&self) -> Result<RuleSetConfig> {
        let document = match self {
            RuleSet::Dod => DOD_RULES,
            RuleSet::Partner => PARTNER_RULES,
            RuleSet::Custom => CUSTOM_RULES,
        };
        RuleSetConfig::from_json(document)
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleSet {
    type Err = ComplianceError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "dod" => Ok(RuleSet::Dod),
            "partner" => Ok(RuleSet::Partner),
            "custom" => Ok(RuleSet::Custom),
            _ => Err(ComplianceError::UnknownRuleSet(value.to_string())),
        }
    }
}

/// A case-insensitive regular expression loaded from a rule set.
#[derive(Debug, Clone)]
pub struct Pattern(Regex);

impl Pattern {
    /// Compile a case-insensitive pattern.
    pub fn new(source: &str) -> std::result::Result<Self, regex::Error> {
        RegexBuilder::new(source)
            .case_insensitive(true)
            .build()
            .map(Self)
    }

    /// Source text of the pattern.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Whether the pattern matches anywhere in `text`.
    pub fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Pattern::new(&source).map_err(D::Error::custom)
    }
}

/// A workflow file that must exist somewhere in the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRequirement {
    /// Optional slug used in finding ids; derived from the pattern when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Pattern matched against lower-cased paths.
    pub pattern: Pattern,
    /// Issue message when no path matches.
    pub message: String,
}

/// A file that may live in any of several locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocRequirement {
    /// Optional slug used in finding ids; derived from the first pattern when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Alternative locations; any match satisfies the requirement.
    pub patterns: Vec<Pattern>,
    /// Issue message when nothing matches.
    pub message: String,
}

/// Architecture diagram requirement for the README.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchitectureDiagram {
    /// Level-2 heading text; empty disables the check.
    pub heading: String,
    /// Whether an image must follow the heading.
    pub requires_image: bool,
}

/// README structure requirements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadmeRequirements {
    /// Level-2 headings that must be present.
    pub required_headings: Vec<String>,
    /// Architecture diagram requirement.
    pub architecture_diagram: ArchitectureDiagram,
}

/// Infrastructure-as-code checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BicepChecks {
    /// Tokens every IaC file must contain.
    pub required_resources: Vec<String>,
    /// Whether to scan IaC files for identity and access weaknesses.
    #[serde(default)]
    pub security_best_practices: bool,
}

/// azure.yaml manifest rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureYamlRules {
    /// Whether a top-level `services:` key is required.
    pub must_define_services: bool,
}

/// AI model rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenAiRules {
    /// Model names that must not appear in IaC files.
    pub deprecated_models: Vec<String>,
}

/// AI agent guidance requirements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentsRequirements {
    /// Files that must exist at exact paths.
    #[serde(default)]
    pub required_files: Vec<String>,
}

/// Test asset requirements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestingRequirements {
    /// Pattern groups; each group must match at least one path.
    #[serde(default)]
    pub required_test_files: Vec<DocRequirement>,
}

/// An immutable rule set configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSetConfig {
    /// Revision of the rule set document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Files that must exist at exact paths.
    pub required_files: Vec<String>,
    /// Folders that must contain at least one file.
    pub required_folders: Vec<String>,
    /// Workflow files matched by pattern.
    pub required_workflow_files: Vec<WorkflowRequirement>,
    /// Documentation files that may live in several locations.
    pub required_doc_files: Vec<DocRequirement>,
    /// README structure requirements.
    pub readme_requirements: ReadmeRequirements,
    /// IaC checks.
    pub bicep_checks: BicepChecks,
    /// Manifest rules.
    pub azure_yaml_rules: AzureYamlRules,
    /// AI model rules.
    pub openai: OpenAiRules,
    /// AI agent guidance requirements.
    #[serde(default)]
    pub agents: AgentsRequirements,
    /// Test asset requirements.
    #[serde(default)]
    pub testing: TestingRequirements,
}

impl RuleSetConfig {
    /// Parse and validate a rule set document.
    pub fn from_json(document: &str) -> Result<Self> {
        let config: RuleSetConfig = serde_json::from_str(document)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let groups = self
            .required_doc_files
            .iter()
            .chain(&self.testing.required_test_files);
        for group in groups {
            if group.patterns.is_empty() {
                return Err(ComplianceError::InvalidRuleSet(serde_json::Error::custom(
                    format!("pattern group without patterns: {}", group.message),
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ComplianceError, Pattern, RuleSet, RuleSetConfig};

    #[test]
    fn built_in_rule_sets_parse() {
        for rule_set in RuleSet::ALL {
            let config = rule_set.config();
            assert!(config.is_ok(), "{rule_set} failed: {:?}", config.err());
        }
    }

    #[test]
    fn rule_set_parses_case_insensitively() {
        assert_eq!(" DoD ".parse::<RuleSet>().expect("parse"), RuleSet::Dod);
        assert_eq!("partner".parse::<RuleSet>().expect("parse"), RuleSet::Partner);
        match "gold".parse::<RuleSet>() {
            Err(ComplianceError::UnknownRuleSet(name)) => assert_eq!(name, "gold"),
            other => panic!("expected UnknownRuleSet, got {other:?}"),
        }
    }

    #[test]
    fn patterns_are_case_insensitive() {
        let pattern = Pattern::new(r"^security\.md$").expect("compile");
        assert!(pattern.is_match("SECURITY.md"));
        assert!(!pattern.is_match(".github/security.md"));
    }

    #[test]
    fn missing_required_field_is_fatal() {
        let document = r#"{"requiredFiles": []}"#;
        match RuleSetConfig::from_json(document) {
            Err(ComplianceError::InvalidRuleSet(err)) => {
                assert!(err.to_string().contains("missing field"));
            }
            other => panic!("expected InvalidRuleSet, got {other:?}"),
        }
    }

    #[test]
    fn invalid_pattern_is_fatal() {
        let document = minimal_document(r#"[{"pattern": "(", "message": "broken"}]"#, "[]");
        assert!(matches!(
            RuleSetConfig::from_json(&document),
            Err(ComplianceError::InvalidRuleSet(_))
        ));
    }

    #[test]
    fn empty_pattern_group_is_rejected() {
        let document = minimal_document("[]", r#"[{"patterns": [], "message": "no docs"}]"#);
        assert!(matches!(
            RuleSetConfig::from_json(&document),
            Err(ComplianceError::InvalidRuleSet(_))
        ));
    }

    #[test]
    fn optional_sections_default_to_no_checks() {
        let config = RuleSetConfig::from_json(&minimal_document("[]", "[]")).expect("parse");
        assert!(config.agents.required_files.is_empty());
        assert!(config.testing.required_test_files.is_empty());
        assert!(!config.bicep_checks.security_best_practices);
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = RuleSet::Dod.config().expect("dod");
        let json = serde_json::to_string(&config).expect("serialize");
        let parsed = RuleSetConfig::from_json(&json).expect("reparse");
        assert_eq!(parsed, config);
    }

    fn minimal_document(workflows: &str, docs: &str) -> String {
        format!(
            r#"{{
                "requiredFiles": [],
                "requiredFolders": [],
                "requiredWorkflowFiles": {workflows},
                "requiredDocFiles": {docs},
                "readmeRequirements": {{
                    "requiredHeadings": [],
                    "architectureDiagram": {{"heading": "", "requiresImage": false}}
                }},
                "bicepChecks": {{"requiredResources": []}},
                "azureYamlRules": {{"mustDefineServices": false}},
                "openai": {{"deprecatedModels": []}}
            }}"#
        )
    }
}
