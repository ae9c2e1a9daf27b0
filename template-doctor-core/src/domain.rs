//! Domain entities for compliance reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::rules::RuleSet;

/// Severity of a failed check.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The check failed.
    Error,
    /// The check could not be completed or is advisory.
    Warning,
}

/// The kind of check that produced a finding.
///
/// Every evaluator tags its findings with one of these; the categorizer maps
/// them onto report categories.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum CheckKind {
    /// A required file at an exact path.
    RequiredFile,
    /// A required CI workflow file.
    WorkflowFile,
    /// A documentation file that may live in several places.
    DocFile,
    /// A required top-level folder.
    Folder,
    /// A required README heading.
    ReadmeHeading,
    /// The README architecture diagram heading and image.
    ArchitectureDiagram,
    /// README availability.
    Readme,
    /// Presence and readability of IaC files.
    BicepFiles,
    /// A required resource declared in an IaC file.
    BicepResource,
    /// Deprecated AI model references in IaC files.
    DeprecatedModel,
    /// Security posture of an IaC file.
    BicepSecurity,
    /// The azure.yaml deployment manifest.
    AzureYaml,
    /// AI agent guidance files.
    AgentsFile,
    /// Test files or test workflows.
    TestFile,
    /// Report-level summary annotation.
    Meta,
}

/// A failed check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Issue {
    /// Stable identifier derived from the rule and matched path.
    pub id: String,
    /// Issue severity.
    pub severity: Severity,
    /// Check kind that produced the issue.
    pub category: CheckKind,
    /// Human-readable description.
    pub message: String,
    /// Underlying error text when the check could not run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Issue {
    /// Create an error-severity issue.
    pub fn error(id: impl Into<String>, category: CheckKind, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            severity: Severity::Error,
            category,
            message: message.into(),
            error: None,
        }
    }

    /// Create a warning-severity issue.
    pub fn warning(id: impl Into<String>, category: CheckKind, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(id, category, message)
        }
    }

    /// Attach the underlying error text.
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// A passed check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ComplianceItem {
    /// Stable identifier derived from the rule and matched path.
    pub id: String,
    /// Check kind that produced the item.
    pub category: CheckKind,
    /// Human-readable description.
    pub message: String,
    /// Structured evidence for the passed check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<Value>,
}

impl ComplianceItem {
    /// Create a compliance item without details.
    pub fn new(id: impl Into<String>, category: CheckKind, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            category,
            message: message.into(),
            details: None,
        }
    }

    /// Attach structured details.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Ordered findings emitted by one or more evaluators.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Findings {
    /// Failed checks in emission order.
    pub issues: Vec<Issue>,
    /// Passed checks in emission order.
    pub compliant: Vec<ComplianceItem>,
}

impl Findings {
    /// Create an empty findings list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failed check.
    pub fn issue(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    /// Record a passed check.
    pub fn pass(&mut self, item: ComplianceItem) {
        self.compliant.push(item);
    }

    /// Append another evaluator's findings, preserving order.
    pub fn extend(&mut self, other: Findings) {
        self.issues.extend(other.issues);
        self.compliant.extend(other.compliant);
    }

    /// Total number of findings.
    pub fn len(&self) -> usize {
        self.issues.len() + self.compliant.len()
    }

    /// Whether no findings were recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A heading extracted from a markdown document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadmeHeading {
    /// Heading level, 1 through 6.
    pub level: u8,
    /// Trimmed heading text.
    pub text: String,
    /// Whether an image reference follows the heading closely.
    pub has_image: bool,
}

/// The fixed report categories.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum ReportCategory {
    /// Repository layout, documentation and workflows.
    RepositoryManagement,
    /// Functional requirements such as supported AI models.
    FunctionalRequirements,
    /// Infrastructure and deployment manifests.
    Deployment,
    /// Security posture of the infrastructure.
    Security,
    /// Test assets.
    Testing,
    /// AI agent guidance.
    Agents,
}

impl ReportCategory {
    /// All categories in report order.
    pub const ALL: [ReportCategory; 6] = [
        ReportCategory::RepositoryManagement,
        ReportCategory::FunctionalRequirements,
        ReportCategory::Deployment,
        ReportCategory::Security,
        ReportCategory::Testing,
        ReportCategory::Agents,
    ];

    /// Serialized key of the category.
    pub fn key(&self) -> &'static str {
        match self {
            ReportCategory::RepositoryManagement => "repositoryManagement",
            ReportCategory::FunctionalRequirements => "functionalRequirements",
            ReportCategory::Deployment => "deployment",
            ReportCategory::Security => "security",
            ReportCategory::Testing => "testing",
            ReportCategory::Agents => "agents",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            ReportCategory::RepositoryManagement => "Repository Management",
            ReportCategory::FunctionalRequirements => "Functional Requirements",
            ReportCategory::Deployment => "Deployment",
            ReportCategory::Security => "Security",
            ReportCategory::Testing => "Testing",
            ReportCategory::Agents => "Agents",
        }
    }
}

/// Scored findings for one report category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategoryReport {
    /// Whether the rule set defines checks for this category.
    pub enabled: bool,
    /// Failed checks in this category.
    pub issues: Vec<Issue>,
    /// Passed checks in this category.
    pub compliant: Vec<ComplianceItem>,
    /// Pass percentage, 0-100.
    pub percentage: u8,
}

/// Per-category reports. Every category is always present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryReports {
    /// Repository management findings.
    pub repository_management: CategoryReport,
    /// Functional requirement findings.
    pub functional_requirements: CategoryReport,
    /// Deployment findings.
    pub deployment: CategoryReport,
    /// Security findings.
    pub security: CategoryReport,
    /// Testing findings.
    pub testing: CategoryReport,
    /// Agent findings.
    pub agents: CategoryReport,
}

impl CategoryReports {
    /// Borrow the report for a category.
    pub fn get(&self, category: ReportCategory) -> &CategoryReport {
        match category {
            ReportCategory::RepositoryManagement => &self.repository_management,
            ReportCategory::FunctionalRequirements => &self.functional_requirements,
            ReportCategory::Deployment => &self.deployment,
            ReportCategory::Security => &self.security,
            ReportCategory::Testing => &self.testing,
            ReportCategory::Agents => &self.agents,
        }
    }

    /// Mutably borrow the report for a category.
    pub fn get_mut(&mut self, category: ReportCategory) -> &mut CategoryReport {
        match category {
            ReportCategory::RepositoryManagement => &mut self.repository_management,
            ReportCategory::FunctionalRequirements => &mut self.functional_requirements,
            ReportCategory::Deployment => &mut self.deployment,
            ReportCategory::Security => &mut self.security,
            ReportCategory::Testing => &mut self.testing,
            ReportCategory::Agents => &mut self.agents,
        }
    }
}

/// Scored compliance results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Compliance {
    /// All failed checks in evaluator order.
    pub issues: Vec<Issue>,
    /// All passed checks in evaluator order, summary item last.
    pub compliant: Vec<ComplianceItem>,
    /// Overall pass percentage, 0-100.
    pub percentage: u8,
    /// One-line summary.
    pub summary: String,
    /// Per-category breakdown.
    pub categories: CategoryReports,
}

/// Compliance report for one repository snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceReport {
    /// Repository URL the inventory was taken from.
    pub repo_url: String,
    /// Rule set used for the evaluation.
    pub rule_set: RuleSet,
    /// Evaluation time.
    pub timestamp: DateTime<Utc>,
    /// Scored results.
    pub compliance: Compliance,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_keeps_identity_fields() {
        let issue = Issue::warning("readme-unreadable", CheckKind::Readme, "Could not read")
            .with_error("timeout");
        assert_eq!(issue.severity, Severity::Warning);
        assert_eq!(issue.id, "readme-unreadable");
        assert_eq!(issue.error.as_deref(), Some("timeout"));
    }

    #[test]
    fn issue_serializes_without_empty_error() {
        let issue = Issue::error("missing-license", CheckKind::RequiredFile, "Missing LICENSE");
        let json = serde_json::to_value(&issue).expect("serialize");
        assert_eq!(json["severity"], "error");
        assert_eq!(json["category"], "requiredFile");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn category_reports_serialize_fixed_keys() {
        let json = serde_json::to_value(CategoryReports::default()).expect("serialize");
        let keys: Vec<&str> = json
            .as_object()
            .expect("object")
            .keys()
            .map(String::as_str)
            .collect();
        for category in ReportCategory::ALL {
            assert!(keys.contains(&category.key()), "missing {}", category.key());
        }
        assert_eq!(keys.len(), 6);
    }

    #[test]
    fn findings_extend_preserves_order() {
        let mut first = Findings::new();
        first.issue(Issue::error("a", CheckKind::RequiredFile, "a"));
        let mut second = Findings::new();
        second.issue(Issue::error("b", CheckKind::Folder, "b"));
        second.pass(ComplianceItem::new("c", CheckKind::Folder, "c"));

        first.extend(second);

        let ids: Vec<&str> = first.issues.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(first.len(), 3);
    }
}
