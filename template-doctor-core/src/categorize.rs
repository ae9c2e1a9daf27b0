//! Mapping of findings onto report categories.

use crate::domain::{
    CategoryReport, CategoryReports, CheckKind, ComplianceItem, Issue, ReportCategory,
};
use crate::rules::RuleSetConfig;
use crate::score::percentage;

/// Report category for a check kind; `None` for report-level annotations.
///
/// This table is the only place check kinds are tied to categories.
pub fn report_category(kind: CheckKind) -> Option<ReportCategory> {
    match kind {
        CheckKind::RequiredFile
        | CheckKind::WorkflowFile
        | CheckKind::DocFile
        | CheckKind::Folder
        | CheckKind::ReadmeHeading
        | CheckKind::ArchitectureDiagram
        | CheckKind::Readme => Some(ReportCategory::RepositoryManagement),
        CheckKind::BicepFiles | CheckKind::BicepResource | CheckKind::AzureYaml => {
            Some(ReportCategory::Deployment)
        }
        CheckKind::BicepSecurity => Some(ReportCategory::Security),
        CheckKind::DeprecatedModel => Some(ReportCategory::FunctionalRequirements),
        CheckKind::TestFile => Some(ReportCategory::Testing),
        CheckKind::AgentsFile => Some(ReportCategory::Agents),
        CheckKind::Meta => None,
    }
}

/// Whether the rule set defines any checks feeding `category`.
pub fn is_enabled(config: &RuleSetConfig, category: ReportCategory) -> bool {
    match category {
        ReportCategory::RepositoryManagement => {
            let readme = &config.readme_requirements;
            !config.required_files.is_empty()
                || !config.required_folders.is_empty()
                || !config.required_workflow_files.is_empty()
                || !config.required_doc_files.is_empty()
                || !readme.required_headings.is_empty()
                || !readme.architecture_diagram.heading.trim().is_empty()
        }
        ReportCategory::FunctionalRequirements => !config.openai.deprecated_models.is_empty(),
        ReportCategory::Deployment => true,
        ReportCategory::Security => config.bicep_checks.security_best_practices,
        ReportCategory::Testing => !config.testing.required_test_files.is_empty(),
        ReportCategory::Agents => !config.agents.required_files.is_empty(),
    }
}

/// Partition findings into the fixed categories and score each one.
///
/// Every category is present in the result, even without findings.
pub fn categorize(
    config: &RuleSetConfig,
    issues: &[Issue],
    compliant: &[ComplianceItem],
) -> CategoryReports {
    let mut reports = CategoryReports::default();

    for issue in issues {
        if let Some(category) = report_category(issue.category) {
            reports.get_mut(category).issues.push(issue.clone());
        }
    }
    for item in compliant {
        if let Some(category) = report_category(item.category) {
            reports.get_mut(category).compliant.push(item.clone());
        }
    }

    for category in ReportCategory::ALL {
        let report: &mut CategoryReport = reports.get_mut(category);
        report.enabled = is_enabled(config, category);
        report.percentage = percentage(report.compliant.len(), report.issues.len());
    }

    reports
}
