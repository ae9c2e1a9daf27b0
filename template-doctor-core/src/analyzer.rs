//! Report assembly: runs every evaluator and scores the results.

use chrono::{DateTime, Utc};

use crate::bicep::check_bicep;
use crate::categorize::categorize;
use crate::checks::{
    check_agents_files, check_doc_files, check_required_files, check_required_folders,
    check_test_files, check_workflow_files,
};
use crate::domain::{ComplianceReport, Findings};
use crate::error::Result;
use crate::inventory::{ContentSource, FileInventory};
use crate::manifest::check_manifest;
use crate::readme::check_readme;
use crate::rules::{RuleSet, RuleSetConfig};
use crate::score::aggregate;

/// Evaluates repository snapshots against one rule set.
///
/// The analyzer holds no state between calls; the same inputs always produce
/// the same findings in the same order.
pub struct ComplianceAnalyzer<S: ContentSource> {
    source: S,
    rule_set: RuleSet,
    config: RuleSetConfig,
}

impl<S: ContentSource> ComplianceAnalyzer<S> {
    /// Create an analyzer for a built-in rule set.
    pub fn new(source: S, rule_set: RuleSet) -> Result<Self> {
        let config = rule_set.config()?;
        Ok(Self::with_config(source, rule_set, config))
    }

    /// Create an analyzer with an explicit rule set configuration.
    pub fn with_config(source: S, rule_set: RuleSet, config: RuleSetConfig) -> Self {
        Self {
            source,
            rule_set,
            config,
        }
    }

    /// Evaluate an inventory, stamping the report with the current time.
    pub fn analyze(&self, repo_url: &str, inventory: &FileInventory) -> Result<ComplianceReport> {
        self.analyze_at(repo_url, inventory, Utc::now())
    }

    /// Evaluate an inventory with an explicit report timestamp.
    pub fn analyze_at(
        &self,
        repo_url: &str,
        inventory: &FileInventory,
        timestamp: DateTime<Utc>,
    ) -> Result<ComplianceReport> {
        let findings = self.evaluate(inventory)?;
        let categories = categorize(&self.config, &findings.issues, &findings.compliant);
        let compliance = aggregate(findings, categories);
        log::info!(
            "{repo_url} scored {}% against {} ({} issues)",
            compliance.percentage,
            self.rule_set,
            compliance.issues.len()
        );

        Ok(ComplianceReport {
            repo_url: repo_url.to_string(),
            rule_set: self.rule_set,
            timestamp,
            compliance,
        })
    }

    /// Run every evaluator in report order.
    pub fn evaluate(&self, inventory: &FileInventory) -> Result<Findings> {
        let config = &self.config;
        let mut findings = Findings::new();
        if inventory.is_empty() {
            log::warn!("evaluating an empty inventory against {}", self.rule_set);
        } else {
            log::debug!("evaluating {} files against {}", inventory.len(), self.rule_set);
        }

        record(
            &mut findings,
            "required files",
            check_required_files(&config.required_files, inventory),
        );
        record(
            &mut findings,
            "workflow files",
            check_workflow_files(&config.required_workflow_files, inventory),
        );
        record(
            &mut findings,
            "doc files",
            check_doc_files(&config.required_doc_files, inventory),
        );
        record(
            &mut findings,
            "folders",
            check_required_folders(&config.required_folders, inventory),
        );
        record(
            &mut findings,
            "readme",
            check_readme(&config.readme_requirements, inventory, &self.source),
        );
        record(
            &mut findings,
            "iac",
            check_bicep(&config.bicep_checks, &config.openai, inventory, &self.source)?,
        );
        record(
            &mut findings,
            "manifest",
            check_manifest(&config.azure_yaml_rules, inventory, &self.source),
        );
        record(
            &mut findings,
            "test files",
            check_test_files(&config.testing.required_test_files, inventory),
        );
        record(
            &mut findings,
            "agents files",
            check_agents_files(&config.agents.required_files, inventory),
        );

        Ok(findings)
    }
}

fn record(findings: &mut Findings, step: &str, produced: Findings) {
    log::debug!(
        "{step}: {} issues, {} passed",
        produced.issues.len(),
        produced.compliant.len()
    );
    findings.extend(produced);
}

/// Evaluate an inventory whose entries carry their own content.
pub fn analyze_inventory(
    repo_url: &str,
    rule_set: RuleSet,
    inventory: &FileInventory,
) -> Result<ComplianceReport> {
    ComplianceAnalyzer::new(inventory, rule_set)?.analyze(repo_url, inventory)
}

#[cfg(test)]
mod tests {
    use super::{ComplianceAnalyzer, analyze_inventory};
    use crate::domain::Severity;
    use crate::error::ComplianceError;
    use crate::inventory::{FileEntry, FileInventory, MockContentSource};
    use crate::rules::{RuleSet, RuleSetConfig};
    use crate::score::SUMMARY_ID;

    #[test]
    fn findings_follow_evaluator_order() {
        let inventory = FileInventory::from_paths(["README.md"]);
        let mut source = MockContentSource::new();
        source
            .expect_read_to_string()
            .returning(|_| Ok("## Getting Started\n".to_string()));

        let analyzer = ComplianceAnalyzer::new(source, RuleSet::Custom).expect("analyzer");
        let findings = analyzer.evaluate(&inventory).expect("findings");

        let issues: Vec<&str> = findings.issues.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(
            issues,
            vec!["missing-license", "bicep-files-missing", "missing-azure-yaml"]
        );
        let compliant: Vec<&str> = findings.compliant.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(compliant, vec!["file-readme.md", "readme-heading-getting-started"]);
    }

    #[test]
    fn read_failures_never_abort() {
        let inventory = FileInventory::from_paths(["README.md", "azure.yaml", "infra/main.bicep"]);
        let mut source = MockContentSource::new();
        source
            .expect_read_to_string()
            .times(3)
            .returning(|path| Err(ComplianceError::ContentUnavailable(path.to_string())));

        let analyzer = ComplianceAnalyzer::new(source, RuleSet::Dod).expect("analyzer");
        let report = analyzer.analyze("https://example.com/repo", &inventory).expect("report");

        let warnings: Vec<&str> = report
            .compliance
            .issues
            .iter()
            .filter(|issue| issue.severity == Severity::Warning)
            .map(|issue| issue.id.as_str())
            .collect();
        assert_eq!(
            warnings,
            vec![
                "readme-unreadable",
                "bicep-unreadable-infra-main.bicep",
                "azure-yaml-unreadable"
            ]
        );
    }

    #[test]
    fn empty_inventory_still_runs_every_step() {
        let inventory = FileInventory::default();
        let mut source = MockContentSource::new();
        source.expect_read_to_string().never();

        let analyzer = ComplianceAnalyzer::new(source, RuleSet::Custom).expect("analyzer");
        let findings = analyzer.evaluate(&inventory).expect("findings");

        let issues: Vec<&str> = findings.issues.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(
            issues,
            vec![
                "missing-readme.md",
                "missing-license",
                "bicep-files-missing",
                "missing-azure-yaml"
            ]
        );
        assert!(findings.compliant.is_empty());
    }

    #[test]
    fn summary_item_closes_the_report() {
        let inventory = FileInventory::new(vec![
            FileEntry::with_content("README.md", "## Getting Started\n"),
            FileEntry::new("LICENSE"),
        ]);

        let report = analyze_inventory("https://example.com/repo", RuleSet::Custom, &inventory)
            .expect("report");

        let last = report.compliance.compliant.last().expect("summary");
        assert_eq!(last.id, SUMMARY_ID);
        assert_eq!(report.rule_set, RuleSet::Custom);
        assert_eq!(report.repo_url, "https://example.com/repo");
    }

    #[test]
    fn custom_config_drives_agents_and_testing() {
        let document = r#"{
            "requiredFiles": [],
            "requiredFolders": [],
            "requiredWorkflowFiles": [],
            "requiredDocFiles": [],
            "readmeRequirements": {
                "requiredHeadings": [],
                "architectureDiagram": {"heading": "", "requiresImage": false}
            },
            "bicepChecks": {"requiredResources": []},
            "azureYamlRules": {"mustDefineServices": false},
            "openai": {"deprecatedModels": []},
            "agents": {"requiredFiles": ["AGENTS.md"]},
            "testing": {"requiredTestFiles": [{"id": "e2e", "patterns": ["^tests/"], "message": "No tests"}]}
        }"#;
        let config = RuleSetConfig::from_json(document).expect("config");
        let inventory = FileInventory::from_paths(["AGENTS.md", "azure.yaml", "infra/main.bicep"]);
        let mut source = MockContentSource::new();
        source
            .expect_read_to_string()
            .returning(|_| Ok(String::new()));

        let analyzer = ComplianceAnalyzer::with_config(source, RuleSet::Custom, config);
        let report = analyzer.analyze("repo", &inventory).expect("report");

        let categories = &report.compliance.categories;
        assert!(categories.agents.enabled);
        assert_eq!(categories.agents.percentage, 100);
        assert!(categories.testing.enabled);
        assert_eq!(categories.testing.issues[0].id, "missing-test-e2e");
        assert_eq!(categories.testing.percentage, 0);
    }
}
