//! Report formatting utilities.

use std::fmt::Write;

use serde::Serialize;

use crate::domain::{
    CategoryReports, ComplianceItem, ComplianceReport, Issue, ReportCategory, Severity,
};
use crate::score::SUMMARY_ID;

/// Render any serializable report payload as JSON.
pub fn render_json<T: Serialize + ?Sized>(payload: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(payload)
}

/// Render a compliance report as Markdown.
pub fn render_markdown(report: &ComplianceReport) -> String {
    let mut output = String::new();
    let compliance = &report.compliance;
    let _ = writeln!(output, "# Compliance Report\n");
    let _ = writeln!(output, "- Repository: {}", report.repo_url);
    let _ = writeln!(output, "- Rule set: {}", report.rule_set);
    let _ = writeln!(output, "- Generated: {}", report.timestamp.to_rfc3339());
    let _ = writeln!(output, "- Result: {}\n", compliance.summary);
    append_categories(&mut output, &compliance.categories);
    append_issues(&mut output, &compliance.issues);
    append_passed(&mut output, &compliance.compliant);
    output
}

fn append_categories(output: &mut String, categories: &CategoryReports) {
    let _ = writeln!(output, "## Categories\n");
    let _ = writeln!(output, "| Category | Passed | Issues | Score |");
    let _ = writeln!(output, "| --- | --- | --- | --- |");
    for category in ReportCategory::ALL {
        let report = categories.get(category);
        if !report.enabled {
            let _ = writeln!(output, "| {} | - | - | disabled |", category.label());
            continue;
        }
        let _ = writeln!(
            output,
            "| {} | {} | {} | {}% |",
            category.label(),
            report.compliant.len(),
            report.issues.len(),
            report.percentage
        );
    }
    let _ = writeln!(output);
}

fn append_issues(output: &mut String, issues: &[Issue]) {
    if issues.is_empty() {
        let _ = writeln!(output, "## Issues\nNo issues found.\n");
        return;
    }
    let _ = writeln!(output, "## Issues");
    for issue in issues {
        let marker = match issue.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        let _ = write!(output, "- [{marker}] {} (`{}`)", issue.message, issue.id);
        if let Some(error) = &issue.error {
            let _ = write!(output, ": {error}");
        }
        let _ = writeln!(output);
    }
    let _ = writeln!(output);
}

fn append_passed(output: &mut String, compliant: &[ComplianceItem]) {
    let passed: Vec<&ComplianceItem> = compliant
        .iter()
        .filter(|item| item.id != SUMMARY_ID)
        .collect();
    if passed.is_empty() {
        let _ = writeln!(output, "## Passed\nNo checks passed.\n");
        return;
    }
    let _ = writeln!(output, "## Passed");
    for item in passed {
        let _ = writeln!(output, "- {} (`{}`)", item.message, item.id);
    }
    let _ = writeln!(output);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze_inventory;
    use crate::inventory::{FileEntry, FileInventory};
    use crate::rules::RuleSet;

    fn sample_report() -> ComplianceReport {
        let inventory = FileInventory::new(vec![
            FileEntry::with_content("README.md", "## Getting Started\n"),
            FileEntry::new("azure.yaml"),
        ]);
        analyze_inventory("https://example.com/repo", RuleSet::Custom, &inventory).expect("report")
    }

    #[test]
    fn renders_markdown_sections() {
        let output = render_markdown(&sample_report());
        assert!(output.contains("# Compliance Report"));
        assert!(output.contains("- Rule set: custom"));
        assert!(output.contains("| Security | - | - | disabled |"));
        assert!(output.contains("[error] Missing required file: LICENSE (`missing-license`)"));
        assert!(output.contains("README has required heading: Getting Started"));
        assert!(!output.contains(SUMMARY_ID));
    }

    #[test]
    fn renders_json_payload() {
        let json = render_json(&sample_report()).expect("json");
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("parse");
        assert_eq!(parsed["ruleSet"], "custom");
        assert_eq!(parsed["repoUrl"], "https://example.com/repo");
        assert!(parsed["compliance"]["categories"].get("meta").is_none());
        assert_eq!(
            parsed["compliance"]["categories"]["repositoryManagement"]["enabled"],
            true
        );
    }
}
