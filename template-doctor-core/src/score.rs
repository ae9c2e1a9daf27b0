//! Overall scoring and the summary annotation.

use serde_json::json;

use crate::domain::{CategoryReports, CheckKind, Compliance, ComplianceItem, Findings};

/// Id of the summary item appended to every report.
pub const SUMMARY_ID: &str = "compliance-summary";

/// Rounded pass percentage; 0 when there is nothing to score.
///
/// Halves round up, so 1 of 8 is 13 and 1 of 3 is 33.
pub fn percentage(compliant: usize, issues: usize) -> u8 {
    let total = compliant + issues;
    if total == 0 {
        return 0;
    }
    let rounded = (compliant * 200 + total) / (total * 2);
    rounded.min(100) as u8
}

/// Score all findings and append the summary item.
///
/// The summary item is always the last compliant entry and is not counted.
pub fn aggregate(findings: Findings, categories: CategoryReports) -> Compliance {
    let Findings {
        issues,
        mut compliant,
    } = findings;
    let issue_count = issues.len();
    let compliant_count = compliant.len();
    let total_checks = issue_count + compliant_count;
    let percentage = percentage(compliant_count, issue_count);

    compliant.push(
        ComplianceItem::new(
            SUMMARY_ID,
            CheckKind::Meta,
            format!("{compliant_count} of {total_checks} checks passed"),
        )
        .with_details(json!({
            "issueCount": issue_count,
            "compliantCount": compliant_count,
            "totalChecks": total_checks,
            "percentageCompliant": percentage,
        })),
    );

    let headline = if issue_count == 0 {
        "No issues found"
    } else {
        "Issues found"
    };

    Compliance {
        issues,
        compliant,
        percentage,
        summary: format!("{headline} - Compliance: {percentage}%"),
        categories,
    }
}

#[cfg(test)]
mod tests {
    use super::{SUMMARY_ID, aggregate, percentage};
    use crate::domain::{CategoryReports, CheckKind, ComplianceItem, Findings, Issue};

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(1, 2), 33);
        assert_eq!(percentage(2, 1), 67);
        assert_eq!(percentage(1, 7), 13);
        assert_eq!(percentage(1, 1), 50);
        assert_eq!(percentage(5, 0), 100);
        assert_eq!(percentage(0, 5), 0);
    }

    #[test]
    fn percentage_stays_in_range() {
        for compliant in 0..40 {
            for issues in 0..40 {
                assert!(percentage(compliant, issues) <= 100);
            }
        }
    }

    #[test]
    fn summary_item_is_last_and_not_counted() {
        let mut findings = Findings::new();
        findings.pass(ComplianceItem::new("file-readme.md", CheckKind::RequiredFile, "ok"));
        findings.pass(ComplianceItem::new("folder-infra", CheckKind::Folder, "ok"));
        findings.issue(Issue::error("missing-license", CheckKind::RequiredFile, "missing"));

        let compliance = aggregate(findings, CategoryReports::default());

        assert_eq!(compliance.percentage, 67);
        assert_eq!(compliance.summary, "Issues found - Compliance: 67%");
        let summary = compliance.compliant.last().expect("summary item");
        assert_eq!(summary.id, SUMMARY_ID);
        assert_eq!(summary.category, CheckKind::Meta);
        let details = summary.details.as_ref().expect("details");
        assert_eq!(details["issueCount"], 1);
        assert_eq!(details["compliantCount"], 2);
        assert_eq!(details["totalChecks"], 3);
        assert_eq!(details["percentageCompliant"], 67);
    }

    #[test]
    fn empty_findings_report_no_issues() {
        let compliance = aggregate(Findings::new(), CategoryReports::default());
        assert_eq!(compliance.percentage, 0);
        assert_eq!(compliance.summary, "No issues found - Compliance: 0%");
        assert_eq!(compliance.compliant.len(), 1);
    }
}
