//! azure.yaml manifest evaluator.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::json;

use crate::domain::{CheckKind, ComplianceItem, Findings, Issue};
use crate::inventory::{ContentSource, FileInventory};
use crate::rules::AzureYamlRules;

/// Accepted manifest file names at the repository root.
pub const MANIFEST_NAMES: &[&str] = &["azure.yaml", "azure.yml"];

static SERVICES_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^services\s*:").expect("valid services regex"));

/// Check that the manifest exists and, if required, defines services.
pub fn check_manifest<S: ContentSource>(
    rules: &AzureYamlRules,
    inventory: &FileInventory,
    source: &S,
) -> Findings {
    let mut findings = Findings::new();
    let Some(path) = MANIFEST_NAMES
        .iter()
        .find_map(|name| inventory.find_exact(name))
    else {
        findings.issue(Issue::error(
            "missing-azure-yaml",
            CheckKind::AzureYaml,
            "Missing azure.yaml or azure.yml deployment manifest",
        ));
        return findings;
    };

    findings.pass(
        ComplianceItem::new(
            "azure-yaml-present",
            CheckKind::AzureYaml,
            format!("Found deployment manifest: {path}"),
        )
        .with_details(json!({ "filePath": path })),
    );
    if !rules.must_define_services {
        return findings;
    }

    match source.read_to_string(path) {
        Ok(content) if SERVICES_KEY.is_match(&content) => findings.pass(ComplianceItem::new(
            "azure-yaml-services-defined",
            CheckKind::AzureYaml,
            format!("{path} defines services"),
        )),
        Ok(_) => findings.issue(Issue::error(
            "azure-yaml-missing-services",
            CheckKind::AzureYaml,
            format!("No \"services:\" defined in {path}"),
        )),
        Err(err) => {
            log::warn!("could not read {path}: {err}");
            findings.issue(
                Issue::warning(
                    "azure-yaml-unreadable",
                    CheckKind::AzureYaml,
                    format!("Could not read {path}; services were not checked"),
                )
                .with_error(err.to_string()),
            );
        }
    }

    findings
}
