//! Inventory-only evaluators: files, workflows, documentation and folders.
//!
//! None of these read file content. Each walks its rule list in order and
//! emits exactly one finding per rule; an empty rule list emits nothing.

use serde_json::json;

use crate::domain::{CheckKind, ComplianceItem, Findings, Issue};
use crate::inventory::FileInventory;
use crate::rules::{DocRequirement, WorkflowRequirement};

const REGEX_META: &[char] = &[
    '^', '$', '\\', '?', '*', '+', '(', ')', '[', ']', '{', '}', '|',
];

/// Check that every required file exists at its exact path, ignoring case.
pub fn check_required_files(required: &[String], inventory: &FileInventory) -> Findings {
    check_exact_files(required, inventory, CheckKind::RequiredFile, "", "file")
}

/// Check that every agent guidance file exists at its exact path.
pub fn check_agents_files(required: &[String], inventory: &FileInventory) -> Findings {
    check_exact_files(required, inventory, CheckKind::AgentsFile, "agents-", "agents")
}

fn check_exact_files(
    required: &[String],
    inventory: &FileInventory,
    kind: CheckKind,
    missing_prefix: &str,
    found_prefix: &str,
) -> Findings {
    let mut findings = Findings::new();
    for file in required {
        let id = slug(file);
        match inventory.find_exact(file) {
            Some(path) => findings.pass(
                ComplianceItem::new(
                    format!("{found_prefix}-{id}"),
                    kind,
                    format!("Required file found: {file}"),
                )
                .with_details(json!({ "fileName": file, "path": path })),
            ),
            None => findings.issue(Issue::error(
                format!("missing-{missing_prefix}{id}"),
                kind,
                format!("Missing required file: {file}"),
            )),
        }
    }
    findings
}

/// Check that each workflow requirement matches at least one path.
///
/// The first matching path in inventory order is recorded.
pub fn check_workflow_files(
    required: &[WorkflowRequirement],
    inventory: &FileInventory,
) -> Findings {
    let mut findings = Findings::new();
    for requirement in required {
        let id = requirement
            .id
            .as_deref()
            .map(slug)
            .unwrap_or_else(|| pattern_slug(requirement.pattern.as_str()));
        let matched = inventory
            .paths()
            .find(|(_, lowered)| requirement.pattern.is_match(lowered));
        match matched {
            Some((path, _)) => findings.pass(
                ComplianceItem::new(
                    format!("workflow-{id}"),
                    CheckKind::WorkflowFile,
                    format!("Found required workflow file: {path}"),
                )
                .with_details(json!({
                    "filePath": path,
                    "pattern": requirement.pattern.as_str(),
                })),
            ),
            None => findings.issue(Issue::error(
                format!("missing-workflow-{id}"),
                CheckKind::WorkflowFile,
                requirement.message.clone(),
            )),
        }
    }
    findings
}

/// Check documentation files that may live in several locations.
pub fn check_doc_files(required: &[DocRequirement], inventory: &FileInventory) -> Findings {
    check_pattern_groups(required, inventory, CheckKind::DocFile, "doc")
}

/// Check test assets, matched like documentation files.
pub fn check_test_files(required: &[DocRequirement], inventory: &FileInventory) -> Findings {
    check_pattern_groups(required, inventory, CheckKind::TestFile, "test")
}

fn check_pattern_groups(
    required: &[DocRequirement],
    inventory: &FileInventory,
    kind: CheckKind,
    prefix: &str,
) -> Findings {
    let mut findings = Findings::new();
    for requirement in required {
        let id = requirement.id.as_deref().map(slug).unwrap_or_else(|| {
            requirement
                .patterns
                .first()
                .map(|pattern| pattern_slug(pattern.as_str()))
                .unwrap_or_default()
        });
        let matches: Vec<&str> = inventory
            .paths()
            .filter(|(_, lowered)| {
                requirement
                    .patterns
                    .iter()
                    .any(|pattern| pattern.is_match(lowered))
            })
            .map(|(path, _)| path)
            .collect();
        match matches.first() {
            Some(first) => findings.pass(
                ComplianceItem::new(
                    format!("{prefix}-{id}"),
                    kind,
                    format!("Found {first}"),
                )
                .with_details(json!({ "filePath": first, "allMatches": matches })),
            ),
            None => findings.issue(Issue::error(
                format!("missing-{prefix}-{id}"),
                kind,
                requirement.message.clone(),
            )),
        }
    }
    findings
}

/// Check that every required folder contains at least one file.
pub fn check_required_folders(required: &[String], inventory: &FileInventory) -> Findings {
    let mut findings = Findings::new();
    for folder in required {
        let prefix = format!("{}/", folder.to_lowercase());
        let file_count = inventory
            .paths()
            .filter(|(_, lowered)| lowered.starts_with(&prefix))
            .count();
        let id = slug(folder);
        if file_count == 0 {
            findings.issue(Issue::error(
                format!("missing-folder-{id}"),
                CheckKind::Folder,
                format!("Missing required folder: {folder}/"),
            ));
        } else {
            findings.pass(
                ComplianceItem::new(
                    format!("folder-{id}"),
                    CheckKind::Folder,
                    format!("Required folder found: {folder}/"),
                )
                .with_details(json!({ "folderPath": folder, "fileCount": file_count })),
            );
        }
    }
    findings
}

/// Turn a file name, path or pattern source into an id fragment.
///
/// Letters are lower-cased, `.` is kept, every other run of
/// non-alphanumeric characters collapses to a single `-`.
pub fn slug(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;
    for ch in value.chars() {
        if ch.is_ascii_alphanumeric() || ch == '.' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug.trim_matches('.').to_string()
}

fn pattern_slug(source: &str) -> String {
    let literal: String = source
        .chars()
        .filter(|ch| !REGEX_META.contains(ch))
        .collect();
    slug(&literal)
}
