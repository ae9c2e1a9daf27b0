//! README structure evaluator.

use serde_json::json;

use crate::checks::slug;
use crate::domain::{CheckKind, ComplianceItem, Findings, Issue, ReadmeHeading};
use crate::inventory::{ContentSource, FileInventory};
use crate::markdown::{find_heading, parse_headings};
use crate::rules::ReadmeRequirements;

const README: &str = "readme.md";
const SECTION_LEVEL: u8 = 2;

/// Check README headings and the architecture diagram.
///
/// Runs only when a root `README.md` exists. A README that cannot be read
/// yields a single warning and no heading findings.
pub fn check_readme<S: ContentSource>(
    requirements: &ReadmeRequirements,
    inventory: &FileInventory,
    source: &S,
) -> Findings {
    let Some(path) = inventory.find_exact(README) else {
        return Findings::new();
    };
    match source.read_to_string(path) {
        Ok(content) => check_headings(requirements, &parse_headings(&content)),
        Err(err) => {
            log::warn!("could not read {path}: {err}");
            let mut findings = Findings::new();
            findings.issue(
                Issue::warning(
                    "readme-unreadable",
                    CheckKind::Readme,
                    format!("Could not read {path}; README structure was not checked"),
                )
                .with_error(err.to_string()),
            );
            findings
        }
    }
}

/// Check parsed headings against the README requirements.
pub fn check_headings(requirements: &ReadmeRequirements, headings: &[ReadmeHeading]) -> Findings {
    let mut findings = Findings::new();

    for required in &requirements.required_headings {
        let id = slug(required);
        if find_heading(headings, SECTION_LEVEL, required).is_some() {
            findings.pass(
                ComplianceItem::new(
                    format!("readme-heading-{id}"),
                    CheckKind::ReadmeHeading,
                    format!("README has required heading: {required}"),
                )
                .with_details(json!({ "heading": required })),
            );
        } else {
            findings.issue(Issue::error(
                format!("readme-missing-heading-{id}"),
                CheckKind::ReadmeHeading,
                format!("README is missing required h2 heading: {required}"),
            ));
        }
    }

    let diagram = &requirements.architecture_diagram;
    if diagram.heading.trim().is_empty() {
        return findings;
    }
    let Some(heading) = find_heading(headings, SECTION_LEVEL, &diagram.heading) else {
        findings.issue(Issue::error(
            "readme-missing-architecture-diagram",
            CheckKind::ArchitectureDiagram,
            format!("README is missing required h2 heading: {}", diagram.heading),
        ));
        return findings;
    };
    findings.pass(
        ComplianceItem::new(
            "readme-architecture-diagram-heading",
            CheckKind::ArchitectureDiagram,
            format!("README has architecture diagram heading: {}", diagram.heading),
        )
        .with_details(json!({ "heading": diagram.heading })),
    );
    if diagram.requires_image {
        if heading.has_image {
            findings.pass(ComplianceItem::new(
                "readme-architecture-diagram-image",
                CheckKind::ArchitectureDiagram,
                "Architecture diagram image found",
            ));
        } else {
            findings.issue(Issue::error(
                "readme-missing-architecture-diagram-image",
                CheckKind::ArchitectureDiagram,
                format!(
                    "Section '{}' must include an image within the first lines",
                    diagram.heading
                ),
            ));
        }
    }

    findings
}
