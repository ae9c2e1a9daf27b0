//! Infrastructure-as-code evaluator.
//!
//! Every IaC file under `infra/` is read once, in inventory order, and then
//! checked for required resources, deprecated AI models and (optionally) its
//! identity and access posture. Findings are emitted per file, so the order
//! of the report follows the order of the inventory.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use serde_json::json;

use crate::checks::slug;
use crate::domain::{CheckKind, ComplianceItem, Findings, Issue};
use crate::error::Result;
use crate::inventory::{ContentSource, FileInventory};
use crate::rules::{BicepChecks, OpenAiRules};

/// Directory that holds IaC files.
pub const INFRA_DIR: &str = "infra/";
/// File extensions recognised as IaC files.
pub const IAC_EXTENSIONS: &[&str] = &[".bicep"];

const INSECURE_AUTH_TOKENS: &[&str] = &[
    "connectionString",
    "accountKey",
    "listKeys(",
    "sasToken",
    "adminPassword",
    "primaryKey",
];

static RESOURCE_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*resource\s+\w+").expect("valid resource declaration regex")
});
static IDENTITY_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^\s*identity\s*:|Microsoft\.ManagedIdentity/").expect("valid identity regex")
});
static ANONYMOUS_ACCESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)allowBlobPublicAccess\s*:\s*true|publicNetworkAccess\s*:\s*'Enabled'")
        .expect("valid anonymous access regex")
});

/// List IaC files under `infra/` in inventory order.
pub fn find_iac_files(inventory: &FileInventory) -> Vec<&str> {
    inventory
        .paths()
        .filter(|(_, lowered)| {
            lowered.starts_with(INFRA_DIR)
                && IAC_EXTENSIONS.iter().any(|ext| lowered.ends_with(ext))
        })
        .map(|(path, _)| path)
        .collect()
}

/// Check IaC files for required resources, deprecated models and security posture.
///
/// Fails only when a deprecated model name cannot be compiled into a matcher.
pub fn check_bicep<S: ContentSource>(
    checks: &BicepChecks,
    openai: &OpenAiRules,
    inventory: &FileInventory,
    source: &S,
) -> Result<Findings> {
    let matchers = deprecated_model_matchers(&openai.deprecated_models)?;
    let mut findings = Findings::new();

    let files = find_iac_files(inventory);
    if files.is_empty() {
        findings.issue(Issue::error(
            "bicep-files-missing",
            CheckKind::BicepFiles,
            format!("No Bicep files found in {INFRA_DIR}"),
        ));
        return Ok(findings);
    }

    for path in files {
        let content = match source.read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                log::warn!("could not read {path}: {err}");
                findings.issue(
                    Issue::warning(
                        format!("bicep-unreadable-{}", slug(path)),
                        CheckKind::BicepFiles,
                        format!("Could not read {path}; its checks were skipped"),
                    )
                    .with_error(err.to_string()),
                );
                continue;
            }
        };
        findings.extend(check_required_resources(
            &checks.required_resources,
            path,
            &content,
        ));
        findings.extend(check_deprecated_models(&matchers, path, &content));
        if checks.security_best_practices {
            findings.extend(check_security(path, &content));
        }
    }

    Ok(findings)
}

/// Check one file for every required resource token.
pub fn check_required_resources(required: &[String], path: &str, content: &str) -> Findings {
    let mut findings = Findings::new();
    let file_id = slug(path);
    for resource in required {
        let resource_id = slug(resource);
        if content.contains(resource.as_str()) {
            findings.pass(
                ComplianceItem::new(
                    format!("bicep-resource-{resource_id}-{file_id}"),
                    CheckKind::BicepResource,
                    format!("Found resource {resource} in {path}"),
                )
                .with_details(json!({ "file": path, "resource": resource })),
            );
        } else {
            findings.issue(Issue::error(
                format!("bicep-missing-{resource_id}-{file_id}"),
                CheckKind::BicepResource,
                format!("Missing resource \"{resource}\" in {path}"),
            ));
        }
    }
    findings
}

/// A compiled matcher for one deprecated model name.
#[derive(Debug, Clone)]
pub struct ModelMatcher {
    model: String,
    regex: Regex,
}

impl ModelMatcher {
    /// Compile a matcher tolerant of surrounding quotes and letter case.
    ///
    /// Suffixed variants count as references, so `gpt-35-turbo` also flags
    /// `gpt-35-turbo-16k`.
    pub fn new(model: &str) -> Result<Self> {
        let pattern = format!(r#"['"]?{}['"]?"#, regex::escape(model));
        let regex = RegexBuilder::new(&pattern).case_insensitive(true).build()?;
        Ok(Self {
            model: model.to_string(),
            regex,
        })
    }

    /// The model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Whether the model is referenced in `content`.
    pub fn is_match(&self, content: &str) -> bool {
        self.regex.is_match(content)
    }
}

/// Compile matchers for a denylist, keeping its order.
pub fn deprecated_model_matchers(models: &[String]) -> Result<Vec<ModelMatcher>> {
    models.iter().map(|model| ModelMatcher::new(model)).collect()
}

/// Check one file against the deprecated model denylist.
///
/// Each referenced model yields an issue whose `error` names the file; the
/// id carries only the model, so two files referencing it share an id. A
/// file without any reference yields exactly one compliance item; an empty
/// denylist yields nothing.
pub fn check_deprecated_models(matchers: &[ModelMatcher], path: &str, content: &str) -> Findings {
    let mut findings = Findings::new();
    if matchers.is_empty() {
        return findings;
    }
    for matcher in matchers {
        if matcher.is_match(content) {
            findings.issue(
                Issue::error(
                    format!("bicep-deprecated-model-{}", slug(matcher.model())),
                    CheckKind::DeprecatedModel,
                    format!(
                        "Deprecated model \"{}\" referenced in {path}",
                        matcher.model()
                    ),
                )
                .with_error(path),
            );
        }
    }
    if findings.issues.is_empty() {
        findings.pass(
            ComplianceItem::new(
                format!("bicep-no-deprecated-models-{}", slug(path)),
                CheckKind::DeprecatedModel,
                format!("No deprecated models referenced in {path}"),
            )
            .with_details(json!({ "file": path, "modelsChecked": matchers.len() })),
        );
    }
    findings
}

/// Scan one file for identity and access weaknesses.
pub fn check_security(path: &str, content: &str) -> Findings {
    let mut findings = Findings::new();
    let file_id = slug(path);

    if IDENTITY_BLOCK.is_match(content) {
        findings.pass(ComplianceItem::new(
            format!("bicep-managed-identity-{file_id}"),
            CheckKind::BicepSecurity,
            format!("Managed identity configured in {path}"),
        ));
    } else if RESOURCE_DECLARATION.is_match(content) {
        findings.issue(Issue::warning(
            format!("bicep-missing-managed-identity-{file_id}"),
            CheckKind::BicepSecurity,
            format!("Resources in {path} do not use a managed identity"),
        ));
    }

    let lowered = content.to_lowercase();
    let insecure: Vec<&str> = INSECURE_AUTH_TOKENS
        .iter()
        .copied()
        .filter(|token| lowered.contains(&token.to_lowercase()))
        .collect();
    if !insecure.is_empty() {
        findings.issue(Issue::warning(
            format!("bicep-insecure-auth-{file_id}"),
            CheckKind::BicepSecurity,
            format!(
                "{path} uses key or password based authentication: {}",
                insecure.join(", ")
            ),
        ));
    }

    if ANONYMOUS_ACCESS.is_match(content) {
        findings.issue(Issue::warning(
            format!("bicep-anonymous-access-{file_id}"),
            CheckKind::BicepSecurity,
            format!("{path} enables anonymous or public network access"),
        ));
    }

    findings
}
