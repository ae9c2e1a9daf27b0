#![deny(missing_docs)]
//! Template Doctor core library.
//!
//! Evaluates a repository snapshot (a flat file inventory, optionally with
//! content) against a compliance rule set and produces a scored report with
//! per-category breakdowns. Every evaluation is a pure function of its
//! inputs; repository access and report storage belong to the caller.

pub mod analyzer;
pub mod bicep;
pub mod categorize;
pub mod checks;
pub mod domain;
pub mod error;
pub mod inventory;
pub mod manifest;
pub mod markdown;
pub mod readme;
pub mod render;
pub mod rules;
pub mod score;

pub use analyzer::{ComplianceAnalyzer, analyze_inventory};
pub use categorize::{categorize, report_category};
pub use domain::{
    CategoryReport, CategoryReports, CheckKind, Compliance, ComplianceItem, ComplianceReport,
    Findings, Issue, ReadmeHeading, ReportCategory, Severity,
};
pub use error::{ComplianceError, Result};
pub use inventory::{ContentSource, FileEntry, FileInventory, LocalRepository};
pub use markdown::parse_headings;
pub use render::{render_json, render_markdown};
pub use rules::{Pattern, RuleSet, RuleSetConfig};
pub use score::{aggregate, percentage};
