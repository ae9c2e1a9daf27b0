//! Markdown structure parsing for README checks.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::ReadmeHeading;

/// Number of lines after a heading searched for an image reference.
pub const IMAGE_LOOKAHEAD_LINES: usize = 5;

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+)$").expect("valid heading regex"));
static IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*!\[.*?\]\(.*?\)").expect("valid image regex"));

/// Extract ATX headings in document order.
///
/// A heading has an image when one of the next [`IMAGE_LOOKAHEAD_LINES`]
/// lines starts with a markdown image reference.
pub fn parse_headings(markdown: &str) -> Vec<ReadmeHeading> {
    let lines: Vec<&str> = markdown.lines().collect();
    let mut headings = Vec::new();

    for (index, line) in lines.iter().enumerate() {
        let Some(captures) = HEADING.captures(line.trim_end()) else {
            continue;
        };
        let text = captures[2].trim();
        if text.is_empty() {
            continue;
        }
        let window_end = (index + 1 + IMAGE_LOOKAHEAD_LINES).min(lines.len());
        let has_image = lines[index + 1..window_end]
            .iter()
            .any(|candidate| IMAGE.is_match(candidate));
        headings.push(ReadmeHeading {
            level: captures[1].len() as u8,
            text: text.to_string(),
            has_image,
        });
    }

    headings
}

/// Find a heading at `level` whose text equals `text`, ignoring case.
pub fn find_heading<'a>(
    headings: &'a [ReadmeHeading],
    level: u8,
    text: &str,
) -> Option<&'a ReadmeHeading> {
    let needle = text.trim().to_lowercase();
    headings
        .iter()
        .find(|heading| heading.level == level && heading.text.to_lowercase() == needle)
}
