//! Repository file inventories and content sources.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{ComplianceError, Result};

/// Supplies file content on demand.
///
/// Failures are never fatal to an evaluation; the engine turns them into
/// warning issues scoped to the file.
#[cfg_attr(test, mockall::automock)]
pub trait ContentSource {
    /// Read a repository file into a string.
    fn read_to_string(&self, path: &str) -> Result<String>;
}

impl<S: ContentSource + ?Sized> ContentSource for &S {
    fn read_to_string(&self, path: &str) -> Result<String> {
        (**self).read_to_string(path)
    }
}

/// A file in a repository snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FileEntry {
    /// Repository-relative path with `/` separators.
    pub path: String,
    /// File content, when the caller already has it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl FileEntry {
    /// Create an entry without content.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: None,
        }
    }

    /// Create an entry with inline content.
    pub fn with_content(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: Some(content.into()),
        }
    }
}

/// An ordered, read-only list of repository files.
///
/// Lower-cased copies of every path are kept alongside the originals so
/// evaluators can match case-insensitively without touching caller data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileInventory {
    entries: Vec<FileEntry>,
    lowered: Vec<String>,
}

impl FileInventory {
    /// Build an inventory from file entries, keeping their order.
    pub fn new(entries: Vec<FileEntry>) -> Self {
        let lowered = entries.iter().map(|entry| entry.path.to_lowercase()).collect();
        Self { entries, lowered }
    }

    /// Build a content-less inventory from paths.
    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self::new(paths.into_iter().map(FileEntry::new).collect())
    }

    /// Number of files.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the inventory is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(original, lower-cased)` path pairs in input order.
    pub fn paths(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .zip(&self.lowered)
            .map(|(entry, lowered)| (entry.path.as_str(), lowered.as_str()))
    }

    /// Find the original path equal to `name`, ignoring case.
    pub fn find_exact(&self, name: &str) -> Option<&str> {
        let needle = name.to_lowercase();
        self.paths()
            .find(|(_, lowered)| *lowered == needle)
            .map(|(path, _)| path)
    }

    /// Whether a path equal to `name` exists, ignoring case.
    pub fn contains(&self, name: &str) -> bool {
        self.find_exact(name).is_some()
    }
}

impl ContentSource for FileInventory {
    fn read_to_string(&self, path: &str) -> Result<String> {
        self.entries
            .iter()
            .find(|entry| entry.path == path)
            .and_then(|entry| entry.content.clone())
            .ok_or_else(|| ComplianceError::ContentUnavailable(path.to_string()))
    }
}

/// A repository checkout on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalRepository {
    root: PathBuf,
}

impl LocalRepository {
    /// Open a checkout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// List every file below the root as a content-less inventory.
    ///
    /// Paths are relative, `/`-separated and sorted. The `.git` directory is
    /// skipped; other dot-directories such as `.github` are kept.
    pub fn list_files(&self) -> Result<FileInventory> {
        let mut files = Vec::new();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            for entry in std::fs::read_dir(&dir)? {
                let entry = entry?;
                let path = entry.path();
                let file_type = entry.file_type()?;
                if file_type.is_dir() {
                    if !is_git_dir(&path) {
                        pending.push(path);
                    }
                } else if file_type.is_file() {
                    if let Some(relative) = self.relative_path(&path) {
                        files.push(relative);
                    }
                }
            }
        }

        files.sort();
        Ok(FileInventory::from_paths(files))
    }

    fn relative_path(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<String> = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(parts.join("/"))
    }
}

impl ContentSource for LocalRepository {
    fn read_to_string(&self, path: &str) -> Result<String> {
        Ok(std::fs::read_to_string(self.root.join(path))?)
    }
}

fn is_git_dir(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name == ".git")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::{ContentSource, FileEntry, FileInventory, LocalRepository};
    use crate::error::ComplianceError;
    use std::path::PathBuf;

    #[test]
    fn find_exact_ignores_case() {
        let inventory = FileInventory::from_paths(["ReadMe.MD", "src/main.rs"]);
        assert_eq!(inventory.find_exact("README.md"), Some("ReadMe.MD"));
        assert!(inventory.contains("readme.md"));
        assert!(!inventory.contains("main.rs"));
    }

    #[test]
    fn inventory_reads_inline_content() {
        let inventory = FileInventory::new(vec![
            FileEntry::with_content("azure.yaml", "name: demo"),
            FileEntry::new("LICENSE"),
        ]);

        assert_eq!(
            inventory.read_to_string("azure.yaml").expect("content"),
            "name: demo"
        );
        match inventory.read_to_string("LICENSE") {
            Err(ComplianceError::ContentUnavailable(path)) => assert_eq!(path, "LICENSE"),
            other => panic!("expected ContentUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn local_repository_lists_and_reads_files() {
        let root = std::env::temp_dir().join(unique_dir_name());
        std::fs::create_dir_all(root.join(".github/workflows")).expect("create workflows dir");
        std::fs::create_dir_all(root.join(".git")).expect("create git dir");
        std::fs::write(root.join("README.md"), "# Demo").expect("write readme");
        std::fs::write(root.join(".github/workflows/azure-dev.yml"), "on: push")
            .expect("write workflow");
        std::fs::write(root.join(".git/HEAD"), "ref: refs/heads/main").expect("write head");

        let repo = LocalRepository::new(&root);
        let inventory = repo.list_files().expect("list files");
        let paths: Vec<&str> = inventory.paths().map(|(path, _)| path).collect();
        assert_eq!(paths, vec![".github/workflows/azure-dev.yml", "README.md"]);

        let contents = repo.read_to_string("README.md").expect("read file");
        assert_eq!(contents, "# Demo");

        std::fs::remove_dir_all(&root).expect("cleanup temp dir");
    }

    fn unique_dir_name() -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("system time")
            .as_nanos();
        PathBuf::from(format!("template_doctor_inventory_test_{nanos}"))
    }
}
