//! Vault (file and folder) access plus the metadata cache.
//!
//! [`MemoryVault`] keeps notes in memory and can be populated from a directory
//! of markdown files. Frontmatter is parsed once at insertion time so that
//! [`Vault::get_file_cache`] stays a cheap lookup on the suggestion path.

use crate::error::{HostError, HostResult};
use gray_matter::engine::YAML;
use gray_matter::Matter;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// A file inside the vault, addressed by its vault-relative path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VaultFile {
    pub path: String,
    pub basename: String,
    pub extension: String,
}

impl VaultFile {
    pub fn from_path(path: impl Into<String>) -> Self {
        let path = normalize_path(&path.into());
        let name = path.rsplit('/').next().unwrap_or_default().to_string();
        let (basename, extension) = match name.rfind('.') {
            Some(idx) if idx > 0 => (name[..idx].to_string(), name[idx + 1..].to_string()),
            _ => (name.clone(), String::new()),
        };
        Self {
            path,
            basename,
            extension,
        }
    }

    pub fn is_markdown(&self) -> bool {
        self.extension.eq_ignore_ascii_case("md")
    }

    /// Vault-relative path of the containing folder ("" for the root)
    pub fn parent(&self) -> &str {
        match self.path.rfind('/') {
            Some(idx) => &self.path[..idx],
            None => "",
        }
    }
}

/// Direct child of a folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultEntry {
    File(VaultFile),
    Folder(String),
}

/// Snapshot of a folder's direct children, files first in path order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultFolder {
    pub path: String,
    pub children: Vec<VaultEntry>,
}

impl VaultFolder {
    pub fn files(&self) -> impl Iterator<Item = &VaultFile> {
        self.children.iter().filter_map(|entry| match entry {
            VaultEntry::File(file) => Some(file),
            VaultEntry::Folder(_) => None,
        })
    }

    pub fn subfolders(&self) -> impl Iterator<Item = &str> {
        self.children.iter().filter_map(|entry| match entry {
            VaultEntry::Folder(path) => Some(path.as_str()),
            VaultEntry::File(_) => None,
        })
    }
}

/// Cached metadata for a file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileCache {
    pub frontmatter: Option<Map<String, Value>>,
}

impl FileCache {
    /// Frontmatter values for `key` as strings; scalars become one-element lists
    pub fn frontmatter_strings(&self, key: &str) -> Vec<String> {
        let Some(value) = self.frontmatter.as_ref().and_then(|fm| fm.get(key)) else {
            return Vec::new();
        };
        match value {
            Value::String(s) => vec![s.clone()],
            Value::Array(items) => items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Synchronous vault surface owned by the host
pub trait Vault: Send + Sync {
    fn get_folder_by_path(&self, path: &str) -> Option<VaultFolder>;

    fn get_file_by_path(&self, path: &str) -> Option<VaultFile>;

    fn get_file_cache(&self, file: &VaultFile) -> Option<FileCache>;

    /// All markdown files, in path order
    fn markdown_files(&self) -> Vec<VaultFile>;
}

#[derive(Debug, Clone)]
struct StoredNote {
    file: VaultFile,
    content: String,
    cache: FileCache,
}

/// In-memory vault
#[derive(Debug, Default)]
pub struct MemoryVault {
    notes: RwLock<BTreeMap<String, StoredNote>>,
    folders: RwLock<BTreeMap<String, ()>>,
    active_file: RwLock<Option<String>>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every markdown note under `root`
    pub fn from_dir(root: &Path) -> HostResult<Self> {
        if !root.is_dir() {
            return Err(HostError::FolderNotFound(root.display().to_string()));
        }

        let vault = Self::new();
        for entry in WalkDir::new(root).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable vault entry");
                    continue;
                }
            };
            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };
            let relative = relative.to_string_lossy().replace('\\', "/");
            if relative.is_empty() || relative.split('/').any(|part| part.starts_with('.')) {
                continue;
            }

            if entry.file_type().is_dir() {
                vault.create_folder(&relative);
            } else if relative.to_lowercase().ends_with(".md") {
                let content = std::fs::read_to_string(entry.path())?;
                vault.upsert(&relative, &content);
            }
        }

        debug!(root = %root.display(), notes = vault.notes.read().len(), "Loaded vault from disk");
        Ok(vault)
    }

    pub fn create_folder(&self, path: &str) {
        let path = normalize_path(path);
        let mut folders = self.folders.write();
        let mut current = String::new();
        for part in path.split('/').filter(|p| !p.is_empty()) {
            if !current.is_empty() {
                current.push('/');
            }
            current.push_str(part);
            folders.insert(current.clone(), ());
        }
    }

    /// Insert or replace a note, parsing its frontmatter
    pub fn upsert(&self, path: &str, content: &str) -> VaultFile {
        let file = VaultFile::from_path(path);
        let parent = file.parent().to_string();
        if !parent.is_empty() {
            self.create_folder(&parent);
        }

        let note = StoredNote {
            file: file.clone(),
            content: content.to_string(),
            cache: parse_frontmatter(content),
        };
        self.notes.write().insert(file.path.clone(), note);
        file
    }

    /// Create a note, failing if one already exists at `path`
    pub fn create(&self, path: &str, content: &str) -> HostResult<VaultFile> {
        let normalized = normalize_path(path);
        if self.notes.read().contains_key(&normalized) {
            return Err(HostError::FileExists(normalized));
        }
        Ok(self.upsert(&normalized, content))
    }

    pub fn read(&self, path: &str) -> HostResult<String> {
        let path = normalize_path(path);
        self.notes
            .read()
            .get(&path)
            .map(|note| note.content.clone())
            .ok_or(HostError::FileNotFound(path))
    }

    pub fn append(&self, path: &str, text: &str) -> HostResult<()> {
        let mut content = self.read(path)?;
        content.push_str(text);
        self.upsert(path, &content);
        Ok(())
    }

    pub fn set_active_file(&self, path: Option<&str>) {
        *self.active_file.write() = path.map(normalize_path);
    }

    pub fn active_file(&self) -> Option<VaultFile> {
        let active = self.active_file.read().clone()?;
        self.get_file_by_path(&active)
    }
}

impl Vault for MemoryVault {
    fn get_folder_by_path(&self, path: &str) -> Option<VaultFolder> {
        let path = normalize_path(path);
        if !path.is_empty() && !self.folders.read().contains_key(&path) {
            return None;
        }

        let mut children: Vec<VaultEntry> = self
            .notes
            .read()
            .values()
            .filter(|note| note.file.parent() == path)
            .map(|note| VaultEntry::File(note.file.clone()))
            .collect();

        children.extend(
            self.folders
                .read()
                .keys()
                .filter(|folder| parent_of(folder) == path)
                .map(|folder| VaultEntry::Folder(folder.clone())),
        );

        Some(VaultFolder { path, children })
    }

    fn get_file_by_path(&self, path: &str) -> Option<VaultFile> {
        self.notes
            .read()
            .get(&normalize_path(path))
            .map(|note| note.file.clone())
    }

    fn get_file_cache(&self, file: &VaultFile) -> Option<FileCache> {
        self.notes
            .read()
            .get(&file.path)
            .map(|note| note.cache.clone())
    }

    fn markdown_files(&self) -> Vec<VaultFile> {
        self.notes
            .read()
            .values()
            .filter(|note| note.file.is_markdown())
            .map(|note| note.file.clone())
            .collect()
    }
}

/// Strip leading/trailing slashes and a leading "./"
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_start_matches("./");
    trimmed.trim_matches('/').to_string()
}

fn parent_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

fn parse_frontmatter(content: &str) -> FileCache {
    let matter = Matter::<YAML>::new();
    let parsed = matter.parse(content);
    let frontmatter = parsed
        .data
        .and_then(|pod| pod.deserialize::<Value>().ok())
        .and_then(|value| match value {
            Value::Object(map) => Some(map),
            _ => None,
        });
    FileCache { frontmatter }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vault_file_from_path() {
        let file = VaultFile::from_path("/People/Ada Lovelace.md");
        assert_eq!(file.path, "People/Ada Lovelace.md");
        assert_eq!(file.basename, "Ada Lovelace");
        assert_eq!(file.extension, "md");
        assert_eq!(file.parent(), "People");
        assert!(file.is_markdown());
    }

    #[test]
    fn test_folder_listing() {
        let vault = MemoryVault::new();
        vault.upsert("People/Ada.md", "");
        vault.upsert("People/Team/Grace.md", "");
        vault.upsert("Inbox.md", "");

        let folder = vault.get_folder_by_path("People").unwrap();
        let files: Vec<_> = folder.files().map(|f| f.basename.clone()).collect();
        assert_eq!(files, vec!["Ada"]);
        assert_eq!(folder.subfolders().collect::<Vec<_>>(), vec!["People/Team"]);

        let root = vault.get_folder_by_path("/").unwrap();
        assert_eq!(root.files().count(), 1);
        assert!(vault.get_folder_by_path("Missing").is_none());
    }

    #[test]
    fn test_frontmatter_cache() {
        let vault = MemoryVault::new();
        let file = vault.upsert(
            "People/Ada.md",
            "---\naliases:\n  - Countess\n  - Ada L\nfileClass: person\n---\nBody",
        );
        let cache = vault.get_file_cache(&file).unwrap();
        assert_eq!(cache.frontmatter_strings("aliases"), vec!["Countess", "Ada L"]);
        assert_eq!(cache.frontmatter_strings("fileClass"), vec!["person"]);
        assert!(cache.frontmatter_strings("missing").is_empty());
    }

    #[test]
    fn test_create_rejects_duplicates() {
        let vault = MemoryVault::new();
        assert!(vault.create("a.md", "x").is_ok());
        assert!(matches!(vault.create("a.md", "y"), Err(HostError::FileExists(_))));
    }

    #[test]
    fn test_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("People")).unwrap();
        std::fs::create_dir_all(dir.path().join(".obsidian")).unwrap();
        std::fs::write(dir.path().join("People/Ada.md"), "---\ntags: [person]\n---\n").unwrap();
        std::fs::write(dir.path().join(".obsidian/app.md"), "").unwrap();
        std::fs::write(dir.path().join("image.png"), "").unwrap();

        let vault = MemoryVault::from_dir(dir.path()).unwrap();
        let files = vault.markdown_files();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "People/Ada.md");
    }
}
