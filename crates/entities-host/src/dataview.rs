use crate::bridges::DataviewApi;
use crate::error::{HostError, HostResult};
use crate::vault::{normalize_path, Vault, VaultFile};
use std::sync::Arc;

/// Page-source queries evaluated against a [`Vault`]
///
/// Supported sources: `#tag` (frontmatter `tags`), `"folder"` (path prefix)
/// and the empty source (every markdown page).
pub struct VaultDataview {
    vault: Arc<dyn Vault>,
}

impl VaultDataview {
    pub fn new(vault: Arc<dyn Vault>) -> Self {
        Self { vault }
    }

    fn has_tag(&self, file: &VaultFile, tag: &str) -> bool {
        self.vault
            .get_file_cache(file)
            .map(|cache| {
                cache
                    .frontmatter_strings("tags")
                    .iter()
                    .any(|t| t.trim_start_matches('#').eq_ignore_ascii_case(tag))
            })
            .unwrap_or(false)
    }
}

impl DataviewApi for VaultDataview {
    fn pages(&self, source: &str) -> HostResult<Vec<VaultFile>> {
        let source = source.trim();
        let files = self.vault.markdown_files();

        if source.is_empty() {
            return Ok(files);
        }

        if let Some(tag) = source.strip_prefix('#') {
            return Ok(files.into_iter().filter(|f| self.has_tag(f, tag)).collect());
        }

        if source.len() >= 2 && source.starts_with('"') && source.ends_with('"') {
            let folder = normalize_path(&source[1..source.len() - 1]);
            let prefix = format!("{}/", folder);
            return Ok(files
                .into_iter()
                .filter(|f| folder.is_empty() || f.path.starts_with(&prefix))
                .collect());
        }

        Err(HostError::QueryError(format!("Unsupported page source: {}", source)))
    }
}
