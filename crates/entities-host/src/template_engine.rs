use crate::bridges::TemplateBridge;
use crate::error::{HostError, HostResult};
use crate::vault::{normalize_path, MemoryVault, Vault, VaultFile};
use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{([a-zA-Z_][a-zA-Z0-9_]*(?::[^}]*)?)\}\}").expect("placeholder pattern is valid")
});

/// Template-expansion bridge backed by a [`MemoryVault`]
///
/// Supports `{{variable}}` and `{{variable:default}}` placeholders. Known
/// variables are `title`, `date`, `time` and `folder`.
pub struct VaultTemplateEngine {
    vault: Arc<MemoryVault>,
    now: fn() -> NaiveDateTime,
}

impl VaultTemplateEngine {
    pub fn new(vault: Arc<MemoryVault>) -> Self {
        Self {
            vault,
            now: || Local::now().naive_local(),
        }
    }

    /// Use a fixed clock for `{{date}}` and `{{time}}`
    pub fn with_clock(mut self, now: fn() -> NaiveDateTime) -> Self {
        self.now = now;
        self
    }

    /// Substitute placeholders in `template`
    pub fn expand(template: &str, variables: &HashMap<String, String>) -> HostResult<String> {
        let mut result = template.to_string();

        for cap in PLACEHOLDER.captures_iter(template) {
            let (Some(full_match), Some(var_spec)) = (cap.get(0), cap.get(1)) else {
                continue;
            };

            let (var_name, default_value) = match var_spec.as_str().split_once(':') {
                Some((name, default)) => (name, Some(default)),
                None => (var_spec.as_str(), None),
            };

            let value = variables
                .get(var_name)
                .map(|s| s.as_str())
                .or(default_value)
                .ok_or_else(|| HostError::TemplateError(format!("Missing variable: {}", var_name)))?;

            result = result.replace(full_match.as_str(), value);
        }

        Ok(result)
    }

    fn variables(&self, title: &str, folder: &str) -> HashMap<String, String> {
        let now = (self.now)();
        HashMap::from([
            ("title".to_string(), title.to_string()),
            ("folder".to_string(), folder.to_string()),
            ("date".to_string(), now.format("%Y-%m-%d").to_string()),
            ("time".to_string(), now.format("%H:%M").to_string()),
        ])
    }

    fn read_template(&self, template_path: &str) -> HostResult<String> {
        let path = normalize_path(template_path);
        if self.vault.get_file_by_path(&path).is_some() {
            return self.vault.read(&path);
        }
        let with_extension = format!("{}.md", path);
        if self.vault.get_file_by_path(&with_extension).is_some() {
            return self.vault.read(&with_extension);
        }
        Err(HostError::FileNotFound(path))
    }
}

#[async_trait]
impl TemplateBridge for VaultTemplateEngine {
    async fn create_new_note_from_template(
        &self,
        template_path: &str,
        target_folder: Option<&str>,
        new_name: &str,
        open_after: bool,
    ) -> HostResult<Option<VaultFile>> {
        let template = self.read_template(template_path)?;
        let folder = target_folder.map(normalize_path).unwrap_or_default();
        let content = Self::expand(&template, &self.variables(new_name, &folder))?;

        let path = if folder.is_empty() {
            format!("{}.md", new_name)
        } else {
            format!("{}/{}.md", folder, new_name)
        };
        let file = self.vault.create(&path, &content)?;
        info!(path = %file.path, template = template_path, "Created note from template");

        if open_after {
            self.vault.set_active_file(Some(&file.path));
        }
        Ok(Some(file))
    }

    async fn append_template_to_active_file(&self, template_path: &str) -> HostResult<()> {
        let active = self.vault.active_file().ok_or(HostError::NoActiveFile)?;
        let template = self.read_template(template_path)?;
        let content = Self::expand(&template, &self.variables(&active.basename, active.parent()))?;
        self.vault.append(&active.path, &content)?;
        debug!(path = %active.path, template = template_path, "Appended template to active file");
        Ok(())
    }
}
