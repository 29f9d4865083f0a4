//! Notes in a vault folder.

use crate::error::EntitiesResult;
use crate::provider::{EntityProvider, ProviderContext};
use crate::settings::{type_ids, EntityProviderUserSettings, FolderProviderSettings};
use crate::template::TemplateInstantiator;
use crate::types::{wikilink, EntitySuggestionItem, ProviderStatus, TriggerCharacter};
use entities_host::{normalize_path, Vault, VaultFile};
use std::sync::Arc;
use tracing::debug;

pub struct FolderProvider {
    settings: FolderProviderSettings,
    vault: Arc<dyn Vault>,
    instantiator: TemplateInstantiator,
}

impl FolderProvider {
    pub fn new(settings: FolderProviderSettings, context: &ProviderContext) -> Self {
        let folder = normalize_path(&settings.path);
        Self {
            instantiator: TemplateInstantiator::new(
                context,
                type_ids::FOLDER,
                Some(folder),
                &settings.common.entity_creation_templates,
            ),
            vault: context.host.vault.clone(),
            settings,
        }
    }

    fn collect_files(&self, path: &str, out: &mut Vec<VaultFile>) -> bool {
        let Some(folder) = self.vault.get_folder_by_path(path) else {
            return false;
        };
        out.extend(folder.files().filter(|f| f.is_markdown()).cloned());
        if self.settings.recursive {
            let subfolders: Vec<String> = folder.subfolders().map(str::to_string).collect();
            for sub in subfolders {
                self.collect_files(&sub, out);
            }
        }
        true
    }

    fn items_for(&self, file: &VaultFile) -> Vec<EntitySuggestionItem> {
        let icon = &self.settings.common.icon;
        let mut items = vec![EntitySuggestionItem::new(file.basename.clone())
            .with_note(file.parent().to_string())
            .with_replacement(wikilink(&file.basename, None))
            .with_icon(icon.clone())];

        if self.settings.include_aliases {
            let aliases = self
                .vault
                .get_file_cache(file)
                .map(|cache| cache.frontmatter_strings("aliases"))
                .unwrap_or_default();
            items.extend(aliases.into_iter().map(|alias| {
                EntitySuggestionItem::new(alias.clone())
                    .with_note(file.basename.clone())
                    .with_replacement(wikilink(&file.basename, Some(&alias)))
                    .with_icon(icon.clone())
                    .with_match(alias)
            }));
        }
        items
    }
}

impl EntityProvider for FolderProvider {
    fn provider_type_id(&self) -> &str {
        type_ids::FOLDER
    }

    fn settings(&self) -> &EntityProviderUserSettings {
        &self.settings.common
    }

    fn triggers(&self) -> Vec<TriggerCharacter> {
        vec![TriggerCharacter::At]
    }

    fn get_entity_list(
        &self,
        _query: &str,
        _trigger: TriggerCharacter,
    ) -> EntitiesResult<Vec<EntitySuggestionItem>> {
        let mut files = Vec::new();
        if !self.collect_files(&self.settings.path, &mut files) {
            debug!(path = %self.settings.path, "Folder not found, no suggestions");
            return Ok(Vec::new());
        }
        Ok(files.iter().flat_map(|f| self.items_for(f)).collect())
    }

    fn template_creation_suggestions(&self, query: &str) -> Vec<EntitySuggestionItem> {
        self.instantiator.suggestions(
            &self.settings.common.entity_creation_templates,
            query,
            &self.settings.common.icon,
        )
    }

    fn status(&self) -> ProviderStatus {
        self.instantiator.status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{EntityCreationTemplate, TemplateEngine};
    use crate::template::TEMPLATE_BRIDGE;
    use entities_host::{HostContext, MemoryVault, VaultTemplateEngine};

    fn provider(settings: FolderProviderSettings) -> FolderProvider {
        provider_with_bridge(settings, false)
    }

    fn provider_with_bridge(settings: FolderProviderSettings, bridge: bool) -> FolderProvider {
        let vault = Arc::new(MemoryVault::new());
        vault.create_folder("People/Archive");
        vault.upsert("People/Ada.md", "---\naliases: [Countess]\n---\nbody");
        vault.upsert("People/Grace.md", "body");
        vault.upsert("People/photo.png", "");
        vault.upsert("People/Archive/Alan.md", "body");
        vault.upsert("Templates/Person.md", "# {{title}}");
        let mut host = HostContext::new(vault.clone());
        if bridge {
            host = host.with_templates(Arc::new(VaultTemplateEngine::new(vault)));
        }
        FolderProvider::new(settings, &ProviderContext::new(Arc::new(host)))
    }

    fn labels(items: &[EntitySuggestionItem]) -> Vec<&str> {
        items.iter().map(|i| i.suggestion_text.as_str()).collect()
    }

    #[test]
    fn test_lists_notes_and_aliases() {
        let p = provider(FolderProviderSettings {
            path: "People".to_string(),
            ..Default::default()
        });
        let items = p.get_entity_list("", TriggerCharacter::At).unwrap();

        assert_eq!(labels(&items), vec!["Ada", "Countess", "Grace"]);
        assert_eq!(items[0].replacement_text.as_deref(), Some("[[Ada]]"));
        assert_eq!(items[1].replacement_text.as_deref(), Some("[[Ada|Countess]]"));
        assert_eq!(items[1].note_text.as_deref(), Some("Ada"));
    }

    #[test]
    fn test_recursive_listing() {
        let p = provider(FolderProviderSettings {
            path: "People".to_string(),
            recursive: true,
            include_aliases: false,
            ..Default::default()
        });
        let items = p.get_entity_list("", TriggerCharacter::At).unwrap();
        assert_eq!(labels(&items), vec!["Ada", "Grace", "Alan"]);
    }

    #[test]
    fn test_missing_folder_is_empty() {
        let p = provider(FolderProviderSettings {
            path: "Nowhere".to_string(),
            ..Default::default()
        });
        assert!(p.get_entity_list("a", TriggerCharacter::At).unwrap().is_empty());
    }

    fn person_template() -> Vec<EntityCreationTemplate> {
        vec![EntityCreationTemplate {
            engine: TemplateEngine::Templater,
            template_path: "Templates/Person.md".to_string(),
            entity_name: "Person".to_string(),
        }]
    }

    #[test]
    fn test_creation_templates_without_bridge_report_missing() {
        let settings = FolderProviderSettings {
            path: "People".to_string(),
            common: EntityProviderUserSettings {
                entity_creation_templates: person_template(),
                ..Default::default()
            },
            ..Default::default()
        };
        let p = provider(settings);

        assert!(p.template_creation_suggestions("Grace").is_empty());
        assert_eq!(p.status(), ProviderStatus::missing(TEMPLATE_BRIDGE));
    }

    #[test]
    fn test_creation_templates_with_bridge_are_ready() {
        let settings = FolderProviderSettings {
            path: "People".to_string(),
            common: EntityProviderUserSettings {
                entity_creation_templates: person_template(),
                ..Default::default()
            },
            ..Default::default()
        };
        let p = provider_with_bridge(settings, true);

        assert_eq!(p.template_creation_suggestions("Grace").len(), 1);
        assert!(p.status().is_ready());
    }

    #[test]
    fn test_no_templates_is_ready_without_bridge() {
        let p = provider(FolderProviderSettings {
            path: "People".to_string(),
            ..Default::default()
        });
        assert!(p.status().is_ready());
    }
}
