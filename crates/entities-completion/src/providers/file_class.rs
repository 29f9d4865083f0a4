//! Notes of one metadata-schema file class.

use crate::error::{EntitiesError, EntitiesResult};
use crate::provider::{EntityProvider, ProviderContext};
use crate::settings::{
    type_ids, EntityCreationTemplate, EntityProviderUserSettings, FileClassProviderSettings,
    TemplateEngine,
};
use crate::template::TemplateInstantiator;
use crate::types::{wikilink, EntitySuggestionItem, ProviderStatus, TriggerCharacter};
use entities_host::{FileClass, Vault};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct FileClassProvider {
    settings: FileClassProviderSettings,
    vault: Arc<dyn Vault>,
    /// Class definition from the schema bridge, looked up once
    class: Option<FileClass>,
    schema_available: bool,
    instantiator: TemplateInstantiator,
}

impl FileClassProvider {
    pub fn new(settings: FileClassProviderSettings, context: &ProviderContext) -> EntitiesResult<Self> {
        if settings.file_class.trim().is_empty() {
            return Err(EntitiesError::invalid_settings(
                type_ids::FILE_CLASS,
                "fileClass must not be empty",
            ));
        }

        let schema = context.host.metadata_schema.clone();
        let class = match &schema {
            Some(schema) => {
                let class = schema.file_classes().get(&settings.file_class).cloned();
                if class.is_none() {
                    debug!(file_class = %settings.file_class, "Class unknown to metadata schema");
                }
                class
            }
            None => {
                warn!(provider = type_ids::FILE_CLASS, "Metadata schema unavailable, no creation suggestions");
                None
            }
        };

        let target_folder = class.as_ref().and_then(|c| c.folder.clone());
        // the class template is expanded through the same bridge
        let mut templates = settings.common.entity_creation_templates.clone();
        if let Some((class, path)) = class
            .as_ref()
            .and_then(|c| c.template_path.as_ref().map(|t| (c, t)))
        {
            templates.push(EntityCreationTemplate {
                engine: TemplateEngine::Templater,
                template_path: path.clone(),
                entity_name: class.name.clone(),
            });
        }
        Ok(Self {
            instantiator: TemplateInstantiator::new(
                context,
                type_ids::FILE_CLASS,
                target_folder,
                &templates,
            ),
            vault: context.host.vault.clone(),
            schema_available: schema.is_some(),
            class,
            settings,
        })
    }
}

impl EntityProvider for FileClassProvider {
    fn provider_type_id(&self) -> &str {
        type_ids::FILE_CLASS
    }

    fn settings(&self) -> &EntityProviderUserSettings {
        &self.settings.common
    }

    fn get_entity_list(
        &self,
        _query: &str,
        _trigger: TriggerCharacter,
    ) -> EntitiesResult<Vec<EntitySuggestionItem>> {
        let class = &self.settings.file_class;
        Ok(self
            .vault
            .markdown_files()
            .into_iter()
            .filter(|file| {
                self.vault
                    .get_file_cache(file)
                    .map(|cache| {
                        cache
                            .frontmatter_strings(&self.settings.field_name)
                            .iter()
                            .any(|c| c.eq_ignore_ascii_case(class))
                    })
                    .unwrap_or(false)
            })
            .map(|file| {
                EntitySuggestionItem::new(file.basename.clone())
                    .with_note(class.clone())
                    .with_replacement(wikilink(&file.basename, None))
                    .with_icon(self.settings.common.icon.clone())
            })
            .collect())
    }

    fn template_creation_suggestions(&self, query: &str) -> Vec<EntitySuggestionItem> {
        let mut items = self.instantiator.suggestions(
            &self.settings.common.entity_creation_templates,
            query,
            &self.settings.common.icon,
        );

        let name = query.trim();
        if name.is_empty() {
            return items;
        }
        let class_template = self
            .class
            .as_ref()
            .and_then(|c| c.template_path.as_deref().map(|t| (c, t)));
        if let Some((class, template_path)) = class_template {
            if let Some(action) = self.instantiator.create_action(template_path, name) {
                items.push(
                    EntitySuggestionItem::new(format!("New {}: {}", class.name, name))
                        .with_note(template_path.to_string())
                        .with_replacement(wikilink(name, None))
                        .with_icon(self.settings.common.icon.clone())
                        .with_action(action),
                );
            }
        }
        items
    }

    fn status(&self) -> ProviderStatus {
        if self.schema_available {
            self.instantiator.status()
        } else {
            ProviderStatus::missing("metadata schema")
        }
    }
}
