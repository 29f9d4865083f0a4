//! Templates folder listing, either inserted into the active note or used to
//! create a new one.

use crate::error::EntitiesResult;
use crate::provider::{EntityProvider, ProviderContext};
use crate::settings::{type_ids, EntityProviderUserSettings, TemplateProviderSettings};
use crate::template::{AppendTemplateAction, TemplateInstantiator, TEMPLATE_BRIDGE};
use crate::types::{wikilink, EntitySuggestionItem, ProviderStatus, TriggerCharacter};
use entities_host::{normalize_path, TemplateBridge, Vault, VaultFile};
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateMode {
    InsertTemplate,
    NoteFromTemplate,
}

pub struct TemplateProvider {
    settings: TemplateProviderSettings,
    mode: TemplateMode,
    vault: Arc<dyn Vault>,
    bridge: Option<Arc<dyn TemplateBridge>>,
    instantiator: TemplateInstantiator,
}

impl TemplateProvider {
    pub fn new(settings: TemplateProviderSettings, mode: TemplateMode, context: &ProviderContext) -> Self {
        let bridge = context.host.templates.clone();
        if bridge.is_none() {
            warn!(?mode, "Template bridge unavailable, template suggestions disabled");
        }
        Self {
            // the missing bridge is already reported above
            instantiator: TemplateInstantiator::new(
                context,
                type_ids::NOTE_FROM_TEMPLATE,
                settings.target_folder.clone(),
                &[],
            ),
            vault: context.host.vault.clone(),
            bridge,
            mode,
            settings,
        }
    }

    fn templates(&self) -> Vec<VaultFile> {
        let prefix = normalize_path(&self.settings.templates_folder);
        self.vault
            .markdown_files()
            .into_iter()
            .filter(|f| prefix.is_empty() || f.path.starts_with(&format!("{}/", prefix)))
            .collect()
    }

    fn item_for(&self, bridge: &Arc<dyn TemplateBridge>, template: &VaultFile, query: &str) -> Option<EntitySuggestionItem> {
        let icon = self.settings.common.icon.clone();
        match self.mode {
            TemplateMode::InsertTemplate => Some(
                EntitySuggestionItem::new(template.basename.clone())
                    .with_note("Insert template")
                    .with_replacement("")
                    .with_icon(icon)
                    .with_action(Arc::new(AppendTemplateAction::new(
                        bridge.clone(),
                        template.path.clone(),
                    ))),
            ),
            TemplateMode::NoteFromTemplate => {
                let name = query.trim();
                if name.is_empty() {
                    return None;
                }
                let action = self.instantiator.create_action(&template.path, name)?;
                Some(
                    EntitySuggestionItem::new(template.basename.clone())
                        .with_note(format!("New note: {}", name))
                        .with_replacement(wikilink(name, None))
                        .with_icon(icon)
                        .with_action(action),
                )
            }
        }
    }
}

impl EntityProvider for TemplateProvider {
    fn provider_type_id(&self) -> &str {
        match self.mode {
            TemplateMode::InsertTemplate => type_ids::INSERT_TEMPLATE,
            TemplateMode::NoteFromTemplate => type_ids::NOTE_FROM_TEMPLATE,
        }
    }

    fn settings(&self) -> &EntityProviderUserSettings {
        &self.settings.common
    }

    fn triggers(&self) -> Vec<TriggerCharacter> {
        vec![TriggerCharacter::Slash]
    }

    fn get_entity_list(
        &self,
        query: &str,
        _trigger: TriggerCharacter,
    ) -> EntitiesResult<Vec<EntitySuggestionItem>> {
        let Some(bridge) = &self.bridge else {
            return Ok(Vec::new());
        };
        Ok(self
            .templates()
            .iter()
            .filter_map(|t| self.item_for(bridge, t, query))
            .collect())
    }

    /// New-note mode names the note after the query, so every template matches
    fn filters_query(&self) -> bool {
        self.mode == TemplateMode::NoteFromTemplate
    }

    fn status(&self) -> ProviderStatus {
        match self.bridge {
            Some(_) => ProviderStatus::Ready,
            None => ProviderStatus::missing(TEMPLATE_BRIDGE),
        }
    }
}
