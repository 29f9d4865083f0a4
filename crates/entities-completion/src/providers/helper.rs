//! Checkbox and callout snippets behind `/`.

use crate::error::EntitiesResult;
use crate::provider::EntityProvider;
use crate::settings::{type_ids, EntityProviderUserSettings, HelperProviderSettings};
use crate::types::{EntitySuggestionItem, RefreshBehavior, TriggerCharacter};

const CALLOUTS: [(&str, &str); 13] = [
    ("note", "pencil"),
    ("abstract", "clipboard-list"),
    ("info", "info"),
    ("todo", "check-circle"),
    ("tip", "flame"),
    ("success", "check"),
    ("question", "help-circle"),
    ("warning", "alert-triangle"),
    ("failure", "x"),
    ("danger", "zap"),
    ("bug", "bug"),
    ("example", "list"),
    ("quote", "quote"),
];

pub struct HelperProvider {
    settings: HelperProviderSettings,
    items: Vec<EntitySuggestionItem>,
}

impl HelperProvider {
    pub fn new(settings: HelperProviderSettings) -> Self {
        let mut items = Vec::new();

        if settings.checkboxes {
            items.push(
                EntitySuggestionItem::new("checkbox")
                    .with_note("Open task")
                    .with_replacement("- [ ] ")
                    .with_icon("square"),
            );
            items.push(
                EntitySuggestionItem::new("task done")
                    .with_note("Completed task")
                    .with_replacement("- [x] ")
                    .with_icon("check-square"),
            );
        }

        if settings.callouts {
            items.extend(CALLOUTS.iter().map(|(kind, icon)| {
                EntitySuggestionItem::new(format!("callout {}", kind))
                    .with_note(format!("> [!{}]", kind))
                    .with_replacement(format!("> [!{}]\n> ", kind))
                    .with_icon(*icon)
            }));
        }

        Self { settings, items }
    }
}

impl EntityProvider for HelperProvider {
    fn provider_type_id(&self) -> &str {
        type_ids::HELPER
    }

    fn settings(&self) -> &EntityProviderUserSettings {
        &self.settings.common
    }

    fn triggers(&self) -> Vec<TriggerCharacter> {
        vec![TriggerCharacter::Slash]
    }

    fn get_entity_list(
        &self,
        _query: &str,
        _trigger: TriggerCharacter,
    ) -> EntitiesResult<Vec<EntitySuggestionItem>> {
        Ok(self.items.clone())
    }

    fn refresh_behavior(&self) -> RefreshBehavior {
        RefreshBehavior::Never
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_command_list() {
        let provider = HelperProvider::new(HelperProviderSettings::default());
        let items = provider.get_entity_list("", TriggerCharacter::Slash).unwrap();
        assert_eq!(items.len(), 2 + CALLOUTS.len());
        assert_eq!(items[0].replacement_text.as_deref(), Some("- [ ] "));
        assert_eq!(items[2].replacement_text.as_deref(), Some("> [!note]\n> "));
    }

    #[test]
    fn test_toggles() {
        let provider = HelperProvider::new(HelperProviderSettings {
            callouts: false,
            ..Default::default()
        });
        let items = provider.get_entity_list("", TriggerCharacter::Slash).unwrap();
        let labels: Vec<&str> = items.iter().map(|i| i.suggestion_text.as_str()).collect();
        assert_eq!(labels, vec!["checkbox", "task done"]);
    }
}
