//! Pages returned by the dataview bridge.

use crate::error::{EntitiesError, EntitiesResult};
use crate::provider::{EntityProvider, ProviderContext};
use crate::settings::{type_ids, DataviewProviderSettings, EntityProviderUserSettings};
use crate::template::TemplateInstantiator;
use crate::types::{wikilink, EntitySuggestionItem, ProviderStatus, TriggerCharacter};
use entities_host::DataviewApi;
use std::sync::Arc;
use tracing::warn;

/// Pages matching a query source, through the dataview bridge
pub struct DataviewProvider {
    settings: DataviewProviderSettings,
    api: Option<Arc<dyn DataviewApi>>,
    /// Set when the bridge rejected the configured query at construction
    query_error: Option<String>,
    instantiator: TemplateInstantiator,
}

impl DataviewProvider {
    pub fn new(settings: DataviewProviderSettings, context: &ProviderContext) -> Self {
        let api = context.host.dataview.clone();
        let mut query_error = None;
        match &api {
            None => {
                warn!(provider = type_ids::DATAVIEW, "Dataview bridge unavailable, provider disabled");
            }
            Some(api) => {
                if let Err(e) = api.pages(&settings.query) {
                    let err = EntitiesError::ProviderFailed {
                        provider: type_ids::DATAVIEW.to_string(),
                        message: format!("query {:?}: {}", settings.query, e),
                    };
                    warn!(error = %err, "Dataview query rejected, provider disabled");
                    query_error = Some(e.to_string());
                }
            }
        }
        Self {
            instantiator: TemplateInstantiator::new(
                context,
                type_ids::DATAVIEW,
                None,
                &settings.common.entity_creation_templates,
            ),
            api,
            query_error,
            settings,
        }
    }
}

impl EntityProvider for DataviewProvider {
    fn provider_type_id(&self) -> &str {
        type_ids::DATAVIEW
    }

    fn settings(&self) -> &EntityProviderUserSettings {
        &self.settings.common
    }

    fn get_entity_list(
        &self,
        _query: &str,
        _trigger: TriggerCharacter,
    ) -> EntitiesResult<Vec<EntitySuggestionItem>> {
        let Some(api) = &self.api else {
            return Ok(Vec::new());
        };
        if self.query_error.is_some() {
            return Ok(Vec::new());
        }
        let pages = match api.pages(&self.settings.query) {
            Ok(pages) => pages,
            Err(e) => {
                warn!(provider = type_ids::DATAVIEW, error = %e, "Dataview query failed");
                return Ok(Vec::new());
            }
        };
        Ok(pages
            .into_iter()
            .map(|page| {
                EntitySuggestionItem::new(page.basename.clone())
                    .with_note(page.parent().to_string())
                    .with_replacement(wikilink(&page.basename, None))
                    .with_icon(self.settings.common.icon.clone())
            })
            .collect())
    }

    fn template_creation_suggestions(&self, query: &str) -> Vec<EntitySuggestionItem> {
        if self.api.is_none() {
            return Vec::new();
        }
        self.instantiator.suggestions(
            &self.settings.common.entity_creation_templates,
            query,
            &self.settings.common.icon,
        )
    }

    fn status(&self) -> ProviderStatus {
        if self.api.is_none() {
            return ProviderStatus::missing("dataview");
        }
        if let Some(reason) = &self.query_error {
            return ProviderStatus::misconfigured(reason.clone());
        }
        self.instantiator.status()
    }
}
