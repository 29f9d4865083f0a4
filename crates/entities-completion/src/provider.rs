//! The provider contract and the registration record the registry holds.

use crate::error::EntitiesResult;
use crate::settings::{EntityProviderUserSettings, ProviderConfiguration};
use crate::types::{EntitySuggestionItem, ProviderStatus, RefreshBehavior, TriggerCharacter};
use entities_host::HostContext;
use std::fmt;
use std::sync::Arc;

/// Host context plus plugin-wide options handed to every provider factory
#[derive(Debug, Clone)]
pub struct ProviderContext {
    pub host: Arc<HostContext>,
    /// Open notes created by creation-template actions
    pub open_created_notes: bool,
}

impl ProviderContext {
    pub fn new(host: Arc<HostContext>) -> Self {
        Self {
            host,
            open_created_notes: false,
        }
    }

    pub fn with_open_created_notes(mut self, open: bool) -> Self {
        self.open_created_notes = open;
        self
    }
}

/// A pluggable source of suggestion candidates
///
/// `get_entity_list` runs inside a keystroke callback. Implementations must
/// answer from memory; anything slower belongs in the constructor. An `Err`
/// is logged by the controller and treated as an empty contribution.
pub trait EntityProvider: Send + Sync {
    fn provider_type_id(&self) -> &str;

    fn settings(&self) -> &EntityProviderUserSettings;

    fn enabled(&self) -> bool {
        self.settings().enabled
    }

    /// Trigger characters this provider answers to; never empty
    fn triggers(&self) -> Vec<TriggerCharacter> {
        vec![TriggerCharacter::At]
    }

    fn get_entity_list(
        &self,
        query: &str,
        trigger: TriggerCharacter,
    ) -> EntitiesResult<Vec<EntitySuggestionItem>>;

    fn refresh_behavior(&self) -> RefreshBehavior {
        RefreshBehavior::Default
    }

    /// Whether `get_entity_list` already filtered by the query
    fn filters_query(&self) -> bool {
        false
    }

    /// "Create new entity" suggestions for the query
    fn template_creation_suggestions(&self, _query: &str) -> Vec<EntitySuggestionItem> {
        Vec::new()
    }

    fn status(&self) -> ProviderStatus {
        ProviderStatus::Ready
    }
}

pub type ProviderFactory = Arc<
    dyn Fn(&ProviderConfiguration, &ProviderContext) -> EntitiesResult<Arc<dyn EntityProvider>>
        + Send
        + Sync,
>;

/// Registration record for one provider type
#[derive(Clone)]
pub struct ProviderDescriptor {
    pub type_id: String,
    pub name: String,
    pub description: String,
    /// Baseline configuration shown when the user adds this provider
    pub default_settings: fn() -> ProviderConfiguration,
    pub factory: ProviderFactory,
}

impl ProviderDescriptor {
    pub fn new<F>(
        type_id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        default_settings: fn() -> ProviderConfiguration,
        factory: F,
    ) -> Self
    where
        F: Fn(&ProviderConfiguration, &ProviderContext) -> EntitiesResult<Arc<dyn EntityProvider>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            type_id: type_id.into(),
            name: name.into(),
            description: description.into(),
            default_settings,
            factory: Arc::new(factory),
        }
    }

    pub fn instantiate(
        &self,
        config: &ProviderConfiguration,
        context: &ProviderContext,
    ) -> EntitiesResult<Arc<dyn EntityProvider>> {
        (self.factory)(config, context)
    }
}

impl fmt::Debug for ProviderDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderDescriptor")
            .field("type_id", &self.type_id)
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}
