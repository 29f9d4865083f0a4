//! Plugin lifecycle: settings load, provider instantiation, reload, unload.

use crate::error::EntitiesResult;
use crate::provider::{ProviderContext, ProviderDescriptor};
use crate::registry::{InstantiationReport, ProviderRegistry};
use crate::settings::PluginSettings;
use crate::suggestor::{EntitiesSuggestor, SuggestorOptions};
use crate::types::ProviderStatus;
use entities_host::{HostContext, PluginDataStore};
use std::sync::Arc;
use tracing::{info, warn};

/// Owns the registry and the controller for one plugin lifetime
pub struct EntitiesPlugin {
    host: Arc<HostContext>,
    store: Arc<dyn PluginDataStore>,
    settings: PluginSettings,
    registry: ProviderRegistry,
    suggestor: EntitiesSuggestor,
    /// Registrations beyond the built-ins, replayed on every reload
    extra_types: Vec<ProviderDescriptor>,
    last_report: InstantiationReport,
}

impl EntitiesPlugin {
    /// Load stored settings (merged over defaults) and instantiate providers
    ///
    /// Stored settings that do not parse are replaced by the defaults.
    pub fn load(host: Arc<HostContext>, store: Arc<dyn PluginDataStore>) -> EntitiesResult<Self> {
        let stored = store.load_data()?;
        let settings = PluginSettings::from_stored(stored).unwrap_or_else(|e| {
            warn!(error = %e, "Stored settings are invalid, using defaults");
            PluginSettings::default()
        });

        let mut plugin = Self {
            suggestor: EntitiesSuggestor::new(SuggestorOptions::from(&settings)),
            host,
            store,
            settings,
            registry: ProviderRegistry::new(),
            extra_types: Vec::new(),
            last_report: InstantiationReport::default(),
        };
        plugin.reload()?;
        info!(providers = plugin.registry.get_providers().len(), "Entities plugin loaded");
        Ok(plugin)
    }

    /// Add a provider type; takes effect on the next reload
    pub fn register_provider_type(&mut self, descriptor: ProviderDescriptor) {
        self.extra_types
            .retain(|d| d.type_id != descriptor.type_id);
        self.extra_types.push(descriptor.clone());
        self.registry.register_provider_type(descriptor);
    }

    /// Rebuild the registry from the current settings
    pub fn reload(&mut self) -> EntitiesResult<&InstantiationReport> {
        let context = ProviderContext::new(self.host.clone())
            .with_open_created_notes(self.settings.open_created_notes);

        self.registry.initialize(context);
        self.registry.register_builtin_types();
        for descriptor in &self.extra_types {
            self.registry.register_provider_type(descriptor.clone());
        }

        self.last_report = self
            .registry
            .instantiate_providers_from_settings(&self.settings.providers)?;
        self.suggestor
            .set_options(SuggestorOptions::from(&self.settings));
        self.suggestor.load_providers(&self.registry);
        Ok(&self.last_report)
    }

    /// Persist `settings` as a whole and re-instantiate providers
    pub async fn update_settings(&mut self, settings: PluginSettings) -> EntitiesResult<&InstantiationReport> {
        self.store.save_data(settings.to_value()?).await?;
        self.settings = settings;
        self.reload()
    }

    /// Drop all provider instances
    pub fn unload(&mut self) {
        self.registry.reset_providers();
        self.suggestor.load_providers(&self.registry);
        info!("Entities plugin unloaded");
    }

    pub fn settings(&self) -> &PluginSettings {
        &self.settings
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn suggestor(&self) -> &EntitiesSuggestor {
        &self.suggestor
    }

    pub fn suggestor_mut(&mut self) -> &mut EntitiesSuggestor {
        &mut self.suggestor
    }

    pub fn last_report(&self) -> &InstantiationReport {
        &self.last_report
    }

    /// `(provider type, status)` for each live provider, in settings order
    pub fn provider_statuses(&self) -> Vec<(String, ProviderStatus)> {
        self.registry
            .get_providers()
            .iter()
            .map(|p| (p.provider_type_id().to_string(), p.status()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{FolderProviderSettings, ProviderConfiguration};
    use entities_host::{MemoryDataStore, MemoryVault};
    use serde_json::json;

    fn host() -> Arc<HostContext> {
        Arc::new(HostContext::new(Arc::new(MemoryVault::new())))
    }

    #[test]
    fn test_load_defaults_when_store_empty() {
        let plugin = EntitiesPlugin::load(host(), Arc::new(MemoryDataStore::new())).unwrap();
        let ids: Vec<String> = plugin
            .provider_statuses()
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(ids, vec!["character", "date", "helper"]);
        assert!(!plugin.suggestor().is_stale(plugin.registry()));
    }

    #[test]
    fn test_invalid_store_falls_back_to_defaults() {
        let store = MemoryDataStore::with_data(json!({"debounceMs": "fast"}));
        let plugin = EntitiesPlugin::load(host(), Arc::new(store)).unwrap();
        assert_eq!(plugin.settings(), &PluginSettings::default());
    }

    #[tokio::test]
    async fn test_update_settings_saves_and_reloads() {
        let store = Arc::new(MemoryDataStore::new());
        let mut plugin = EntitiesPlugin::load(host(), store.clone()).unwrap();
        let generation = plugin.registry().generation();

        let settings = PluginSettings {
            providers: vec![ProviderConfiguration::Folder(FolderProviderSettings {
                path: "People".to_string(),
                ..Default::default()
            })],
            ..Default::default()
        };
        let report = plugin.update_settings(settings.clone()).await.unwrap();
        assert_eq!(report.instantiated, 1);

        assert!(plugin.registry().generation() > generation);
        assert_eq!(
            PluginSettings::from_stored(store.snapshot()).unwrap(),
            settings
        );
    }

    #[test]
    fn test_unload_clears_providers() {
        let mut plugin = EntitiesPlugin::load(host(), Arc::new(MemoryDataStore::new())).unwrap();
        plugin.unload();
        assert!(plugin.registry().get_providers().is_empty());
        assert!(plugin.suggestor().providers().is_empty());
    }
}
