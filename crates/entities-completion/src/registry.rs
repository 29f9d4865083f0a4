//! Provider registry: type descriptors plus the live provider instances.

use crate::error::{EntitiesError, EntitiesResult};
use crate::provider::{EntityProvider, ProviderContext, ProviderDescriptor};
use crate::providers::builtin_descriptors;
use crate::settings::ProviderConfiguration;
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::{debug, error, info};

/// A configuration entry that did not produce a provider
#[derive(Debug)]
pub struct SkippedProvider {
    /// Position in the settings list
    pub index: usize,
    pub provider_type_id: String,
    pub error: EntitiesError,
}

/// Outcome of [`ProviderRegistry::instantiate_providers_from_settings`]
#[derive(Debug, Default)]
pub struct InstantiationReport {
    pub instantiated: usize,
    pub disabled: usize,
    pub skipped: Vec<SkippedProvider>,
}

impl InstantiationReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Maps provider type identifiers to descriptors and owns the instances built
/// from settings
///
/// Each call that replaces the instance list bumps [`generation`], so holders
/// of a provider snapshot can tell it has gone stale.
///
/// [`generation`]: ProviderRegistry::generation
#[derive(Default)]
pub struct ProviderRegistry {
    context: Option<ProviderContext>,
    descriptors: IndexMap<String, ProviderDescriptor>,
    providers: Vec<Arc<dyn EntityProvider>>,
    generation: u64,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset descriptors and instances and bind the host context
    pub fn initialize(&mut self, context: ProviderContext) {
        self.descriptors.clear();
        self.providers.clear();
        self.context = Some(context);
        self.generation += 1;
        info!(generation = self.generation, "Provider registry initialized");
    }

    pub fn is_initialized(&self) -> bool {
        self.context.is_some()
    }

    pub fn context(&self) -> Option<&ProviderContext> {
        self.context.as_ref()
    }

    /// Register a provider type, replacing any previous registration
    pub fn register_provider_type(&mut self, descriptor: ProviderDescriptor) {
        debug!(provider_type = %descriptor.type_id, "Registering provider type");
        self.descriptors
            .insert(descriptor.type_id.clone(), descriptor);
    }

    pub fn register_builtin_types(&mut self) {
        for descriptor in builtin_descriptors() {
            self.register_provider_type(descriptor);
        }
    }

    pub fn descriptor(&self, type_id: &str) -> Option<&ProviderDescriptor> {
        self.descriptors.get(type_id)
    }

    /// Registered descriptors in registration order
    pub fn descriptors(&self) -> impl Iterator<Item = &ProviderDescriptor> {
        self.descriptors.values()
    }

    /// Replace the instance list with one provider per enabled entry
    ///
    /// Entries with an unregistered type, invalid settings, or a factory error
    /// are logged and reported, never propagated. The only error is calling
    /// this before [`initialize`](Self::initialize).
    pub fn instantiate_providers_from_settings(
        &mut self,
        configurations: &[ProviderConfiguration],
    ) -> EntitiesResult<InstantiationReport> {
        let context = self
            .context
            .clone()
            .ok_or(EntitiesError::RegistryNotInitialized)?;

        let mut report = InstantiationReport::default();
        let mut providers = Vec::with_capacity(configurations.len());

        for (index, config) in configurations.iter().enumerate() {
            let type_id = config.provider_type_id().to_string();

            if !config.is_enabled() {
                debug!(index, provider_type = %type_id, "Skipping disabled provider");
                report.disabled += 1;
                continue;
            }

            match self.instantiate_one(config, &context) {
                Ok(provider) => providers.push(provider),
                Err(e) => {
                    error!(index, provider_type = %type_id, error = %e, "Skipping provider configuration");
                    report.skipped.push(SkippedProvider {
                        index,
                        provider_type_id: type_id,
                        error: e,
                    });
                }
            }
        }

        report.instantiated = providers.len();
        self.providers = providers;
        self.generation += 1;
        info!(
            generation = self.generation,
            instantiated = report.instantiated,
            skipped = report.skipped.len(),
            "Instantiated providers from settings"
        );

        Ok(report)
    }

    fn instantiate_one(
        &self,
        config: &ProviderConfiguration,
        context: &ProviderContext,
    ) -> EntitiesResult<Arc<dyn EntityProvider>> {
        let type_id = config.provider_type_id();
        let descriptor = self
            .descriptors
            .get(type_id)
            .ok_or_else(|| EntitiesError::UnknownProviderType(type_id.to_string()))?;

        let provider = descriptor.instantiate(config, context)?;
        if provider.triggers().is_empty() {
            return Err(EntitiesError::invalid_settings(
                type_id,
                "provider declares no trigger characters",
            ));
        }
        Ok(provider)
    }

    /// Live providers in settings order
    pub fn get_providers(&self) -> &[Arc<dyn EntityProvider>] {
        &self.providers
    }

    pub fn reset_providers(&mut self) {
        self.providers.clear();
        self.generation += 1;
        debug!(generation = self.generation, "Provider instances reset");
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{
        CharacterProviderSettings, FolderProviderSettings, HelperProviderSettings,
    };
    use entities_host::{HostContext, MemoryVault};
    use serde_json::Map;

    fn initialized() -> ProviderRegistry {
        let host = HostContext::new(Arc::new(MemoryVault::new()));
        let mut registry = ProviderRegistry::new();
        registry.initialize(ProviderContext::new(Arc::new(host)));
        registry.register_builtin_types();
        registry
    }

    #[test]
    fn test_builtin_types_registered() {
        let registry = initialized();
        for id in [
            "folder",
            "dataview",
            "noteFromTemplate",
            "insertTemplate",
            "character",
            "date",
            "helper",
            "fileClass",
        ] {
            let descriptor = registry.descriptor(id).unwrap();
            assert_eq!((descriptor.default_settings)().provider_type_id(), id);
        }
    }

    #[test]
    fn test_requires_initialize() {
        let mut registry = ProviderRegistry::new();
        let result = registry.instantiate_providers_from_settings(&[]);
        assert!(matches!(result, Err(EntitiesError::RegistryNotInitialized)));
    }

    #[test]
    fn test_unknown_type_is_skipped() {
        let mut registry = initialized();
        let configs = vec![
            ProviderConfiguration::Helper(HelperProviderSettings::default()),
            ProviderConfiguration::Custom {
                provider_type_id: "zotero".to_string(),
                settings: Map::new(),
            },
            ProviderConfiguration::Character(CharacterProviderSettings::default()),
        ];

        let report = registry.instantiate_providers_from_settings(&configs).unwrap();

        assert_eq!(report.instantiated, 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].index, 1);
        assert!(matches!(
            report.skipped[0].error,
            EntitiesError::UnknownProviderType(_)
        ));

        let ids: Vec<&str> = registry
            .get_providers()
            .iter()
            .map(|p| p.provider_type_id())
            .collect();
        assert_eq!(ids, vec!["helper", "character"]);
    }

    #[test]
    fn test_disabled_entries_are_not_instantiated() {
        let mut registry = initialized();
        let mut folder = FolderProviderSettings::default();
        folder.common.enabled = false;

        let report = registry
            .instantiate_providers_from_settings(&[ProviderConfiguration::Folder(folder)])
            .unwrap();

        assert_eq!(report.disabled, 1);
        assert!(registry.get_providers().is_empty());
        assert!(report.is_clean());
    }

    #[test]
    fn test_reregistration_overwrites() {
        let mut registry = initialized();
        let count = registry.descriptors().count();
        let mut replacement = registry.descriptor("helper").unwrap().clone();
        replacement.name = "Commands".to_string();
        registry.register_provider_type(replacement);

        assert_eq!(registry.descriptors().count(), count);
        assert_eq!(registry.descriptor("helper").unwrap().name, "Commands");
    }

    #[test]
    fn test_generations_do_not_share_instances() {
        let mut registry = initialized();
        let configs = vec![ProviderConfiguration::Helper(HelperProviderSettings::default())];

        registry.instantiate_providers_from_settings(&configs).unwrap();
        let first = registry.get_providers()[0].clone();
        let generation = registry.generation();

        registry.reset_providers();
        assert!(registry.get_providers().is_empty());
        registry.instantiate_providers_from_settings(&configs).unwrap();

        assert!(registry.generation() > generation);
        assert!(!Arc::ptr_eq(&first, &registry.get_providers()[0]));
    }
}
