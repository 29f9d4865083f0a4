//! Bridges "create new entity" suggestions to the template-expansion plugin.

use crate::error::{EntitiesError, EntitiesResult};
use crate::provider::ProviderContext;
use crate::settings::{EntityCreationTemplate, TemplateEngine};
use crate::types::{wikilink, ActionOutcome, EntitySuggestionItem, ProviderStatus, SuggestionAction};
use async_trait::async_trait;
use entities_host::TemplateBridge;
use std::sync::Arc;
use tracing::{debug, warn};

/// Dependency name reported when the template-expansion plugin is absent
pub const TEMPLATE_BRIDGE: &str = "template bridge";

/// Builds creation suggestions for one provider
///
/// The bridge handle is resolved once. Without it no creation suggestions are
/// produced, and a provider that configured templater templates reports the
/// bridge as missing.
#[derive(Clone)]
pub struct TemplateInstantiator {
    bridge: Option<Arc<dyn TemplateBridge>>,
    target_folder: Option<String>,
    open_after: bool,
    needs_bridge: bool,
}

impl TemplateInstantiator {
    pub fn new(
        context: &ProviderContext,
        provider: &str,
        target_folder: Option<String>,
        templates: &[EntityCreationTemplate],
    ) -> Self {
        let instantiator = Self {
            bridge: context.host.templates.clone(),
            target_folder: target_folder.filter(|f| !f.trim().is_empty()),
            open_after: context.open_created_notes,
            needs_bridge: templates.iter().any(|t| t.engine == TemplateEngine::Templater),
        };
        if let Err(e) = instantiator.check() {
            warn!(provider, error = %e, "Template creation unavailable");
        }
        instantiator
    }

    pub fn is_available(&self) -> bool {
        self.bridge.is_some()
    }

    /// Fails when creation templates are configured but cannot be expanded
    pub fn check(&self) -> EntitiesResult<()> {
        if self.needs_bridge && self.bridge.is_none() {
            return Err(EntitiesError::DependencyMissing(TEMPLATE_BRIDGE.to_string()));
        }
        Ok(())
    }

    pub fn status(&self) -> ProviderStatus {
        match self.check() {
            Err(EntitiesError::DependencyMissing(dependency)) => ProviderStatus::missing(dependency),
            _ => ProviderStatus::Ready,
        }
    }

    /// One suggestion per templater-engine template, named after `query`
    pub fn suggestions(
        &self,
        templates: &[EntityCreationTemplate],
        query: &str,
        icon: &str,
    ) -> Vec<EntitySuggestionItem> {
        let name = query.trim();
        let Some(bridge) = &self.bridge else {
            return Vec::new();
        };
        if name.is_empty() {
            return Vec::new();
        }

        templates
            .iter()
            .filter(|t| t.engine == TemplateEngine::Templater)
            .map(|t| {
                let action = CreateFromTemplateAction {
                    bridge: bridge.clone(),
                    template_path: t.template_path.clone(),
                    target_folder: self.target_folder.clone(),
                    new_name: name.to_string(),
                    open_after: self.open_after,
                };
                EntitySuggestionItem::new(format!("New {}: {}", t.entity_name, name))
                    .with_note(t.template_path.clone())
                    .with_replacement(wikilink(name, None))
                    .with_icon(icon)
                    .with_action(Arc::new(action))
            })
            .collect()
    }

    /// Creation action for a single template, outside the configured list
    pub fn create_action(&self, template_path: &str, new_name: &str) -> Option<Arc<dyn SuggestionAction>> {
        let bridge = self.bridge.clone()?;
        Some(Arc::new(CreateFromTemplateAction {
            bridge,
            template_path: template_path.to_string(),
            target_folder: self.target_folder.clone(),
            new_name: new_name.trim().to_string(),
            open_after: self.open_after,
        }))
    }
}

/// Creates a note from a template and links to it
pub struct CreateFromTemplateAction {
    bridge: Arc<dyn TemplateBridge>,
    template_path: String,
    target_folder: Option<String>,
    new_name: String,
    open_after: bool,
}

#[async_trait]
impl SuggestionAction for CreateFromTemplateAction {
    async fn run(&self) -> EntitiesResult<ActionOutcome> {
        let created = self
            .bridge
            .create_new_note_from_template(
                &self.template_path,
                self.target_folder.as_deref(),
                &self.new_name,
                self.open_after,
            )
            .await
            .map_err(|e| EntitiesError::ActionFailed(format!("{}: {}", self.template_path, e)))?;

        match created {
            Some(file) => {
                debug!(path = %file.path, template = %self.template_path, "Created note from template");
                Ok(ActionOutcome::Replace(wikilink(&file.basename, None)))
            }
            None => Ok(ActionOutcome::NoOp),
        }
    }
}

/// Appends a template to the active file and inserts nothing
pub struct AppendTemplateAction {
    bridge: Arc<dyn TemplateBridge>,
    template_path: String,
}

impl AppendTemplateAction {
    pub fn new(bridge: Arc<dyn TemplateBridge>, template_path: impl Into<String>) -> Self {
        Self {
            bridge,
            template_path: template_path.into(),
        }
    }
}

#[async_trait]
impl SuggestionAction for AppendTemplateAction {
    async fn run(&self) -> EntitiesResult<ActionOutcome> {
        self.bridge
            .append_template_to_active_file(&self.template_path)
            .await
            .map_err(|e| EntitiesError::ActionFailed(format!("{}: {}", self.template_path, e)))?;
        debug!(template = %self.template_path, "Appended template to active file");
        Ok(ActionOutcome::Replace(String::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entities_host::{HostContext, MemoryVault, VaultTemplateEngine};

    fn templates() -> Vec<EntityCreationTemplate> {
        vec![
            EntityCreationTemplate {
                engine: TemplateEngine::Templater,
                template_path: "Templates/Person.md".to_string(),
                entity_name: "Person".to_string(),
            },
            EntityCreationTemplate {
                engine: TemplateEngine::Core,
                template_path: "Templates/Core.md".to_string(),
                entity_name: "Thing".to_string(),
            },
        ]
    }

    fn context(vault: Arc<MemoryVault>, with_bridge: bool) -> ProviderContext {
        let mut host = HostContext::new(vault.clone());
        if with_bridge {
            host = host.with_templates(Arc::new(VaultTemplateEngine::new(vault)));
        }
        ProviderContext::new(Arc::new(host))
    }

    #[test]
    fn test_only_templater_templates_are_offered() {
        let vault = Arc::new(MemoryVault::new());
        let instantiator = TemplateInstantiator::new(&context(vault, true), "folder", None, &templates());
        let items = instantiator.suggestions(&templates(), "Grace", "user");

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].suggestion_text, "New Person: Grace");
        assert_eq!(items[0].replacement_text.as_deref(), Some("[[Grace]]"));
        assert!(items[0].action.is_some());
    }

    #[test]
    fn test_no_suggestions_without_bridge_or_name() {
        let vault = Arc::new(MemoryVault::new());
        let without = TemplateInstantiator::new(&context(vault.clone(), false), "folder", None, &templates());
        assert!(!without.is_available());
        assert!(without.suggestions(&templates(), "Grace", "").is_empty());

        let with = TemplateInstantiator::new(&context(vault, true), "folder", None, &templates());
        assert!(with.suggestions(&templates(), "   ", "").is_empty());
    }

    #[tokio::test]
    async fn test_create_action_links_to_new_note() {
        let vault = Arc::new(MemoryVault::new());
        vault.upsert("Templates/Person.md", "# {{title}}");
        let instantiator =
            TemplateInstantiator::new(
            &context(vault.clone(), true),
            "folder",
            Some("People".to_string()),
            &templates(),
        );

        let action = instantiator
            .create_action("Templates/Person.md", "Grace")
            .unwrap();
        let outcome = action.run().await.unwrap();

        assert_eq!(outcome, ActionOutcome::Replace("[[Grace]]".to_string()));
        assert_eq!(vault.read("People/Grace.md").unwrap(), "# Grace");
    }

    #[tokio::test]
    async fn test_create_action_propagates_missing_template() {
        let vault = Arc::new(MemoryVault::new());
        let instantiator = TemplateInstantiator::new(&context(vault, true), "folder", None, &templates());
        let action = instantiator.create_action("Templates/Missing.md", "X").unwrap();
        let err = action.run().await.unwrap_err();
        assert!(matches!(err, EntitiesError::ActionFailed(ref m) if m.starts_with("Templates/Missing.md")));
    }

    #[test]
    fn test_status_reports_missing_bridge_for_templater_templates() {
        let vault = Arc::new(MemoryVault::new());
        let without = TemplateInstantiator::new(&context(vault.clone(), false), "folder", None, &templates());
        assert!(matches!(without.check(), Err(EntitiesError::DependencyMissing(_))));
        assert_eq!(without.status(), ProviderStatus::missing(TEMPLATE_BRIDGE));

        let core_only: Vec<_> = templates()
            .into_iter()
            .filter(|t| t.engine == TemplateEngine::Core)
            .collect();
        let unneeded = TemplateInstantiator::new(&context(vault.clone(), false), "folder", None, &core_only);
        assert!(unneeded.status().is_ready());

        let with = TemplateInstantiator::new(&context(vault, true), "folder", None, &templates());
        assert!(with.status().is_ready());
    }
}
