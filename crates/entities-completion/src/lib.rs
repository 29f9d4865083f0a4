//! Entities suggestion engine
//!
//! Typing a trigger character (`@`, `:`, `/`, ...) in a note opens a popup fed
//! by pluggable entity providers: notes in a folder, emoji and glyph
//! dictionaries, dates, checkbox and callout snippets, templates, and bridges
//! to optional host plugins.
//!
//! # Architecture
//!
//! 1. **Settings**: [`PluginSettings`] holds the list of [`ProviderConfiguration`]s,
//!    a tagged union keyed by `providerTypeID`
//! 2. **Registry**: [`ProviderRegistry`] maps type identifiers to
//!    [`ProviderDescriptor`]s and builds one [`EntityProvider`] per enabled entry
//! 3. **Controller**: [`EntitiesSuggestor`] detects triggers, asks the matching
//!    providers for candidates under their [`RefreshBehavior`], merges and
//!    filters them, and applies a selection to the editor
//! 4. **Template instantiation**: [`TemplateInstantiator`] turns configured
//!    creation templates into "New <entity>" suggestions whose action creates the note
//!
//! [`EntitiesPlugin`] ties these together for one plugin lifetime.
//!
//! # Example
//!
//! ```ignore
//! use entities_completion::*;
//! use entities_host::*;
//! use std::sync::Arc;
//!
//! let host = Arc::new(HostContext::new(Arc::new(MemoryVault::new())));
//! let mut plugin = EntitiesPlugin::load(host, Arc::new(MemoryDataStore::new()))?;
//!
//! let mut editor = MemoryEditor::with_cursor_at_end("feeling :smil");
//! let suggestor = plugin.suggestor_mut();
//! if let Some(info) = suggestor.on_editor_change(&editor) {
//!     let items = suggestor.get_suggestions(&info.query);
//!     suggestor.select_suggestion(&items[0], &mut editor).await;
//! }
//! ```
pub mod error;
pub mod plugin;
pub mod provider;
pub mod providers;
pub mod registry;
pub mod settings;
pub mod suggestor;
pub mod template;
pub mod types;

pub use error::{EntitiesError, EntitiesResult};
pub use plugin::EntitiesPlugin;
pub use provider::{EntityProvider, ProviderContext, ProviderDescriptor, ProviderFactory};
pub use providers::{
    builtin_descriptors, CharacterDictionary, CharacterEntry, CharacterProvider,
    DataviewProvider, DateProvider, FileClassProvider, FolderProvider, HelperProvider,
    TemplateMode, TemplateProvider,
};
pub use registry::{InstantiationReport, ProviderRegistry, SkippedProvider};
pub use settings::{
    CharacterProviderSettings, DataviewProviderSettings, DateProviderSettings,
    EntityCreationTemplate, EntityProviderUserSettings, FileClassProviderSettings,
    FolderProviderSettings, HelperProviderSettings, PluginSettings, ProviderConfiguration,
    SettingsFormat, TemplateEngine, TemplateProviderSettings,
};
pub use suggestor::{
    detect_trigger, ActionResult, EntitiesSuggestor, RenderedSuggestion, SelectionOutcome,
    SuggestionGlyph, SuggestorOptions, SuggestorState, TriggerInfo,
};
pub use template::{AppendTemplateAction, CreateFromTemplateAction, TemplateInstantiator};
pub use types::*;
