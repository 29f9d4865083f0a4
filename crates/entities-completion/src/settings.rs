//! Persisted configuration: per-provider settings and the whole plugin object.
//!
//! [`ProviderConfiguration`] is keyed by `providerTypeID`. Entries whose type
//! the built-in schema does not know, or whose payload does not parse, are
//! kept as [`ProviderConfiguration::Custom`] so that a settings load never
//! fails because of a single entry and so they survive a save.

use crate::error::{EntitiesError, EntitiesResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::warn;

/// Key naming the provider type inside a configuration object
pub const PROVIDER_TYPE_KEY: &str = "providerTypeID";

/// Built-in provider type identifiers
pub mod type_ids {
    pub const FOLDER: &str = "folder";
    pub const DATAVIEW: &str = "dataview";
    pub const NOTE_FROM_TEMPLATE: &str = "noteFromTemplate";
    pub const INSERT_TEMPLATE: &str = "insertTemplate";
    pub const CHARACTER: &str = "character";
    pub const DATE: &str = "date";
    pub const HELPER: &str = "helper";
    pub const FILE_CLASS: &str = "fileClass";
}

/// Template-expansion engine a creation template is written for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TemplateEngine {
    /// The template-expansion bridge plugin
    Templater,
    /// The host's built-in template inserter (not supported for creation)
    Core,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityCreationTemplate {
    pub engine: TemplateEngine,
    pub template_path: String,
    /// Human name of the entity kind ("Person", "Project")
    pub entity_name: String,
}

/// Settings every provider carries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntityProviderUserSettings {
    pub enabled: bool,
    pub icon: String,
    pub entity_creation_templates: Vec<EntityCreationTemplate>,
}

impl Default for EntityProviderUserSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            icon: String::new(),
            entity_creation_templates: Vec::new(),
        }
    }
}

impl EntityProviderUserSettings {
    pub fn with_icon(icon: &str) -> Self {
        Self {
            icon: icon.to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FolderProviderSettings {
    #[serde(flatten)]
    pub common: EntityProviderUserSettings,
    /// Vault-relative folder path
    pub path: String,
    pub recursive: bool,
    /// Also suggest frontmatter `aliases`
    pub include_aliases: bool,
}

impl Default for FolderProviderSettings {
    fn default() -> Self {
        Self {
            common: EntityProviderUserSettings::with_icon("folder"),
            path: String::new(),
            recursive: false,
            include_aliases: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DataviewProviderSettings {
    #[serde(flatten)]
    pub common: EntityProviderUserSettings,
    /// Page source expression (`#tag`, `"folder"`)
    pub query: String,
}

impl Default for DataviewProviderSettings {
    fn default() -> Self {
        Self {
            common: EntityProviderUserSettings::with_icon("database"),
            query: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TemplateProviderSettings {
    #[serde(flatten)]
    pub common: EntityProviderUserSettings,
    pub templates_folder: String,
    /// Where notes created from a template land (vault root when unset)
    pub target_folder: Option<String>,
}

impl Default for TemplateProviderSettings {
    fn default() -> Self {
        Self {
            common: EntityProviderUserSettings::with_icon("file-plus"),
            templates_folder: "Templates".to_string(),
            target_folder: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CharacterProviderSettings {
    #[serde(flatten)]
    pub common: EntityProviderUserSettings,
    pub emoji: bool,
    pub font_awesome: bool,
}

impl Default for CharacterProviderSettings {
    fn default() -> Self {
        Self {
            common: EntityProviderUserSettings::with_icon("smile"),
            emoji: true,
            font_awesome: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DateProviderSettings {
    #[serde(flatten)]
    pub common: EntityProviderUserSettings,
    /// chrono format string for inserted dates
    pub date_format: String,
    /// Insert dates as `[[...]]` links
    pub wrap_links: bool,
    pub iso_weeks: bool,
}

impl Default for DateProviderSettings {
    fn default() -> Self {
        Self {
            common: EntityProviderUserSettings::with_icon("calendar"),
            date_format: "%Y-%m-%d".to_string(),
            wrap_links: true,
            iso_weeks: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HelperProviderSettings {
    #[serde(flatten)]
    pub common: EntityProviderUserSettings,
    pub checkboxes: bool,
    pub callouts: bool,
}

impl Default for HelperProviderSettings {
    fn default() -> Self {
        Self {
            common: EntityProviderUserSettings::with_icon("wand"),
            checkboxes: true,
            callouts: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileClassProviderSettings {
    #[serde(flatten)]
    pub common: EntityProviderUserSettings,
    pub file_class: String,
    /// Frontmatter key holding a note's class
    pub field_name: String,
}

impl Default for FileClassProviderSettings {
    fn default() -> Self {
        Self {
            common: EntityProviderUserSettings::with_icon("tags"),
            file_class: String::new(),
            field_name: "fileClass".to_string(),
        }
    }
}

/// All providers the user has configured, one variant per provider type
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderConfiguration {
    Folder(FolderProviderSettings),
    Dataview(DataviewProviderSettings),
    NoteFromTemplate(TemplateProviderSettings),
    InsertTemplate(TemplateProviderSettings),
    Character(CharacterProviderSettings),
    Date(DateProviderSettings),
    Helper(HelperProviderSettings),
    FileClass(FileClassProviderSettings),
    /// A type outside the built-in schema, kept verbatim
    Custom {
        provider_type_id: String,
        settings: Map<String, Value>,
    },
}

impl ProviderConfiguration {
    pub fn provider_type_id(&self) -> &str {
        match self {
            Self::Folder(_) => type_ids::FOLDER,
            Self::Dataview(_) => type_ids::DATAVIEW,
            Self::NoteFromTemplate(_) => type_ids::NOTE_FROM_TEMPLATE,
            Self::InsertTemplate(_) => type_ids::INSERT_TEMPLATE,
            Self::Character(_) => type_ids::CHARACTER,
            Self::Date(_) => type_ids::DATE,
            Self::Helper(_) => type_ids::HELPER,
            Self::FileClass(_) => type_ids::FILE_CLASS,
            Self::Custom {
                provider_type_id, ..
            } => provider_type_id,
        }
    }

    /// Common settings for built-in variants
    pub fn common(&self) -> Option<&EntityProviderUserSettings> {
        match self {
            Self::Folder(s) => Some(&s.common),
            Self::Dataview(s) => Some(&s.common),
            Self::NoteFromTemplate(s) | Self::InsertTemplate(s) => Some(&s.common),
            Self::Character(s) => Some(&s.common),
            Self::Date(s) => Some(&s.common),
            Self::Helper(s) => Some(&s.common),
            Self::FileClass(s) => Some(&s.common),
            Self::Custom { .. } => None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        match self {
            Self::Custom { settings, .. } => settings
                .get("enabled")
                .and_then(Value::as_bool)
                .unwrap_or(true),
            other => other.common().map(|c| c.enabled).unwrap_or(true),
        }
    }

    /// Parse one configuration object
    ///
    /// Unknown type identifiers become [`ProviderConfiguration::Custom`]; a
    /// known identifier with a malformed payload is an error.
    pub fn from_value(value: Value) -> EntitiesResult<Self> {
        let Value::Object(mut map) = value else {
            return Err(EntitiesError::invalid_settings(
                "<unknown>",
                "provider configuration must be an object",
            ));
        };

        let provider_type_id = match map.remove(PROVIDER_TYPE_KEY) {
            Some(Value::String(id)) if !id.is_empty() => id,
            _ => {
                return Err(EntitiesError::invalid_settings(
                    "<unknown>",
                    format!("missing {}", PROVIDER_TYPE_KEY),
                ))
            }
        };

        let payload = Value::Object(map.clone());
        let config = match provider_type_id.as_str() {
            type_ids::FOLDER => Self::Folder(parse_payload(&provider_type_id, payload)?),
            type_ids::DATAVIEW => Self::Dataview(parse_payload(&provider_type_id, payload)?),
            type_ids::NOTE_FROM_TEMPLATE => {
                Self::NoteFromTemplate(parse_payload(&provider_type_id, payload)?)
            }
            type_ids::INSERT_TEMPLATE => {
                Self::InsertTemplate(parse_payload(&provider_type_id, payload)?)
            }
            type_ids::CHARACTER => Self::Character(parse_payload(&provider_type_id, payload)?),
            type_ids::DATE => Self::Date(parse_payload(&provider_type_id, payload)?),
            type_ids::HELPER => Self::Helper(parse_payload(&provider_type_id, payload)?),
            type_ids::FILE_CLASS => Self::FileClass(parse_payload(&provider_type_id, payload)?),
            _ => Self::Custom {
                provider_type_id,
                settings: map,
            },
        };
        Ok(config)
    }

    pub fn to_value(&self) -> EntitiesResult<Value> {
        let payload = match self {
            Self::Folder(s) => serde_json::to_value(s)?,
            Self::Dataview(s) => serde_json::to_value(s)?,
            Self::NoteFromTemplate(s) | Self::InsertTemplate(s) => serde_json::to_value(s)?,
            Self::Character(s) => serde_json::to_value(s)?,
            Self::Date(s) => serde_json::to_value(s)?,
            Self::Helper(s) => serde_json::to_value(s)?,
            Self::FileClass(s) => serde_json::to_value(s)?,
            Self::Custom { settings, .. } => Value::Object(settings.clone()),
        };

        let mut map = match payload {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        map.insert(
            PROVIDER_TYPE_KEY.to_string(),
            Value::String(self.provider_type_id().to_string()),
        );
        Ok(Value::Object(map))
    }

    /// Re-parse a `Custom` entry whose identifier is a built-in type
    ///
    /// Returns the typed variant, the entry unchanged for foreign types, or the
    /// payload error for built-in types whose settings are malformed.
    pub fn normalized(&self) -> EntitiesResult<Self> {
        match self {
            Self::Custom { .. } => Self::from_value(self.to_value()?),
            typed => Ok(typed.clone()),
        }
    }
}

fn parse_payload<T: DeserializeOwned>(provider_type_id: &str, payload: Value) -> EntitiesResult<T> {
    serde_json::from_value(payload)
        .map_err(|e| EntitiesError::invalid_settings(provider_type_id, e.to_string()))
}

impl Serialize for ProviderConfiguration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value = self
            .to_value()
            .map_err(<S::Error as serde::ser::Error>::custom)?;
        value.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ProviderConfiguration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(serde::de::Error::custom)
    }
}

/// The whole persisted plugin object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PluginSettings {
    #[serde(deserialize_with = "deserialize_providers_lenient")]
    pub providers: Vec<ProviderConfiguration>,
    /// Window during which `Default` providers are not recomputed
    pub debounce_ms: u64,
    /// Cap on the merged suggestion list
    pub max_suggestions: usize,
    /// Open notes created from creation-templates
    pub open_created_notes: bool,
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            providers: vec![
                ProviderConfiguration::Character(CharacterProviderSettings::default()),
                ProviderConfiguration::Date(DateProviderSettings::default()),
                ProviderConfiguration::Helper(HelperProviderSettings::default()),
            ],
            debounce_ms: 200,
            max_suggestions: 100,
            open_created_notes: false,
        }
    }
}

impl PluginSettings {
    /// Merge a stored object (if any) over the defaults
    pub fn from_stored(data: Option<Value>) -> EntitiesResult<Self> {
        match data {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(value) => Ok(serde_json::from_value(value)?),
        }
    }

    pub fn to_value(&self) -> EntitiesResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn load_from_string(content: &str, format: SettingsFormat) -> EntitiesResult<Self> {
        let settings = match format {
            SettingsFormat::Yaml => serde_yaml::from_str(content)?,
            SettingsFormat::Json => serde_json::from_str(content)?,
        };
        Ok(settings)
    }

    /// Load a settings file, choosing the format by extension
    pub fn load_from_file(path: &Path) -> EntitiesResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::load_from_string(&content, SettingsFormat::from_path(path))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsFormat {
    Yaml,
    Json,
}

impl SettingsFormat {
    /// `.yaml`/`.yml` are YAML, everything else JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::Yaml
            }
            _ => Self::Json,
        }
    }
}

fn deserialize_providers_lenient<'de, D>(deserializer: D) -> Result<Vec<ProviderConfiguration>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<Value>::deserialize(deserializer)?;
    let mut providers = Vec::with_capacity(raw.len());

    for (index, value) in raw.into_iter().enumerate() {
        match ProviderConfiguration::from_value(value.clone()) {
            Ok(config) => providers.push(config),
            Err(e) => {
                warn!(index, error = %e, "Keeping unparseable provider configuration verbatim");
                let mut settings = match value {
                    Value::Object(map) => map,
                    _ => Map::new(),
                };
                let provider_type_id = match settings.remove(PROVIDER_TYPE_KEY) {
                    Some(Value::String(id)) => id,
                    _ => String::new(),
                };
                providers.push(ProviderConfiguration::Custom {
                    provider_type_id,
                    settings,
                });
            }
        }
    }

    Ok(providers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_folder_configuration() {
        let config = ProviderConfiguration::from_value(json!({
            "providerTypeID": "folder",
            "path": "People",
            "icon": "user",
        }))
        .unwrap();

        let ProviderConfiguration::Folder(settings) = &config else {
            panic!("expected folder configuration");
        };
        assert_eq!(settings.path, "People");
        assert_eq!(settings.common.icon, "user");
        assert!(settings.common.enabled);
        assert!(settings.include_aliases);
        assert_eq!(config.provider_type_id(), "folder");
    }

    #[test]
    fn test_unknown_type_becomes_custom() {
        let config = ProviderConfiguration::from_value(json!({
            "providerTypeID": "zotero",
            "library": "main",
            "enabled": false,
        }))
        .unwrap();

        assert_eq!(config.provider_type_id(), "zotero");
        assert!(!config.is_enabled());
        let value = config.to_value().unwrap();
        assert_eq!(value["library"], "main");
        assert_eq!(value["providerTypeID"], "zotero");
    }

    #[test]
    fn test_malformed_known_type_is_error() {
        let result = ProviderConfiguration::from_value(json!({
            "providerTypeID": "folder",
            "path": 42,
        }));
        assert!(matches!(result, Err(EntitiesError::InvalidSettings { .. })));
    }

    #[test]
    fn test_missing_type_id_is_error() {
        assert!(ProviderConfiguration::from_value(json!({"path": "x"})).is_err());
        assert!(ProviderConfiguration::from_value(json!("folder")).is_err());
    }

    #[test]
    fn test_serialized_shape() {
        let config = ProviderConfiguration::InsertTemplate(TemplateProviderSettings::default());
        let value = config.to_value().unwrap();
        assert_eq!(value["providerTypeID"], "insertTemplate");
        assert_eq!(value["templatesFolder"], "Templates");
        assert_eq!(value["enabled"], true);
        assert_eq!(value["entityCreationTemplates"], json!([]));
    }

    #[test]
    fn test_plugin_settings_merge_with_defaults() {
        let settings = PluginSettings::from_stored(Some(json!({"debounceMs": 50}))).unwrap();
        assert_eq!(settings.debounce_ms, 50);
        assert_eq!(settings.max_suggestions, 100);
        assert_eq!(settings.providers.len(), 3);

        let empty = PluginSettings::from_stored(None).unwrap();
        assert_eq!(empty, PluginSettings::default());
    }

    #[test]
    fn test_plugin_settings_keep_malformed_entries() {
        let settings = PluginSettings::from_stored(Some(json!({
            "providers": [
                {"providerTypeID": "folder", "path": 42},
                {"providerTypeID": "helper", "callouts": false},
            ]
        })))
        .unwrap();

        assert_eq!(settings.providers.len(), 2);
        assert!(matches!(settings.providers[0], ProviderConfiguration::Custom { .. }));
        assert!(settings.providers[0].normalized().is_err());
        let ProviderConfiguration::Helper(helper) = &settings.providers[1] else {
            panic!("expected helper configuration");
        };
        assert!(!helper.callouts);
        assert!(helper.checkboxes);
    }

    #[test]
    fn test_plugin_settings_yaml() {
        let yaml = r#"
debounceMs: 0
providers:
  - providerTypeID: folder
    path: People
    entityCreationTemplates:
      - engine: templater
        templatePath: Templates/Person.md
        entityName: Person
"#;
        let settings = PluginSettings::load_from_string(yaml, SettingsFormat::Yaml).unwrap();
        assert_eq!(settings.debounce_ms, 0);
        let common = settings.providers[0].common().unwrap();
        assert_eq!(common.entity_creation_templates[0].engine, TemplateEngine::Templater);
        assert_eq!(common.entity_creation_templates[0].entity_name, "Person");
    }

    #[test]
    fn test_load_from_file_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("settings.yml");
        std::fs::write(&yaml, "maxSuggestions: 5\n").unwrap();
        assert_eq!(PluginSettings::load_from_file(&yaml).unwrap().max_suggestions, 5);

        let json = dir.path().join("settings.json");
        std::fs::write(&json, r#"{"openCreatedNotes": true}"#).unwrap();
        assert!(PluginSettings::load_from_file(&json).unwrap().open_created_notes);

        assert!(PluginSettings::load_from_file(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_round_trip_through_value() {
        let settings = PluginSettings::default();
        let value = settings.to_value().unwrap();
        assert_eq!(PluginSettings::from_stored(Some(value)).unwrap(), settings);
    }
}
