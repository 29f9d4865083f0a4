use crate::bridges::{DataviewApi, DateParser, MetadataSchema, TemplateBridge};
use crate::vault::Vault;
use std::fmt;
use std::sync::Arc;

/// Everything the plugin receives from its host
///
/// Bridges are optional: `None` means the corresponding third-party plugin is
/// not installed.
#[derive(Clone)]
pub struct HostContext {
    pub vault: Arc<dyn Vault>,
    pub templates: Option<Arc<dyn TemplateBridge>>,
    pub date_parser: Option<Arc<dyn DateParser>>,
    pub metadata_schema: Option<Arc<dyn MetadataSchema>>,
    pub dataview: Option<Arc<dyn DataviewApi>>,
}

impl HostContext {
    pub fn new(vault: Arc<dyn Vault>) -> Self {
        Self {
            vault,
            templates: None,
            date_parser: None,
            metadata_schema: None,
            dataview: None,
        }
    }

    pub fn with_templates(mut self, bridge: Arc<dyn TemplateBridge>) -> Self {
        self.templates = Some(bridge);
        self
    }

    pub fn with_date_parser(mut self, parser: Arc<dyn DateParser>) -> Self {
        self.date_parser = Some(parser);
        self
    }

    pub fn with_metadata_schema(mut self, schema: Arc<dyn MetadataSchema>) -> Self {
        self.metadata_schema = Some(schema);
        self
    }

    pub fn with_dataview(mut self, api: Arc<dyn DataviewApi>) -> Self {
        self.dataview = Some(api);
        self
    }
}

impl fmt::Debug for HostContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostContext")
            .field("templates", &self.templates.is_some())
            .field("date_parser", &self.date_parser.is_some())
            .field("metadata_schema", &self.metadata_schema.is_some())
            .field("dataview", &self.dataview.is_some())
            .finish_non_exhaustive()
    }
}
