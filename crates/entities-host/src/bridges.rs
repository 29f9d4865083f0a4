//! Interfaces to optional third-party host plugins.
//!
//! Each bridge may be absent at runtime. Consumers hold an
//! `Option<Arc<dyn Bridge>>` resolved once when they are constructed.

use crate::error::HostResult;
use crate::vault::VaultFile;
use async_trait::async_trait;
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Template-expansion plugin
#[async_trait]
pub trait TemplateBridge: Send + Sync {
    /// Create a note named `new_name` inside `target_folder` (vault root when
    /// `None`) from the template at `template_path`.
    async fn create_new_note_from_template(
        &self,
        template_path: &str,
        target_folder: Option<&str>,
        new_name: &str,
        open_after: bool,
    ) -> HostResult<Option<VaultFile>>;

    /// Expand the template at `template_path` at the end of the active file
    async fn append_template_to_active_file(&self, template_path: &str) -> HostResult<()>;
}

/// Result of a natural-language date parse
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDate {
    /// The date already rendered in the parser's configured format
    pub formatted_string: String,
    pub date: NaiveDate,
}

/// Natural-language date parsing plugin
pub trait DateParser: Send + Sync {
    fn parse_date(&self, text: &str) -> Option<ParsedDate>;
}

/// A class definition from the metadata-schema plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileClass {
    pub name: String,
    /// Template used for new notes of this class
    #[serde(default)]
    pub template_path: Option<String>,
    /// Folder new notes of this class are created in
    #[serde(default)]
    pub folder: Option<String>,
}

/// Metadata-schema plugin (file classes)
pub trait MetadataSchema: Send + Sync {
    /// Read-only snapshot of the known file classes, keyed by name
    fn file_classes(&self) -> IndexMap<String, FileClass>;
}

/// Query plugin returning pages for a source expression
pub trait DataviewApi: Send + Sync {
    fn pages(&self, source: &str) -> HostResult<Vec<VaultFile>>;
}

/// Fixed metadata schema, used when the host exposes classes as plain data
#[derive(Debug, Clone, Default)]
pub struct StaticMetadataSchema {
    classes: IndexMap<String, FileClass>,
}

impl StaticMetadataSchema {
    pub fn new(classes: impl IntoIterator<Item = FileClass>) -> Self {
        Self {
            classes: classes
                .into_iter()
                .map(|class| (class.name.clone(), class))
                .collect(),
        }
    }
}

impl MetadataSchema for StaticMetadataSchema {
    fn file_classes(&self) -> IndexMap<String, FileClass> {
        self.classes.clone()
    }
}
