//! Built-in providers and their registration records.

pub mod character;
pub mod dataview;
pub mod date;
pub mod file_class;
pub mod folder;
pub mod helper;
pub mod template;

pub use character::{CharacterDictionary, CharacterEntry, CharacterProvider};
pub use dataview::DataviewProvider;
pub use date::DateProvider;
pub use file_class::FileClassProvider;
pub use folder::FolderProvider;
pub use helper::HelperProvider;
pub use template::{TemplateMode, TemplateProvider};

use crate::error::EntitiesError;
use crate::provider::{EntityProvider, ProviderDescriptor};
use crate::settings::{
    type_ids, CharacterProviderSettings, DataviewProviderSettings, DateProviderSettings,
    FileClassProviderSettings, FolderProviderSettings, HelperProviderSettings,
    ProviderConfiguration, TemplateProviderSettings,
};
use std::sync::Arc;

fn mismatch(expected: &str, config: &ProviderConfiguration) -> EntitiesError {
    EntitiesError::invalid_settings(
        expected,
        format!("received {} configuration", config.provider_type_id()),
    )
}

fn shared<P: EntityProvider + 'static>(provider: P) -> Arc<dyn EntityProvider> {
    Arc::new(provider)
}

/// Descriptors for every provider type shipped with the crate
pub fn builtin_descriptors() -> Vec<ProviderDescriptor> {
    vec![
        ProviderDescriptor::new(
            type_ids::FOLDER,
            "Folder",
            "Notes inside a folder, linked by name or alias",
            || ProviderConfiguration::Folder(FolderProviderSettings::default()),
            |config, context| match config.normalized()? {
                ProviderConfiguration::Folder(settings) => {
                    Ok(shared(FolderProvider::new(settings, context)))
                }
                other => Err(mismatch(type_ids::FOLDER, &other)),
            },
        ),
        ProviderDescriptor::new(
            type_ids::DATAVIEW,
            "Dataview",
            "Pages returned by a query source",
            || ProviderConfiguration::Dataview(DataviewProviderSettings::default()),
            |config, context| match config.normalized()? {
                ProviderConfiguration::Dataview(settings) => {
                    Ok(shared(DataviewProvider::new(settings, context)))
                }
                other => Err(mismatch(type_ids::DATAVIEW, &other)),
            },
        ),
        ProviderDescriptor::new(
            type_ids::NOTE_FROM_TEMPLATE,
            "New note from template",
            "Create a note named after the query from a template",
            || ProviderConfiguration::NoteFromTemplate(TemplateProviderSettings::default()),
            |config, context| match config.normalized()? {
                ProviderConfiguration::NoteFromTemplate(settings) => Ok(shared(
                    TemplateProvider::new(settings, TemplateMode::NoteFromTemplate, context),
                )),
                other => Err(mismatch(type_ids::NOTE_FROM_TEMPLATE, &other)),
            },
        ),
        ProviderDescriptor::new(
            type_ids::INSERT_TEMPLATE,
            "Insert template",
            "Append a template to the active note",
            || ProviderConfiguration::InsertTemplate(TemplateProviderSettings::default()),
            |config, context| match config.normalized()? {
                ProviderConfiguration::InsertTemplate(settings) => Ok(shared(
                    TemplateProvider::new(settings, TemplateMode::InsertTemplate, context),
                )),
                other => Err(mismatch(type_ids::INSERT_TEMPLATE, &other)),
            },
        ),
        ProviderDescriptor::new(
            type_ids::CHARACTER,
            "Characters",
            "Emoji and Font Awesome glyphs by keyword",
            || ProviderConfiguration::Character(CharacterProviderSettings::default()),
            |config, _context| match config.normalized()? {
                ProviderConfiguration::Character(settings) => {
                    Ok(shared(CharacterProvider::new(settings)?))
                }
                other => Err(mismatch(type_ids::CHARACTER, &other)),
            },
        ),
        ProviderDescriptor::new(
            type_ids::DATE,
            "Dates",
            "Relative dates, weekdays and ISO weeks",
            || ProviderConfiguration::Date(DateProviderSettings::default()),
            |config, context| match config.normalized()? {
                ProviderConfiguration::Date(settings) => {
                    Ok(shared(DateProvider::new(settings, context)?))
                }
                other => Err(mismatch(type_ids::DATE, &other)),
            },
        ),
        ProviderDescriptor::new(
            type_ids::HELPER,
            "Helpers",
            "Checkboxes and callouts",
            || ProviderConfiguration::Helper(HelperProviderSettings::default()),
            |config, _context| match config.normalized()? {
                ProviderConfiguration::Helper(settings) => Ok(shared(HelperProvider::new(settings))),
                other => Err(mismatch(type_ids::HELPER, &other)),
            },
        ),
        ProviderDescriptor::new(
            type_ids::FILE_CLASS,
            "File class",
            "Notes of a metadata-schema class",
            || ProviderConfiguration::FileClass(FileClassProviderSettings::default()),
            |config, context| match config.normalized()? {
                ProviderConfiguration::FileClass(settings) => {
                    Ok(shared(FileClassProvider::new(settings, context)?))
                }
                other => Err(mismatch(type_ids::FILE_CLASS, &other)),
            },
        ),
    ]
}
