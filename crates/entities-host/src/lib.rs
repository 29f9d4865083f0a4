//! Host collaborators for the Entities suggestion engine
//!
//! The suggestion engine never talks to the note-taking application directly.
//! It consumes the traits in this crate:
//!
//! - [`Editor`]: cursor and line access plus range replacement
//! - [`Vault`]: file/folder lookup and the frontmatter cache
//! - [`TemplateBridge`], [`DateParser`], [`MetadataSchema`], [`DataviewApi`]:
//!   optional third-party plugins
//! - [`PluginDataStore`]: whole-object settings persistence
//!
//! In-process implementations ([`MemoryEditor`], [`MemoryVault`],
//! [`VaultTemplateEngine`], [`NaturalDateParser`], [`VaultDataview`],
//! [`JsonFileDataStore`]) back the CLI harness and the test suites.

pub mod bridges;
pub mod context;
pub mod dataview;
pub mod date_parser;
pub mod editor;
pub mod error;
pub mod store;
pub mod template_engine;
pub mod vault;

pub use bridges::{
    DataviewApi, DateParser, FileClass, MetadataSchema, ParsedDate, StaticMetadataSchema,
    TemplateBridge,
};
pub use context::HostContext;
pub use dataview::VaultDataview;
pub use date_parser::NaturalDateParser;
pub use editor::{Editor, EditorPosition, MemoryEditor};
pub use error::{HostError, HostResult};
pub use store::{JsonFileDataStore, MemoryDataStore, PluginDataStore};
pub use template_engine::VaultTemplateEngine;
pub use vault::{normalize_path, FileCache, MemoryVault, Vault, VaultEntry, VaultFile, VaultFolder};
