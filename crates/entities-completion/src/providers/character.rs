//! Emoji and Font Awesome glyphs looked up by keyword.
//!
//! Dictionaries map a normalized keyword to the entries filed under it. They
//! are built once when the provider is constructed; lookup is a scan that
//! keeps dictionary order, then entry order.

use crate::error::{EntitiesError, EntitiesResult};
use crate::settings::{type_ids, CharacterProviderSettings, EntityProviderUserSettings};
use crate::provider::EntityProvider;
use crate::types::{EntitySuggestionItem, RefreshBehavior, TriggerCharacter};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

static FONT_AWESOME_DATA: &str = include_str!("../../data/fontawesome.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterEntry {
    pub char: String,
    /// Canonical name
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct FontAwesomeIcon {
    name: String,
    unicode: String,
    #[serde(default)]
    terms: Vec<String>,
}

/// Lowercase with underscores as spaces
pub fn normalize_keyword(keyword: &str) -> String {
    keyword.to_lowercase().replace('_', " ")
}

/// Keyword → entries table for one glyph source
#[derive(Debug, Clone, Default)]
pub struct CharacterDictionary {
    source: String,
    entries: IndexMap<String, Vec<CharacterEntry>>,
}

impl CharacterDictionary {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            entries: IndexMap::new(),
        }
    }

    pub fn from_entries(
        source: impl Into<String>,
        entries: impl IntoIterator<Item = (String, Vec<CharacterEntry>)>,
    ) -> Self {
        let mut dictionary = Self::new(source);
        for (keyword, list) in entries {
            for entry in list {
                dictionary.insert(&keyword, entry);
            }
        }
        dictionary
    }

    pub fn insert(&mut self, keyword: &str, entry: CharacterEntry) {
        self.entries
            .entry(normalize_keyword(keyword))
            .or_default()
            .push(entry);
    }

    /// Emoji table from the unicode data bundled with the `emojis` crate
    ///
    /// The CLDR name is canonical, GitHub shortcodes are synonyms.
    pub fn emoji() -> Self {
        let mut dictionary = Self::new("emoji");
        for emoji in emojis::iter() {
            let entry = CharacterEntry {
                char: emoji.as_str().to_string(),
                name: emoji.name().to_string(),
            };
            dictionary.insert(emoji.name(), entry.clone());
            for shortcode in emoji.shortcodes() {
                if normalize_keyword(shortcode) != normalize_keyword(emoji.name()) {
                    dictionary.insert(shortcode, entry.clone());
                }
            }
        }
        dictionary
    }

    pub fn font_awesome() -> EntitiesResult<Self> {
        let icons: Vec<FontAwesomeIcon> = serde_json::from_str(FONT_AWESOME_DATA)?;
        let mut dictionary = Self::new("fontawesome");

        for icon in icons {
            let code = u32::from_str_radix(&icon.unicode, 16)
                .ok()
                .and_then(char::from_u32)
                .ok_or_else(|| {
                    EntitiesError::invalid_settings(
                        type_ids::CHARACTER,
                        format!("invalid glyph code {} for {}", icon.unicode, icon.name),
                    )
                })?;
            let entry = CharacterEntry {
                char: code.to_string(),
                name: icon.name.clone(),
            };
            dictionary.insert(&icon.name, entry.clone());
            for term in &icon.terms {
                dictionary.insert(term, entry.clone());
            }
        }
        Ok(dictionary)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every entry filed under a keyword containing `query`
    pub fn lookup(&self, query: &str) -> Vec<EntitySuggestionItem> {
        let query = query.to_lowercase();
        self.entries
            .iter()
            .filter(|(keyword, _)| keyword.contains(&query))
            .flat_map(|(keyword, entries)| {
                entries.iter().map(move |entry| self.item(keyword, entry))
            })
            .collect()
    }

    fn item(&self, keyword: &str, entry: &CharacterEntry) -> EntitySuggestionItem {
        let label = if normalize_keyword(&entry.name) == keyword {
            format!("{} ({})", entry.name, self.source)
        } else {
            format!("{} ({}) for \"{}\"", entry.name, self.source, keyword)
        };
        EntitySuggestionItem::new(label)
            .with_replacement(entry.char.clone())
            .with_flair(entry.char.clone())
            .with_match(keyword.to_string())
    }
}

pub struct CharacterProvider {
    settings: CharacterProviderSettings,
    dictionaries: Vec<CharacterDictionary>,
}

impl CharacterProvider {
    pub fn new(settings: CharacterProviderSettings) -> EntitiesResult<Self> {
        let mut dictionaries = Vec::new();
        if settings.emoji {
            dictionaries.push(CharacterDictionary::emoji());
        }
        if settings.font_awesome {
            dictionaries.push(CharacterDictionary::font_awesome()?);
        }
        debug!(
            dictionaries = dictionaries.len(),
            keywords = dictionaries.iter().map(CharacterDictionary::len).sum::<usize>(),
            "Character dictionaries built"
        );
        Ok(Self::with_dictionaries(settings, dictionaries))
    }

    pub fn with_dictionaries(
        settings: CharacterProviderSettings,
        dictionaries: Vec<CharacterDictionary>,
    ) -> Self {
        Self {
            settings,
            dictionaries,
        }
    }
}

impl EntityProvider for CharacterProvider {
    fn provider_type_id(&self) -> &str {
        type_ids::CHARACTER
    }

    fn settings(&self) -> &EntityProviderUserSettings {
        &self.settings.common
    }

    fn triggers(&self) -> Vec<TriggerCharacter> {
        vec![TriggerCharacter::Colon]
    }

    fn get_entity_list(
        &self,
        query: &str,
        _trigger: TriggerCharacter,
    ) -> EntitiesResult<Vec<EntitySuggestionItem>> {
        Ok(self
            .dictionaries
            .iter()
            .flat_map(|d| d.lookup(query))
            .collect())
    }

    fn refresh_behavior(&self) -> RefreshBehavior {
        RefreshBehavior::ShouldRefresh
    }

    fn filters_query(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smile_dictionary() -> CharacterDictionary {
        CharacterDictionary::from_entries(
            "custom",
            vec![(
                "smile".to_string(),
                vec![CharacterEntry {
                    char: "😄".to_string(),
                    name: "smile".to_string(),
                }],
            )],
        )
    }

    #[test]
    fn test_substring_case_insensitive_lookup() {
        let dictionary = smile_dictionary();
        let items = dictionary.lookup("SMIL");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].suggestion_text, "smile (custom)");
        assert_eq!(items[0].replacement_text.as_deref(), Some("😄"));
        assert_eq!(items[0].flair.as_deref(), Some("😄"));
        assert!(dictionary.lookup("frown").is_empty());
    }

    #[test]
    fn test_synonym_label() {
        let mut dictionary = CharacterDictionary::new("custom");
        let entry = CharacterEntry {
            char: "🐱".to_string(),
            name: "cat face".to_string(),
        };
        dictionary.insert("cat face", entry.clone());
        dictionary.insert("Kitty_Cat", entry);

        let items = dictionary.lookup("cat");
        let labels: Vec<&str> = items.iter().map(|i| i.suggestion_text.as_str()).collect();
        assert_eq!(
            labels,
            vec!["cat face (custom)", "cat face (custom) for \"kitty cat\""]
        );
    }

    #[test]
    fn test_emoji_dictionary_has_grinning_face() {
        let dictionary = CharacterDictionary::emoji();
        assert!(!dictionary.is_empty());
        let items = dictionary.lookup("grinning face");
        assert!(items.iter().any(|i| i.replacement_text.as_deref() == Some("😀")));
    }

    #[test]
    fn test_font_awesome_table_parses() {
        let dictionary = CharacterDictionary::font_awesome().unwrap();
        let items = dictionary.lookup("home");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].replacement_text.as_deref(), Some("\u{f015}"));
        assert_eq!(items[0].suggestion_text, "house (fontawesome) for \"home\"");
    }

    #[test]
    fn test_provider_scenario() {
        let provider = CharacterProvider::with_dictionaries(
            CharacterProviderSettings::default(),
            vec![smile_dictionary()],
        );
        let items = provider
            .get_entity_list("smile", TriggerCharacter::Colon)
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].replacement_text.as_deref(), Some("😄"));
        assert_eq!(provider.triggers(), vec![TriggerCharacter::Colon]);
    }
}
