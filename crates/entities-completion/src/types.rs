//! Core data types shared by providers and the suggestion controller.

use crate::error::EntitiesResult;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// A character that, followed by non-whitespace text, opens the suggestion popup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TriggerCharacter {
    #[default]
    At,
    Colon,
    Slash,
    /// Provider-defined extension
    Other(char),
}

impl TriggerCharacter {
    pub fn as_char(&self) -> char {
        match self {
            Self::At => '@',
            Self::Colon => ':',
            Self::Slash => '/',
            Self::Other(c) => *c,
        }
    }
}

impl From<char> for TriggerCharacter {
    fn from(c: char) -> Self {
        match c {
            '@' => Self::At,
            ':' => Self::Colon,
            '/' => Self::Slash,
            other => Self::Other(other),
        }
    }
}

impl fmt::Display for TriggerCharacter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl Serialize for TriggerCharacter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_char(self.as_char())
    }
}

impl<'de> Deserialize<'de> for TriggerCharacter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let c = char::deserialize(deserializer)?;
        if c.is_whitespace() {
            return Err(serde::de::Error::custom("trigger character cannot be whitespace"));
        }
        Ok(Self::from(c))
    }
}

/// A provider's caching policy for suggestion recomputation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RefreshBehavior {
    /// Recompute on every keystroke (results depend on "now" or on the query)
    ShouldRefresh,
    /// Recompute at most once per debounce window
    #[default]
    Default,
    /// Compute once and keep for the controller's lifetime
    Never,
}

/// Health of a provider's external dependencies, shown in the settings UI
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProviderStatus {
    #[default]
    Ready,
    DependencyMissing { dependency: String },
    /// Settings the provider cannot work with; it suggests nothing
    Misconfigured { reason: String },
}

impl ProviderStatus {
    pub fn missing(dependency: impl Into<String>) -> Self {
        Self::DependencyMissing {
            dependency: dependency.into(),
        }
    }

    pub fn misconfigured(reason: impl Into<String>) -> Self {
        Self::Misconfigured {
            reason: reason.into(),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// What a settled [`SuggestionAction`] asks the controller to insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Insert this text instead of the item's literal replacement
    Replace(String),
    /// Insert the item's literal replacement
    NoOp,
}

/// Side-effecting work attached to a suggestion (note creation, template insertion)
#[async_trait]
pub trait SuggestionAction: Send + Sync {
    async fn run(&self) -> EntitiesResult<ActionOutcome>;
}

/// One candidate shown to the user
#[derive(Clone)]
pub struct EntitySuggestionItem {
    /// Display label, also the text the controller filters on
    pub suggestion_text: String,
    /// Secondary label
    pub note_text: Option<String>,
    /// Inserted text when it differs from `suggestion_text`
    pub replacement_text: Option<String>,
    pub icon: Option<String>,
    /// Literal glyph shown instead of `icon`
    pub flair: Option<String>,
    pub action: Option<Arc<dyn SuggestionAction>>,
    /// Ranking hint; the matched keyword for dictionary lookups
    pub match_hint: Option<String>,
}

impl EntitySuggestionItem {
    pub fn new(suggestion_text: impl Into<String>) -> Self {
        Self {
            suggestion_text: suggestion_text.into(),
            note_text: None,
            replacement_text: None,
            icon: None,
            flair: None,
            action: None,
            match_hint: None,
        }
    }

    pub fn with_note(mut self, note_text: impl Into<String>) -> Self {
        self.note_text = Some(note_text.into());
        self
    }

    pub fn with_replacement(mut self, replacement_text: impl Into<String>) -> Self {
        self.replacement_text = Some(replacement_text.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        let icon = icon.into();
        if !icon.is_empty() {
            self.icon = Some(icon);
        }
        self
    }

    pub fn with_flair(mut self, flair: impl Into<String>) -> Self {
        self.flair = Some(flair.into());
        self
    }

    pub fn with_action(mut self, action: Arc<dyn SuggestionAction>) -> Self {
        self.action = Some(action);
        self
    }

    pub fn with_match(mut self, hint: impl Into<String>) -> Self {
        self.match_hint = Some(hint.into());
        self
    }

    /// `replacement_text ?? suggestion_text`
    pub fn insertion_text(&self) -> &str {
        self.replacement_text
            .as_deref()
            .unwrap_or(&self.suggestion_text)
    }
}

impl PartialEq for EntitySuggestionItem {
    fn eq(&self, other: &Self) -> bool {
        let same_action = match (&self.action, &other.action) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        };
        same_action
            && self.suggestion_text == other.suggestion_text
            && self.note_text == other.note_text
            && self.replacement_text == other.replacement_text
            && self.icon == other.icon
            && self.flair == other.flair
            && self.match_hint == other.match_hint
    }
}

impl fmt::Debug for EntitySuggestionItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntitySuggestionItem")
            .field("suggestion_text", &self.suggestion_text)
            .field("note_text", &self.note_text)
            .field("replacement_text", &self.replacement_text)
            .field("icon", &self.icon)
            .field("flair", &self.flair)
            .field("action", &self.action.is_some())
            .field("match_hint", &self.match_hint)
            .finish()
    }
}

/// Wiki-style link, with an optional display alias after `|`
pub fn wikilink(target: &str, alias: Option<&str>) -> String {
    match alias {
        Some(alias) if alias != target => format!("[[{}|{}]]", target, alias),
        _ => format!("[[{}]]", target),
    }
}
