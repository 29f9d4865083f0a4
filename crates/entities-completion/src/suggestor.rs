//! The suggestion controller.
//!
//! `Idle → Triggered → Idle`. [`EntitiesSuggestor::on_trigger`] opens a
//! suggestion cycle when the text before the cursor ends in a trigger character
//! followed by non-whitespace; [`EntitiesSuggestor::select_suggestion`] and
//! [`EntitiesSuggestor::close`] end it.
//!
//! Raw provider results are cached per provider for the lifetime of the loaded
//! provider set, according to each provider's [`RefreshBehavior`]. Query
//! filtering happens on every call, so a cached list stays usable while the
//! user keeps typing.
//!
//! A selection awaits the item's action before editing. The replaced span is
//! the one captured by the last `on_trigger`; text typed while the action runs
//! is not re-read, and an action from an earlier cycle can therefore land on a
//! stale span.

use crate::provider::EntityProvider;
use crate::registry::ProviderRegistry;
use crate::settings::PluginSettings;
use crate::types::{ActionOutcome, EntitySuggestionItem, RefreshBehavior, TriggerCharacter};
use entities_host::{Editor, EditorPosition};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// A detected trigger and the query typed after it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerInfo {
    pub trigger: TriggerCharacter,
    /// Position of the trigger character itself
    pub trigger_pos: EditorPosition,
    /// First character after the trigger
    pub start: EditorPosition,
    /// The cursor
    pub end: EditorPosition,
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SuggestorState {
    #[default]
    Idle,
    Triggered(TriggerInfo),
}

/// Glyph slot of a rendered suggestion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionGlyph {
    /// Literal text shown as-is (an emoji)
    Flair(String),
    /// Host icon name
    Icon(String),
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedSuggestion {
    pub glyph: SuggestionGlyph,
    pub title: String,
    pub note: Option<String>,
}

/// How the inserted text was decided
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionResult {
    /// The item had no action
    None,
    Replaced,
    NoOp,
    /// The action failed; the literal replacement was inserted
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionOutcome {
    pub inserted: String,
    pub from: EditorPosition,
    pub cursor: EditorPosition,
    pub action: ActionResult,
}

#[derive(Debug, Clone)]
pub struct SuggestorOptions {
    /// Reuse window for `Default` providers
    pub debounce: Duration,
    pub max_suggestions: usize,
}

impl Default for SuggestorOptions {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(200),
            max_suggestions: 100,
        }
    }
}

impl From<&PluginSettings> for SuggestorOptions {
    fn from(settings: &PluginSettings) -> Self {
        Self {
            debounce: Duration::from_millis(settings.debounce_ms),
            max_suggestions: settings.max_suggestions,
        }
    }
}

#[derive(Default)]
struct ProviderCache {
    items: Option<Vec<EntitySuggestionItem>>,
    trigger: Option<TriggerCharacter>,
    query: String,
    computed_at: Option<Instant>,
}

impl ProviderCache {
    fn reusable(
        &self,
        behavior: RefreshBehavior,
        trigger: TriggerCharacter,
        query: &str,
        query_sensitive: bool,
        debounce: Duration,
    ) -> bool {
        if self.items.is_none() || self.trigger != Some(trigger) {
            return false;
        }
        if query_sensitive && self.query != query {
            return false;
        }
        match behavior {
            RefreshBehavior::Never => true,
            RefreshBehavior::ShouldRefresh => false,
            RefreshBehavior::Default => self
                .computed_at
                .map(|at| at.elapsed() < debounce)
                .unwrap_or(false),
        }
    }
}

/// The autocomplete controller
pub struct EntitiesSuggestor {
    providers: Vec<Arc<dyn EntityProvider>>,
    caches: Vec<ProviderCache>,
    triggers: Vec<TriggerCharacter>,
    generation: Option<u64>,
    state: SuggestorState,
    options: SuggestorOptions,
}

impl EntitiesSuggestor {
    pub fn new(options: SuggestorOptions) -> Self {
        Self {
            providers: Vec::new(),
            caches: Vec::new(),
            triggers: Vec::new(),
            generation: None,
            state: SuggestorState::Idle,
            options,
        }
    }

    pub fn with_providers(providers: Vec<Arc<dyn EntityProvider>>, options: SuggestorOptions) -> Self {
        let mut suggestor = Self::new(options);
        suggestor.set_providers(providers);
        suggestor
    }

    /// Take the registry's current provider list, dropping all caches
    pub fn load_providers(&mut self, registry: &ProviderRegistry) {
        self.set_providers(registry.get_providers().to_vec());
        self.generation = Some(registry.generation());
        debug!(
            generation = registry.generation(),
            providers = self.providers.len(),
            "Suggestor loaded providers"
        );
    }

    /// Whether the registry has moved on since the last load
    pub fn is_stale(&self, registry: &ProviderRegistry) -> bool {
        self.generation != Some(registry.generation())
    }

    fn set_providers(&mut self, providers: Vec<Arc<dyn EntityProvider>>) {
        let mut triggers = Vec::new();
        for provider in providers.iter().filter(|p| p.enabled()) {
            for trigger in provider.triggers() {
                if !triggers.contains(&trigger) {
                    triggers.push(trigger);
                }
            }
        }
        self.caches = providers.iter().map(|_| ProviderCache::default()).collect();
        self.providers = providers;
        self.triggers = triggers;
        self.state = SuggestorState::Idle;
    }

    pub fn set_options(&mut self, options: SuggestorOptions) {
        self.options = options;
    }

    pub fn providers(&self) -> &[Arc<dyn EntityProvider>] {
        &self.providers
    }

    /// Trigger characters at least one enabled provider answers to
    pub fn triggers(&self) -> &[TriggerCharacter] {
        &self.triggers
    }

    pub fn state(&self) -> &SuggestorState {
        &self.state
    }

    pub fn is_triggered(&self) -> bool {
        matches!(self.state, SuggestorState::Triggered(_))
    }

    /// Detect a trigger ending at `cursor` in `line`
    ///
    /// Walks back from the cursor over non-whitespace and stops at the first
    /// trigger character with at least one character between it and the
    /// cursor. Character offsets, not bytes.
    pub fn on_trigger(&mut self, cursor: EditorPosition, line: &str) -> Option<TriggerInfo> {
        let info = detect_trigger(&self.triggers, cursor, line);
        self.state = match &info {
            Some(info) => SuggestorState::Triggered(info.clone()),
            None => SuggestorState::Idle,
        };
        info
    }

    /// [`on_trigger`](Self::on_trigger) at the editor's cursor
    pub fn on_editor_change(&mut self, editor: &dyn Editor) -> Option<TriggerInfo> {
        let cursor = editor.get_cursor();
        let line = editor.get_line(cursor.line);
        self.on_trigger(cursor, &line)
    }

    /// Merged suggestions from every provider answering the active trigger
    ///
    /// Provider order, then provider order within each list; each provider's
    /// creation suggestions follow its regular ones. Empty while idle or for a
    /// blank query.
    pub fn get_suggestions(&mut self, query: &str) -> Vec<EntitySuggestionItem> {
        let SuggestorState::Triggered(info) = &self.state else {
            return Vec::new();
        };
        if query.trim().is_empty() {
            return Vec::new();
        }
        let trigger = info.trigger;
        let query_lower = query.to_lowercase();
        let mut merged = Vec::new();

        for (provider, cache) in self.providers.iter().zip(self.caches.iter_mut()) {
            if !provider.enabled() || !provider.triggers().contains(&trigger) {
                continue;
            }

            let behavior = provider.refresh_behavior();
            let prefiltered = provider.filters_query();

            if !cache.reusable(behavior, trigger, query, prefiltered, self.options.debounce) {
                match provider.get_entity_list(query, trigger) {
                    Ok(items) => {
                        *cache = ProviderCache {
                            items: Some(items),
                            trigger: Some(trigger),
                            query: query.to_string(),
                            computed_at: Some(Instant::now()),
                        };
                    }
                    Err(e) => {
                        warn!(
                            provider = provider.provider_type_id(),
                            trigger = %trigger,
                            error = %e,
                            "Provider failed, skipping its suggestions"
                        );
                        *cache = ProviderCache::default();
                    }
                }
            }

            if let Some(items) = &cache.items {
                if prefiltered {
                    merged.extend(items.iter().cloned());
                } else {
                    merged.extend(
                        items
                            .iter()
                            .filter(|item| item.suggestion_text.to_lowercase().contains(&query_lower))
                            .cloned(),
                    );
                }
            }
            merged.extend(provider.template_creation_suggestions(query));
        }

        merged.truncate(self.options.max_suggestions);
        merged
    }

    pub fn render_suggestion(&self, item: &EntitySuggestionItem) -> RenderedSuggestion {
        let glyph = match (&item.flair, &item.icon) {
            (Some(flair), _) => SuggestionGlyph::Flair(flair.clone()),
            (None, Some(icon)) => SuggestionGlyph::Icon(icon.clone()),
            (None, None) => SuggestionGlyph::None,
        };
        RenderedSuggestion {
            glyph,
            title: item.suggestion_text.clone(),
            note: item.note_text.clone(),
        }
    }

    /// Replace the trigger span with the item's text and close the popup
    ///
    /// The item's action, if any, is awaited first: `Replace(text)` inserts
    /// `text`, while `NoOp` or a failure falls back to the literal replacement.
    /// Returns `None` when no trigger is active.
    pub async fn select_suggestion(
        &mut self,
        item: &EntitySuggestionItem,
        editor: &mut dyn Editor,
    ) -> Option<SelectionOutcome> {
        let SuggestorState::Triggered(info) = std::mem::take(&mut self.state) else {
            return None;
        };

        let (inserted, action) = match &item.action {
            None => (item.insertion_text().to_string(), ActionResult::None),
            Some(action) => match action.run().await {
                Ok(ActionOutcome::Replace(text)) => (text, ActionResult::Replaced),
                Ok(ActionOutcome::NoOp) => (item.insertion_text().to_string(), ActionResult::NoOp),
                Err(e) => {
                    warn!(suggestion = %item.suggestion_text, error = %e, "Suggestion action failed");
                    (
                        item.insertion_text().to_string(),
                        ActionResult::Failed(e.to_string()),
                    )
                }
            },
        };

        let from = info.trigger_pos;
        editor.replace_range(&inserted, from, info.end);
        let cursor = end_of_insertion(from, &inserted);
        editor.set_cursor(cursor);

        debug!(trigger = %info.trigger, inserted = %inserted, "Applied suggestion");
        Some(SelectionOutcome {
            inserted,
            from,
            cursor,
            action,
        })
    }

    pub fn close(&mut self) {
        self.state = SuggestorState::Idle;
    }
}

/// Trigger detection over a single line
pub fn detect_trigger(
    triggers: &[TriggerCharacter],
    cursor: EditorPosition,
    line: &str,
) -> Option<TriggerInfo> {
    let chars: Vec<char> = line.chars().collect();
    let end = cursor.ch.min(chars.len());

    let mut idx = end;
    while idx > 0 {
        idx -= 1;
        let c = chars[idx];
        if c.is_whitespace() {
            return None;
        }
        let trigger = TriggerCharacter::from(c);
        if idx + 1 < end && triggers.contains(&trigger) {
            return Some(TriggerInfo {
                trigger,
                trigger_pos: EditorPosition::new(cursor.line, idx),
                start: EditorPosition::new(cursor.line, idx + 1),
                end: EditorPosition::new(cursor.line, end),
                query: chars[idx + 1..end].iter().collect(),
            });
        }
    }
    None
}

fn end_of_insertion(from: EditorPosition, text: &str) -> EditorPosition {
    match text.rfind('\n') {
        Some(idx) => EditorPosition::new(
            from.line + text.matches('\n').count(),
            text[idx + 1..].chars().count(),
        ),
        None => EditorPosition::new(from.line, from.ch + text.chars().count()),
    }
}
