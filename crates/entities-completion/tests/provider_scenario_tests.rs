/// Scenario tests for the built-in providers running behind the controller

use entities_completion::{
    CharacterDictionary, CharacterEntry, CharacterProvider, CharacterProviderSettings,
    DateProvider, DateProviderSettings, EntitiesSuggestor, EntityProvider, HelperProviderSettings,
    ProviderConfiguration, ProviderContext, ProviderRegistry, SuggestorOptions, TriggerCharacter,
};
use entities_host::{Editor, EditorPosition, HostContext, MemoryEditor, MemoryVault, NaturalDateParser};
use chrono::NaiveDate;
use serde_json::Map;
use std::sync::Arc;

fn host() -> Arc<HostContext> {
    Arc::new(HostContext::new(Arc::new(MemoryVault::new())))
}

fn smile_provider() -> Arc<dyn EntityProvider> {
    let dictionary = CharacterDictionary::from_entries(
        "emoji",
        vec![(
            "smile".to_string(),
            vec![CharacterEntry {
                char: "😄".to_string(),
                name: "smile".to_string(),
            }],
        )],
    );
    Arc::new(CharacterProvider::with_dictionaries(
        CharacterProviderSettings::default(),
        vec![dictionary],
    ))
}

#[tokio::test]
async fn test_colon_smile_inserts_emoji() {
    let mut suggestor =
        EntitiesSuggestor::with_providers(vec![smile_provider()], SuggestorOptions::default());
    let mut editor = MemoryEditor::with_cursor_at_end("feeling :smile");

    let info = suggestor.on_editor_change(&editor).unwrap();
    assert_eq!(info.trigger, TriggerCharacter::Colon);
    assert_eq!(info.query, "smile");

    let items = suggestor.get_suggestions(&info.query);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].replacement_text.as_deref(), Some("😄"));

    suggestor.select_suggestion(&items[0], &mut editor).await.unwrap();
    assert_eq!(editor.text(), "feeling 😄");
    assert_eq!(editor.get_cursor(), EditorPosition::new(0, 9));
}

#[test]
fn test_partial_keyword_matches() {
    let mut suggestor =
        EntitiesSuggestor::with_providers(vec![smile_provider()], SuggestorOptions::default());
    suggestor.on_trigger(EditorPosition::new(0, 5), ":smil").unwrap();
    assert_eq!(suggestor.get_suggestions("smil").len(), 1);
    assert!(suggestor.get_suggestions("frown").is_empty());
}

#[test]
fn test_unregistered_type_is_skipped_without_error() {
    let mut registry = ProviderRegistry::new();
    registry.initialize(ProviderContext::new(host()));
    registry.register_builtin_types();

    let report = registry
        .instantiate_providers_from_settings(&[
            ProviderConfiguration::Custom {
                provider_type_id: "calendar-sync".to_string(),
                settings: Map::new(),
            },
            ProviderConfiguration::Helper(HelperProviderSettings::default()),
        ])
        .unwrap();

    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].provider_type_id, "calendar-sync");
    assert_eq!(registry.get_providers().len(), 1);
    assert_eq!(registry.get_providers()[0].provider_type_id(), "helper");
}

#[test]
fn test_helper_commands_behind_slash() {
    let mut registry = ProviderRegistry::new();
    registry.initialize(ProviderContext::new(host()));
    registry.register_builtin_types();
    registry
        .instantiate_providers_from_settings(&[ProviderConfiguration::Helper(
            HelperProviderSettings::default(),
        )])
        .unwrap();

    let mut suggestor = EntitiesSuggestor::new(SuggestorOptions::default());
    suggestor.load_providers(&registry);

    assert!(suggestor.on_trigger(EditorPosition::new(0, 4), "@cal").is_none());
    suggestor.on_trigger(EditorPosition::new(0, 4), "/cal").unwrap();
    let labels: Vec<String> = suggestor
        .get_suggestions("cal")
        .into_iter()
        .map(|i| i.suggestion_text)
        .collect();
    assert_eq!(labels.len(), 13);
    assert!(labels.iter().all(|l| l.starts_with("callout ")));
}

fn december_11() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 11).unwrap()
}

#[test]
fn test_date_provider_behind_controller() {
    let host = HostContext::new(Arc::new(MemoryVault::new()))
        .with_date_parser(Arc::new(NaturalDateParser::default().with_today(december_11)));
    let provider = DateProvider::new(DateProviderSettings::default(), &ProviderContext::new(Arc::new(host)))
        .unwrap()
        .with_today(december_11);
    let provider: Arc<dyn EntityProvider> = Arc::new(provider);

    let mut suggestor = EntitiesSuggestor::with_providers(vec![provider], SuggestorOptions::default());

    suggestor.on_trigger(EditorPosition::new(0, 4), "@wk3").unwrap();
    let items = suggestor.get_suggestions("wk3");
    assert_eq!(items.len(), 1);
    assert_eq!(
        items[0].replacement_text.as_deref(),
        Some("[[2025-W03|2025-W03 (Wk of 1/13)]]")
    );

    suggestor.on_trigger(EditorPosition::new(0, 9), "@2024-w05").unwrap();
    let items = suggestor.get_suggestions("2024-w05");
    assert_eq!(items[0].suggestion_text, "2024-W05");

    suggestor.on_trigger(EditorPosition::new(0, 6), "@today").unwrap();
    let items = suggestor.get_suggestions("today");
    assert_eq!(items[0].replacement_text.as_deref(), Some("[[2024-12-11]]"));
}
