// Subcommand implementations

use crate::cli::{Cli, Commands, OutputFormat};
use anyhow::{bail, Context, Result};
use entities_completion::{
    builtin_descriptors, EntitiesPlugin, PluginSettings, ProviderStatus, RenderedSuggestion,
    SuggestionGlyph,
};
use entities_host::{
    Editor, EditorPosition, FileClass, HostContext, JsonFileDataStore, MemoryDataStore,
    MemoryEditor, MemoryVault, NaturalDateParser, PluginDataStore, StaticMetadataSchema,
    VaultDataview, VaultTemplateEngine,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

pub async fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Commands::DefaultSettings { format } => print_default_settings(*format),
        Commands::Providers => {
            let plugin = load_plugin(&cli)?;
            print_providers(&plugin);
            Ok(())
        }
        Commands::Suggest { line, cursor } => {
            let mut plugin = load_plugin(&cli)?;
            suggest(&mut plugin, line, *cursor);
            Ok(())
        }
        Commands::Select {
            line,
            index,
            cursor,
        } => {
            let mut plugin = load_plugin(&cli)?;
            let text = select(&mut plugin, line, *cursor, *index).await?;
            println!("{}", text);
            Ok(())
        }
    }
}

fn load_plugin(cli: &Cli) -> Result<EntitiesPlugin> {
    let host = build_host(cli)?;
    let store = open_store(cli)?;
    let plugin = EntitiesPlugin::load(host, store).context("failed to load plugin")?;

    for skipped in &plugin.last_report().skipped {
        eprintln!(
            "skipped provider #{} ({}): {}",
            skipped.index, skipped.provider_type_id, skipped.error
        );
    }
    Ok(plugin)
}

fn build_host(cli: &Cli) -> Result<Arc<HostContext>> {
    let vault = Arc::new(
        MemoryVault::from_dir(&cli.vault)
            .with_context(|| format!("failed to read vault at {}", cli.vault.display()))?,
    );

    let mut host = HostContext::new(vault.clone())
        .with_templates(Arc::new(VaultTemplateEngine::new(vault.clone())))
        .with_date_parser(Arc::new(NaturalDateParser::default()))
        .with_dataview(Arc::new(VaultDataview::new(vault)));

    if let Some(path) = &cli.file_classes {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let classes: Vec<FileClass> = serde_json::from_str(&content)
            .with_context(|| format!("invalid file class list in {}", path.display()))?;
        host = host.with_metadata_schema(Arc::new(StaticMetadataSchema::new(classes)));
    }

    Ok(Arc::new(host))
}

/// An explicit settings file wins; otherwise the plugin's own data file
fn open_store(cli: &Cli) -> Result<Arc<dyn PluginDataStore>> {
    if let Some(path) = &cli.settings {
        let settings = PluginSettings::load_from_file(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?;
        return Ok(Arc::new(MemoryDataStore::with_data(settings.to_value()?)));
    }

    let path = default_data_path();
    debug!(path = %path.display(), "Using stored plugin data");
    Ok(Arc::new(JsonFileDataStore::new(path)))
}

fn default_data_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("entities"))
        .unwrap_or_else(|| PathBuf::from(".entities"))
        .join("data.json")
}

fn editor_for(line: &str, cursor: Option<usize>) -> MemoryEditor {
    let mut editor = MemoryEditor::with_cursor_at_end(line);
    if let Some(ch) = cursor {
        editor.set_cursor(EditorPosition::new(0, ch));
    }
    editor
}

fn suggest(plugin: &mut EntitiesPlugin, line: &str, cursor: Option<usize>) {
    let editor = editor_for(line, cursor);
    let suggestor = plugin.suggestor_mut();

    let Some(info) = suggestor.on_editor_change(&editor) else {
        println!("no trigger");
        return;
    };
    println!(
        "trigger '{}' query \"{}\" span {}..{}",
        info.trigger, info.query, info.start.ch, info.end.ch
    );

    let items = suggestor.get_suggestions(&info.query);
    if items.is_empty() {
        println!("no suggestions");
    }
    for (index, item) in items.iter().enumerate() {
        println!("{:>3}  {}", index, format_rendered(&suggestor.render_suggestion(item)));
    }
    suggestor.close();
}

async fn select(
    plugin: &mut EntitiesPlugin,
    line: &str,
    cursor: Option<usize>,
    index: usize,
) -> Result<String> {
    let mut editor = editor_for(line, cursor);
    let suggestor = plugin.suggestor_mut();

    let Some(info) = suggestor.on_editor_change(&editor) else {
        bail!("no trigger before the cursor");
    };
    let items = suggestor.get_suggestions(&info.query);
    let Some(item) = items.get(index) else {
        bail!("suggestion {} out of range ({} available)", index, items.len());
    };

    let outcome = suggestor
        .select_suggestion(item, &mut editor)
        .await
        .context("suggestion popup closed before selection")?;
    debug!(?outcome, "Selection applied");
    Ok(editor.text())
}

fn format_rendered(rendered: &RenderedSuggestion) -> String {
    let glyph = match &rendered.glyph {
        SuggestionGlyph::Flair(flair) => flair.clone(),
        SuggestionGlyph::Icon(icon) => format!("[{}]", icon),
        SuggestionGlyph::None => String::new(),
    };
    let line = match &rendered.note {
        Some(note) if !note.is_empty() => format!("{} {}  ({})", glyph, rendered.title, note),
        _ => format!("{} {}", glyph, rendered.title),
    };
    line.trim_start().to_string()
}

fn print_providers(plugin: &EntitiesPlugin) {
    println!("Provider types:");
    for descriptor in builtin_descriptors() {
        println!("  {:<18} {}", descriptor.type_id, descriptor.description);
    }

    println!("Configured providers:");
    for (type_id, status) in plugin.provider_statuses() {
        let status = match status {
            ProviderStatus::Ready => "ready".to_string(),
            ProviderStatus::DependencyMissing { dependency } => format!("missing {}", dependency),
            ProviderStatus::Misconfigured { reason } => format!("invalid: {}", reason),
        };
        println!("  {:<18} {}", type_id, status);
    }
}

fn print_default_settings(format: OutputFormat) -> Result<()> {
    let value = PluginSettings::default().to_value()?;
    let text = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&value)?,
        OutputFormat::Yaml => serde_yaml::to_string(&value)?,
    };
    println!("{}", text);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_rendered() {
        let rendered = RenderedSuggestion {
            glyph: SuggestionGlyph::Icon("user".to_string()),
            title: "Ada".to_string(),
            note: Some("People".to_string()),
        };
        assert_eq!(format_rendered(&rendered), "[user] Ada  (People)");

        let bare = RenderedSuggestion {
            glyph: SuggestionGlyph::None,
            title: "today".to_string(),
            note: None,
        };
        assert_eq!(format_rendered(&bare), "today");
    }

    #[test]
    fn test_editor_cursor_override() {
        assert_eq!(editor_for("@ada x", Some(4)).get_cursor(), EditorPosition::new(0, 4));
        assert_eq!(editor_for("@ada", None).get_cursor(), EditorPosition::new(0, 4));
    }
}
