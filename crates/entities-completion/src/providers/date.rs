//! Relative dates, weekday phrases and ISO weeks.

use crate::error::{EntitiesError, EntitiesResult};
use crate::provider::{EntityProvider, ProviderContext};
use crate::settings::{type_ids, DateProviderSettings, EntityProviderUserSettings};
use crate::types::{EntitySuggestionItem, ProviderStatus, RefreshBehavior, TriggerCharacter};
use chrono::format::{Item, StrftimeItems};
use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};
use entities_host::DateParser;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::warn;

static WEEK_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:(\d{4}|\d{2})[-/ ]?)?(?:w|wk|week)[-/ ]?(\d{1,2})$")
        .expect("valid week regex")
});

const FIXED_PHRASES: [&str; 3] = ["today", "tomorrow", "yesterday"];
const MODIFIERS: [&str; 3] = ["next", "last", "this"];
const WEEKDAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// Weeks a bare week number may lag the current one before it means next year
const WEEK_ROLLOVER_WINDOW: u32 = 4;

pub struct DateProvider {
    settings: DateProviderSettings,
    parser: Option<Arc<dyn DateParser>>,
    phrases: Vec<String>,
    today: fn() -> NaiveDate,
}

impl DateProvider {
    pub fn new(settings: DateProviderSettings, context: &ProviderContext) -> EntitiesResult<Self> {
        if StrftimeItems::new(&settings.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(EntitiesError::invalid_settings(
                type_ids::DATE,
                format!("invalid date format: {}", settings.date_format),
            ));
        }

        let parser = context.host.date_parser.clone();
        if parser.is_none() {
            warn!(provider = type_ids::DATE, "Date parser unavailable, only week suggestions remain");
        }

        let mut phrases: Vec<String> = FIXED_PHRASES.iter().map(|p| p.to_string()).collect();
        for modifier in MODIFIERS {
            for day in WEEKDAYS {
                phrases.push(format!("{} {}", modifier, day));
            }
        }

        Ok(Self {
            settings,
            parser,
            phrases,
            today: || Local::now().date_naive(),
        })
    }

    pub fn with_today(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    fn wrap(&self, text: String) -> String {
        if self.settings.wrap_links {
            format!("[[{}]]", text)
        } else {
            text
        }
    }

    fn date_item(&self, label: &str, date: NaiveDate) -> EntitySuggestionItem {
        let formatted = date.format(&self.settings.date_format).to_string();
        EntitySuggestionItem::new(label.to_string())
            .with_note(date.format("%A, %B %-d, %Y").to_string())
            .with_replacement(self.wrap(formatted))
            .with_icon(self.settings.common.icon.clone())
    }

    fn week_item(&self, label: Option<&str>, year: i32, week: u32) -> Option<EntitySuggestionItem> {
        let monday = NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)?;
        let iso = format!("{}-W{:02}", year, week);
        let note = format!("Wk of {}/{}", monday.month(), monday.day());
        let replacement = format!("{}|{} ({})", iso, iso, note);

        Some(
            EntitySuggestionItem::new(label.unwrap_or(&iso).to_string())
                .with_note(note)
                .with_replacement(self.wrap(replacement))
                .with_icon(self.settings.common.icon.clone())
                .with_match(iso),
        )
    }

    fn parsed_suggestions(&self, parser: &dyn DateParser, query: &str) -> Vec<EntitySuggestionItem> {
        let query_lower = query.to_lowercase();
        let mut items: Vec<EntitySuggestionItem> = self
            .phrases
            .iter()
            .filter(|phrase| phrase.contains(&query_lower))
            .filter_map(|phrase| {
                parser
                    .parse_date(phrase)
                    .map(|parsed| self.date_item(phrase, parsed.date))
            })
            .collect();

        let trimmed = query.trim();
        if !trimmed.is_empty() && !self.phrases.iter().any(|p| *p == query_lower) {
            if let Some(parsed) = parser.parse_date(trimmed) {
                items.push(self.date_item(trimmed, parsed.date));
            }
        }
        items
    }

    fn week_suggestions(&self, query: &str) -> Vec<EntitySuggestionItem> {
        let today = (self.today)();
        let current = today.iso_week();
        let query_lower = query.to_lowercase();
        let mut items = Vec::new();

        if let Some(captures) = WEEK_PATTERN.captures(query.trim()) {
            let week: u32 = captures[2].parse().unwrap_or(0);
            let year = match captures.get(1) {
                Some(y) if y.as_str().len() == 2 => 2000 + y.as_str().parse::<i32>().unwrap_or(0),
                Some(y) => y.as_str().parse::<i32>().unwrap_or(current.year()),
                None if week + WEEK_ROLLOVER_WINDOW < current.week() => current.year() + 1,
                None => current.year(),
            };
            items.extend(self.week_item(None, year, week));
        }

        let this_monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);
        for (label, offset) in [("this week", 0), ("next week", 7), ("last week", -7)] {
            if !label.contains(&query_lower) {
                continue;
            }
            let week = (this_monday + Duration::days(offset)).iso_week();
            items.extend(self.week_item(Some(label), week.year(), week.week()));
        }
        items
    }
}

impl EntityProvider for DateProvider {
    fn provider_type_id(&self) -> &str {
        type_ids::DATE
    }

    fn settings(&self) -> &EntityProviderUserSettings {
        &self.settings.common
    }

    fn get_entity_list(
        &self,
        query: &str,
        _trigger: TriggerCharacter,
    ) -> EntitiesResult<Vec<EntitySuggestionItem>> {
        let mut items = match &self.parser {
            Some(parser) => self.parsed_suggestions(parser.as_ref(), query),
            None => Vec::new(),
        };
        if self.settings.iso_weeks {
            items.extend(self.week_suggestions(query));
        }
        Ok(items)
    }

    fn refresh_behavior(&self) -> RefreshBehavior {
        RefreshBehavior::ShouldRefresh
    }

    fn filters_query(&self) -> bool {
        true
    }

    fn status(&self) -> ProviderStatus {
        match self.parser {
            Some(_) => ProviderStatus::Ready,
            None => ProviderStatus::missing("date parser"),
        }
    }
}
