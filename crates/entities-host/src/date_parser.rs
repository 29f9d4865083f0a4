use crate::bridges::{DateParser, ParsedDate};
use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;

static RELATIVE_WEEKDAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(next|last|this)\s+(monday|tuesday|wednesday|thursday|friday|saturday|sunday)$")
        .expect("weekday pattern is valid")
});

static OFFSET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:in\s+(\d{1,3})\s+(day|week)s?|(\d{1,3})\s+(day|week)s?\s+ago)$")
        .expect("offset pattern is valid")
});

/// Small natural-language date parser
///
/// Understands `today`, `tomorrow`, `yesterday`, `next|last|this <weekday>`
/// (relative to the Monday-based week containing today), `in N days|weeks`,
/// `N days|weeks ago` and ISO `YYYY-MM-DD` dates.
pub struct NaturalDateParser {
    format: String,
    today: fn() -> NaiveDate,
}

impl NaturalDateParser {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            today: || Local::now().date_naive(),
        }
    }

    pub fn with_today(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    fn resolve(&self, text: &str) -> Option<NaiveDate> {
        let text = text.trim().to_lowercase();
        let today = (self.today)();

        match text.as_str() {
            "today" | "now" => return Some(today),
            "tomorrow" => return today.succ_opt(),
            "yesterday" => return today.pred_opt(),
            _ => {}
        }

        if let Some(caps) = RELATIVE_WEEKDAY.captures(&text) {
            let weekday: Weekday = caps.get(2)?.as_str().parse().ok()?;
            let monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);
            let this = monday + Duration::days(weekday.num_days_from_monday() as i64);
            return match caps.get(1)?.as_str() {
                "next" => Some(this + Duration::weeks(1)),
                "last" => Some(this - Duration::weeks(1)),
                _ => Some(this),
            };
        }

        if let Some(caps) = OFFSET.captures(&text) {
            let (amount, unit, sign) = match (caps.get(1), caps.get(2)) {
                (Some(amount), Some(unit)) => (amount, unit, 1),
                _ => (caps.get(3)?, caps.get(4)?, -1),
            };
            let amount: i64 = amount.as_str().parse().ok()?;
            let days = if unit.as_str() == "week" { amount * 7 } else { amount };
            return today.checked_add_signed(Duration::days(days * sign));
        }

        NaiveDate::parse_from_str(&text, "%Y-%m-%d").ok()
    }
}

impl Default for NaturalDateParser {
    fn default() -> Self {
        Self::new("%Y-%m-%d")
    }
}

impl DateParser for NaturalDateParser {
    fn parse_date(&self, text: &str) -> Option<ParsedDate> {
        let date = self.resolve(text)?;
        Some(ParsedDate {
            formatted_string: date.format(&self.format).to_string(),
            date,
        })
    }
}
