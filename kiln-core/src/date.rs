use std::cmp::Ordering;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::Serialize;

pub const INVALID_DISPLAY: &str = "Invalid Date";

static RE_DATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());
static RE_DATE_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}$").unwrap());
static RE_ISO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d{1,3})?Z?$").unwrap()
});

/// A date as written in frontmatter, kept alongside its display form.
///
/// `raw` is `None` when the source could not be parsed; such values order
/// before every valid date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateValue {
    pub raw: Option<NaiveDateTime>,
    pub display: String,
}

impl DateValue {
    pub fn invalid() -> Self {
        Self {
            raw: None,
            display: INVALID_DISPLAY.to_string(),
        }
    }

    pub fn from_datetime(raw: NaiveDateTime) -> Self {
        Self {
            raw: Some(raw),
            display: raw.format("%B %-d, %Y").to_string(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.raw.is_some()
    }

    /// RFC 2822 rendering for feeds, treating the value as UTC.
    pub fn to_rfc2822(&self) -> Option<String> {
        self.raw.map(|raw| raw.and_utc().to_rfc2822())
    }
}

impl PartialOrd for DateValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DateValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw.cmp(&other.raw)
    }
}

/// Whether `input` is in one of the accepted frontmatter date formats:
/// `YYYY-MM-DD`, `YYYY-MM-DD HH:MM`, or ISO-8601 with optional
/// milliseconds and optional trailing `Z`.
pub fn is_accepted_format(input: &str) -> bool {
    parse(input).is_some()
}

/// Wrap a raw frontmatter date. Never fails; unparseable input produces
/// [`DateValue::invalid`].
pub fn normalize_date(input: &str) -> DateValue {
    match parse(input) {
        Some(raw) => DateValue::from_datetime(raw),
        None => DateValue::invalid(),
    }
}

fn parse(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();

    if RE_DATE.is_match(input) {
        return NaiveDate::parse_from_str(input, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0));
    }
    if RE_DATE_TIME.is_match(input) {
        return NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M").ok();
    }
    if RE_ISO.is_match(input) {
        let stripped = input.trim_end_matches('Z');
        let format = if stripped.contains('.') {
            "%Y-%m-%dT%H:%M:%S%.f"
        } else {
            "%Y-%m-%dT%H:%M:%S"
        };
        return NaiveDateTime::parse_from_str(stripped, format).ok();
    }

    None
}
