//! Expiry date parsing.
//!
//! Inputs arrive in a handful of textual shapes. Each shape is a rule that
//! first checks whether the input *looks like* that shape and, if so, decides
//! the outcome on its own: a string containing `/` is only ever read as
//! `DD/MM/YYYY`, never retried as `MM/DD/YYYY`.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static ISO_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid ISO date regex"));
static COMPACT_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{8}$").expect("valid compact date regex"));
static DAY_SLASH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}/\d{1,2}/\d{4}$").expect("valid day/month/year regex"));
static DAY_DASH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}-\d{1,2}-\d{4}$").expect("valid day-month-year regex"));
static MONTH_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\d{1,2}\s+[A-Za-z]{3}|[A-Za-z]{3}\s+\d{1,2})\s+\d{4}$")
        .expect("valid month name regex")
});

const OUTPUT_FORMAT: &str = "%Y-%m-%d";

/// Ordered date shapes. The first one whose syntax matches owns the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateShape {
    /// `2026-02-01`, trusted verbatim
    Iso,
    /// `20260201`
    Compact,
    /// `01/02/2026`
    DaySlash,
    /// `01-02-2026`
    DayDash,
    /// `01 Feb 2026` or `Feb 01 2026`
    MonthName,
}

const SHAPES: [DateShape; 5] = [
    DateShape::Iso,
    DateShape::Compact,
    DateShape::DaySlash,
    DateShape::DayDash,
    DateShape::MonthName,
];

impl DateShape {
    fn matches(&self, input: &str) -> bool {
        match self {
            DateShape::Iso => ISO_DATE_RE.is_match(input),
            DateShape::Compact => COMPACT_DATE_RE.is_match(input),
            DateShape::DaySlash => input.contains('/'),
            DateShape::DayDash => input.contains('-'),
            DateShape::MonthName => true,
        }
    }

    /// Exact layout an input must have before chrono sees it, since chrono's
    /// `%Y` also accepts signed and short years.
    fn layout(&self) -> Option<&'static Regex> {
        match self {
            DateShape::Iso | DateShape::Compact => None,
            DateShape::DaySlash => Some(&*DAY_SLASH_RE),
            DateShape::DayDash => Some(&*DAY_DASH_RE),
            DateShape::MonthName => Some(&*MONTH_NAME_RE),
        }
    }

    fn formats(&self) -> &'static [&'static str] {
        match self {
            DateShape::Iso => &[],
            DateShape::Compact => &["%Y%m%d"],
            DateShape::DaySlash => &["%d/%m/%Y"],
            DateShape::DayDash => &["%d-%m-%Y"],
            DateShape::MonthName => &["%d %b %Y", "%b %d %Y"],
        }
    }

    fn parse(&self, input: &str) -> Option<String> {
        if *self == DateShape::Iso {
            return Some(input.to_string());
        }
        if let Some(layout) = self.layout() {
            if !layout.is_match(input) {
                return None;
            }
        }
        self.formats()
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
            .map(|date| date.format(OUTPUT_FORMAT).to_string())
    }
}

/// Normalize a raw expiry value to `YYYY-MM-DD`.
///
/// Strings are trimmed and numbers are read through their decimal text
/// (`20260201` behaves like `"20260201"`). Anything unparseable yields `None`.
pub fn parse_expiry_date(raw: &Value) -> Option<String> {
    let text = match raw {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    parse_date_str(&text)
}

/// String form of [`parse_expiry_date`]
pub fn parse_date_str(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    SHAPES
        .iter()
        .find(|shape| shape.matches(input))
        .and_then(|shape| shape.parse(input))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn iso_is_returned_verbatim() {
        assert_eq!(parse_date_str("2026-02-01").as_deref(), Some("2026-02-01"));
        // not re-validated
        assert_eq!(parse_date_str("2026-13-45").as_deref(), Some("2026-13-45"));
    }

    #[test]
    fn compact_form() {
        assert_eq!(parse_date_str("20260201").as_deref(), Some("2026-02-01"));
        assert_eq!(parse_date_str("20261301"), None);
    }

    #[test]
    fn slash_form_is_day_first_only() {
        assert_eq!(parse_date_str("01/02/2026").as_deref(), Some("2026-02-01"));
        assert_eq!(parse_date_str("31/12/2026").as_deref(), Some("2026-12-31"));
        // 12/31/2026 would be valid month-first, but only day-first is tried
        assert_eq!(parse_date_str("12/31/2026"), None);
        assert_eq!(parse_date_str("31/02/2026"), None);
    }

    #[test]
    fn dash_form_is_day_first() {
        assert_eq!(parse_date_str("01-02-2026").as_deref(), Some("2026-02-01"));
        assert_eq!(parse_date_str("2026-2-1"), None);
    }

    #[test]
    fn month_name_forms() {
        assert_eq!(parse_date_str("01 Feb 2026").as_deref(), Some("2026-02-01"));
        assert_eq!(parse_date_str("Feb 01 2026").as_deref(), Some("2026-02-01"));
        assert_eq!(parse_date_str("1 Feb 2026").as_deref(), Some("2026-02-01"));
    }

    #[test]
    fn year_must_be_four_unsigned_digits() {
        for input in [
            "01-02--2026",
            "01/02/+20260",
            "Feb 1 +12345",
            "01/02/26",
            "01-02-0",
            "01/02/-2026",
            "1 Feb 26",
            "01 Feb 02026",
        ] {
            assert_eq!(parse_date_str(input), None, "{input} should not parse");
        }
    }

    #[test]
    fn month_names_are_abbreviated() {
        assert_eq!(parse_date_str("01 February 2026"), None);
        assert_eq!(parse_date_str("01 feb 2026").as_deref(), Some("2026-02-01"));
    }

    #[test]
    fn garbage_and_empty_are_none() {
        assert_eq!(parse_date_str("garbage"), None);
        assert_eq!(parse_date_str("   "), None);
        assert_eq!(parse_expiry_date(&json!(null)), None);
        assert_eq!(parse_expiry_date(&json!("")), None);
        assert_eq!(parse_expiry_date(&json!({"date": "2026-02-01"})), None);
    }

    #[test]
    fn numbers_and_padded_strings() {
        assert_eq!(parse_expiry_date(&json!(20260201)).as_deref(), Some("2026-02-01"));
        assert_eq!(parse_expiry_date(&json!("  2026-02-01 ")).as_deref(), Some("2026-02-01"));
    }
}
