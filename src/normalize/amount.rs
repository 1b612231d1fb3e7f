use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static DIGIT_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid digit regex"));

/// Coerce a monetary value into whole units.
///
/// Numbers are truncated toward zero and booleans count as `0`/`1`. Everything
/// else is rendered as text and every run of digits is concatenated, so
/// `"AED 12,000"` becomes `12000` and `"12.50"` becomes `1250`. The sign is
/// dropped on both paths.
pub fn clean_amount(raw: &Value) -> Option<u64> {
    match raw {
        Value::Null => None,
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Some(u)
            } else if let Some(i) = n.as_i64() {
                Some(i.unsigned_abs())
            } else {
                n.as_f64().and_then(truncate_float)
            }
        }
        Value::Bool(b) => Some(u64::from(*b)),
        Value::String(s) => digits_only(s),
        other => digits_only(&other.to_string()),
    }
}

fn truncate_float(f: f64) -> Option<u64> {
    let whole = f.trunc().abs();
    if whole.is_finite() && whole <= u64::MAX as f64 {
        Some(whole as u64)
    } else {
        None
    }
}

fn digits_only(text: &str) -> Option<u64> {
    let digits: String = DIGIT_RUN_RE.find_iter(text).map(|m| m.as_str()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}
