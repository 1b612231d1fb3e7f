use serde_json::{Map, Value};

use super::aliases::CanonicalField;
use super::amount::clean_amount;
use super::date::parse_expiry_date;
use crate::types::CanonicalRecord;

/// Normalize one raw record into its canonical shape.
///
/// Returns `None` when the input is not a JSON object. For any object all six
/// fields are produced, each `None` when no alias carries a usable value.
pub fn normalize_record(raw: &Value) -> Option<CanonicalRecord> {
    let record = raw.as_object()?;
    Some(CanonicalRecord {
        doc_id: text_field(record, CanonicalField::DocId),
        doc_type: text_field(record, CanonicalField::Type),
        counterparty: text_field(record, CanonicalField::Counterparty),
        project: text_field(record, CanonicalField::Project),
        expiry_date: CanonicalField::ExpiryDate
            .resolve(record)
            .and_then(parse_expiry_date),
        amount: CanonicalField::Amount.resolve(record).and_then(clean_amount),
    })
}

fn text_field(record: &Map<String, Value>, field: CanonicalField) -> Option<String> {
    field.resolve(record).and_then(as_text)
}

/// Scalars become text; arrays and objects are not a usable label.
fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn non_object_is_rejected() {
        assert_eq!(normalize_record(&json!("D1")), None);
        assert_eq!(normalize_record(&json!([{"doc_id": "D1"}])), None);
        assert_eq!(normalize_record(&json!(null)), None);
    }

    #[test]
    fn empty_object_yields_all_nulls() {
        assert_eq!(normalize_record(&json!({})), Some(CanonicalRecord::default()));
    }

    #[test]
    fn one_alias_per_field() {
        let raw = json!({
            "ref": "R-9",
            "category": "lease",
            "supplier": "Globex",
            "proj": "Marina",
            "valid_till": "15/03/2027",
            "contract_amount": "AED 45,500"
        });
        let record = normalize_record(&raw).unwrap();
        assert_eq!(record.doc_id.as_deref(), Some("R-9"));
        assert_eq!(record.doc_type.as_deref(), Some("lease"));
        assert_eq!(record.counterparty.as_deref(), Some("Globex"));
        assert_eq!(record.project.as_deref(), Some("Marina"));
        assert_eq!(record.expiry_date.as_deref(), Some("2027-03-15"));
        assert_eq!(record.amount, Some(45500));
    }

    #[test]
    fn document_ref_beats_document_id() {
        let record = normalize_record(&json!({"document_ref": "A", "documentId": "B"})).unwrap();
        assert_eq!(record.doc_id.as_deref(), Some("A"));
    }

    #[test]
    fn project_falls_back_to_meta() {
        let record = normalize_record(&json!({"meta": {"project": "Creek"}})).unwrap();
        assert_eq!(record.project.as_deref(), Some("Creek"));

        let record =
            normalize_record(&json!({"project": "Top", "meta": {"project": "Creek"}})).unwrap();
        assert_eq!(record.project.as_deref(), Some("Top"));
    }

    #[test]
    fn unparseable_fields_stay_null_without_affecting_others() {
        let record = normalize_record(&json!({
            "doc_number": 77,
            "expiry": "sometime",
            "total": "TBD"
        }))
        .unwrap();
        assert_eq!(record.doc_id.as_deref(), Some("77"));
        assert_eq!(record.expiry_date, None);
        assert_eq!(record.amount, None);
    }

    #[test]
    fn composite_label_is_null() {
        let record = normalize_record(&json!({"vendor": {"name": "Acme"}})).unwrap();
        assert_eq!(record.counterparty, None);
    }
}
