//! Static alias table mapping each canonical field to the raw keys it may be
//! read from, in priority order.

use serde_json::{Map, Value};

/// One way of reading a value out of a raw record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accessor {
    /// A top-level key
    Key(&'static str),
    /// `parent.child`, only followed when `parent` is an object
    Nested(&'static str, &'static str),
}

impl Accessor {
    pub fn read<'a>(&self, record: &'a Map<String, Value>) -> Option<&'a Value> {
        match *self {
            Accessor::Key(key) => record.get(key),
            Accessor::Nested(parent, child) => record
                .get(parent)
                .and_then(|v| v.as_object())
                .and_then(|inner| inner.get(child)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalField {
    DocId,
    Type,
    Counterparty,
    Project,
    ExpiryDate,
    Amount,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 6] = [
        CanonicalField::DocId,
        CanonicalField::Type,
        CanonicalField::Counterparty,
        CanonicalField::Project,
        CanonicalField::ExpiryDate,
        CanonicalField::Amount,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::DocId => "doc_id",
            CanonicalField::Type => "type",
            CanonicalField::Counterparty => "counterparty",
            CanonicalField::Project => "project",
            CanonicalField::ExpiryDate => "expiry_date",
            CanonicalField::Amount => "amount",
        }
    }

    /// Accessor rules for this field. The canonical key always comes first so
    /// an already-cleaned record resolves to itself.
    pub fn rules(&self) -> &'static [Accessor] {
        use Accessor::{Key, Nested};
        match self {
            CanonicalField::DocId => &[
                Key("doc_id"),
                Key("document_ref"),
                Key("documentId"),
                Key("ref"),
                Key("doc_number"),
            ],
            CanonicalField::Type => &[
                Key("type"),
                Key("docType"),
                Key("doc_category"),
                Key("document_type"),
                Key("category"),
            ],
            CanonicalField::Counterparty => &[
                Key("counterparty"),
                Key("party_name"),
                Key("partyA"),
                Key("vendor"),
                Key("supplier"),
                Key("vendorName"),
            ],
            CanonicalField::Project => &[
                Key("project"),
                Nested("meta", "project"),
            ],
            CanonicalField::ExpiryDate => &[
                Key("expiry_date"),
                Key("expiration"),
                Key("end_date"),
                Key("expires_on"),
                Key("valid_till"),
                Key("expiry"),
            ],
            CanonicalField::Amount => &[
                Key("amount"),
                Key("total"),
                Key("value"),
                Key("contract_amount"),
            ],
        }
    }

    /// First truthy value found by this field's rules
    pub fn resolve<'a>(&self, record: &'a Map<String, Value>) -> Option<&'a Value> {
        self.rules()
            .iter()
            .filter_map(|rule| rule.read(record))
            .find(|value| is_truthy(value))
    }
}

/// Falsy: null, `false`, zero, empty string, empty array, empty object.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
