use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CleanerError;
use crate::types::CanonicalRecord;

/// How records without a `doc_id` are treated during deduplication
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingIdPolicy {
    /// A missing id is one shared key: only the first id-less record survives.
    #[default]
    Collapse,
    /// Id-less records never collide with anything.
    #[serde(alias = "keep")]
    KeepAll,
}

impl FromStr for MissingIdPolicy {
    type Err = CleanerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "collapse" => Ok(MissingIdPolicy::Collapse),
            "keep" | "keep_all" => Ok(MissingIdPolicy::KeepAll),
            other => Err(CleanerError::Config(format!(
                "unknown missing-id policy '{}', expected 'collapse' or 'keep'",
                other
            ))),
        }
    }
}

/// Drop records whose `doc_id` was already seen, keeping first occurrences in
/// input order. Records without an id share a single key.
pub fn remove_duplicates(records: Vec<CanonicalRecord>) -> Vec<CanonicalRecord> {
    remove_duplicates_with(records, MissingIdPolicy::Collapse)
}

pub fn remove_duplicates_with(
    records: Vec<CanonicalRecord>,
    policy: MissingIdPolicy,
) -> Vec<CanonicalRecord> {
    let mut seen: HashSet<Option<String>> = HashSet::new();
    records
        .into_iter()
        .filter(|record| {
            if record.doc_id.is_none() && policy == MissingIdPolicy::KeepAll {
                return true;
            }
            seen.insert(record.doc_id.clone())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: Option<&str>, counterparty: &str) -> CanonicalRecord {
        CanonicalRecord {
            doc_id: id.map(str::to_string),
            counterparty: Some(counterparty.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn first_occurrence_kept_in_order() {
        let input = vec![rec(Some("X"), "first"), rec(Some("X"), "second"), rec(Some("Y"), "third")];
        let out = remove_duplicates(input);
        assert_eq!(out, vec![rec(Some("X"), "first"), rec(Some("Y"), "third")]);
    }

    #[test]
    fn missing_ids_collapse_by_default() {
        let input = vec![rec(None, "a"), rec(Some("Z"), "b"), rec(None, "c")];
        let out = remove_duplicates(input);
        assert_eq!(out, vec![rec(None, "a"), rec(Some("Z"), "b")]);
    }

    #[test]
    fn keep_all_policy_retains_id_less_records() {
        let input = vec![rec(None, "a"), rec(Some("Z"), "b"), rec(None, "c"), rec(Some("Z"), "d")];
        let out = remove_duplicates_with(input, MissingIdPolicy::KeepAll);
        assert_eq!(out, vec![rec(None, "a"), rec(Some("Z"), "b"), rec(None, "c")]);
    }

    #[test]
    fn policy_parsing() {
        assert_eq!("collapse".parse::<MissingIdPolicy>().unwrap(), MissingIdPolicy::Collapse);
        assert_eq!(" KEEP ".parse::<MissingIdPolicy>().unwrap(), MissingIdPolicy::KeepAll);
        assert!("sometimes".parse::<MissingIdPolicy>().is_err());
    }
}
