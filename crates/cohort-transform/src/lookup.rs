use std::collections::HashMap;

use cohort_common::column_strings;
use polars::prelude::{DataFrame, IdxSize};

use crate::error::Result;

/// Row index of a reference table keyed by the exact text of one column.
///
/// When a key appears more than once the first row wins. Null keys are not
/// indexed.
#[derive(Debug, Clone, Default)]
pub struct FirstMatchIndex {
    rows: HashMap<String, IdxSize>,
}

impl FirstMatchIndex {
    /// Index `df` by `key_column`.
    ///
    /// # Errors
    ///
    /// Returns an error if `key_column` does not exist.
    pub fn build(df: &DataFrame, key_column: &str) -> Result<Self> {
        let mut rows = HashMap::with_capacity(df.height());
        for (idx, key) in column_strings(df, key_column)?.into_iter().enumerate() {
            let Some(key) = key else {
                continue;
            };
            rows.entry(key).or_insert(idx as IdxSize);
        }
        Ok(Self { rows })
    }

    /// Row of the first record whose key equals `key`, if any.
    pub fn get(&self, key: &str) -> Option<IdxSize> {
        self.rows.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use polars::prelude::Column;

    use super::*;

    #[test]
    fn first_match_wins() {
        let df = DataFrame::new(vec![Column::new(
            "NRIC".into(),
            vec![Some("S1234567A"), None, Some("S1234567A"), Some("T7654321B")],
        )])
        .unwrap();
        let index = FirstMatchIndex::build(&df, "NRIC").unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.get("S1234567A"), Some(0));
        assert_eq!(index.get("T7654321B"), Some(3));
        assert_eq!(index.get("s1234567a"), None);
    }

    #[test]
    fn missing_key_column_is_an_error() {
        let df = DataFrame::new(vec![Column::new("Other".into(), vec!["x"])]).unwrap();
        assert!(FirstMatchIndex::build(&df, "NRIC").is_err());
    }
}
