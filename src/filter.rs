//! Filtered views and keyword search.
//!
//! A [`FilteredView`] borrows matching records from the [`Dataset`] in
//! dataset order. Views are rebuilt on every interaction and never stored.

use serde::Serialize;

use crate::models::{CommentRecord, Dataset, FilterCriteria};

/// The subset of a dataset matching a [`FilterCriteria`].
#[derive(Debug, Clone, Default)]
pub struct FilteredView<'a> {
    records: Vec<&'a CommentRecord>,
}

impl<'a> FilteredView<'a> {
    pub fn from_records(records: Vec<&'a CommentRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[&'a CommentRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a CommentRecord> + '_ {
        self.records.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Keeps at most `n` records.
    pub fn truncated(&self, n: usize) -> FilteredView<'a> {
        FilteredView {
            records: self.records.iter().take(n).copied().collect(),
        }
    }
}

impl Serialize for FilteredView<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.records.iter())
    }
}

/// Selects the records matching `criteria`.
pub fn apply<'a>(dataset: &'a Dataset, criteria: &FilterCriteria) -> FilteredView<'a> {
    FilteredView {
        records: dataset
            .records()
            .iter()
            .filter(|r| criteria.matches(r))
            .collect(),
    }
}

/// Case-insensitive substring search across every field of each record.
///
/// An empty or whitespace-only keyword returns the view unchanged.
pub fn search<'a>(view: &FilteredView<'a>, keyword: &str) -> FilteredView<'a> {
    let needle = keyword.trim().to_lowercase();
    if needle.is_empty() {
        return view.clone();
    }
    FilteredView {
        records: view
            .iter()
            .filter(|r| {
                r.field_strings()
                    .iter()
                    .any(|f| f.to_lowercase().contains(&needle))
            })
            .collect(),
    }
}
