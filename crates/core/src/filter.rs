//! Search + status/remark selection over a loaded dataset.
//!
//! Filtering never touches the dataset: results are borrowed records in
//! source order.

use std::collections::BTreeSet;

use crate::model::{Dataset, Record, Status};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    /// Case-insensitive substring over item description, PR number, PO number.
    pub query: Option<String>,
    /// Empty or all three statuses means "any status".
    pub statuses: BTreeSet<Status>,
    /// Exact remark values; empty means "any remark".
    pub remarks: BTreeSet<String>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn status(mut self, status: Status) -> Self {
        self.statuses.insert(status);
        self
    }

    pub fn statuses(mut self, statuses: impl IntoIterator<Item = Status>) -> Self {
        self.statuses.extend(statuses);
        self
    }

    pub fn remark(mut self, remark: impl Into<String>) -> Self {
        self.remarks.insert(remark.into());
        self
    }

    fn needle(&self) -> Option<String> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase)
    }

    fn filters_status(&self) -> bool {
        !self.statuses.is_empty() && self.statuses.len() < Status::ALL.len()
    }

    /// True when this filter keeps every record.
    pub fn is_pass_through(&self) -> bool {
        self.needle().is_none() && !self.filters_status() && self.remarks.is_empty()
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.matches_with(record, self.needle().as_deref())
    }

    fn matches_with(&self, record: &Record, needle: Option<&str>) -> bool {
        if let Some(needle) = needle {
            let hit = record.item_description.to_lowercase().contains(needle)
                || record.pr_number.to_lowercase().contains(needle)
                || record
                    .po_number
                    .as_deref()
                    .is_some_and(|po| po.to_lowercase().contains(needle));
            if !hit {
                return false;
            }
        }

        if self.filters_status() && !self.statuses.contains(&record.status) {
            return false;
        }

        if !self.remarks.is_empty() {
            match record.remark.as_deref() {
                Some(remark) if self.remarks.contains(remark) => {}
                _ => return false,
            }
        }

        true
    }

    pub fn apply<'a>(&self, dataset: &'a Dataset) -> Vec<&'a Record> {
        let needle = self.needle();
        dataset
            .records()
            .iter()
            .filter(|r| self.matches_with(r, needle.as_deref()))
            .collect()
    }
}

/// Query + status selection.
pub fn filter<'a>(
    dataset: &'a Dataset,
    query: Option<&str>,
    statuses: &BTreeSet<Status>,
) -> Vec<&'a Record> {
    RecordFilter {
        query: query.map(str::to_string),
        statuses: statuses.clone(),
        remarks: BTreeSet::new(),
    }
    .apply(dataset)
}

/// Distinct remark values in first-seen order.
pub fn remark_values(dataset: &Dataset) -> Vec<&str> {
    let mut seen = BTreeSet::new();
    dataset
        .records()
        .iter()
        .filter_map(|r| r.remark.as_deref())
        .filter(|r| seen.insert(*r))
        .collect()
}
