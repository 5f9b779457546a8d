use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::model::{Record, Status};

/// Derive the status from the two fields that drive it.
///
/// Order matters: a recorded receipt wins over everything, then an issued PO,
/// otherwise the requisition is still pending.
pub fn derive_status(received_date: Option<NaiveDate>, po_number: Option<&str>) -> Status {
    if received_date.is_some() {
        Status::Received
    } else if po_number.is_some_and(|po| !po.trim().is_empty()) {
        Status::PoIssued
    } else {
        Status::Pending
    }
}

pub fn classify(record: &Record) -> Status {
    derive_status(record.received_date, record.po_number.as_deref())
}

/// Count records per status. All statuses are present, zero allowed.
pub fn count_by_status<'a, I>(records: I) -> BTreeMap<Status, usize>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut counts: BTreeMap<Status, usize> = Status::ALL.into_iter().map(|s| (s, 0)).collect();
    for r in records {
        *counts.entry(r.status).or_insert(0) += 1;
    }
    counts
}
