use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::classify::count_by_status;
use crate::error::TrackError;
use crate::model::{Dataset, Record, Status};
use crate::schema::LogicalField;

// ---------------------------------------------------------------------------
// Daily summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct DailySummary<'a> {
    pub date: NaiveDate,
    pub count: usize,
    pub total_value: f64,
    pub records: Vec<&'a Record>,
}

impl DailySummary<'_> {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Records requisitioned on exactly `date`.
///
/// Errors when the dataset has no requisition date column; an existing
/// column with no matching rows yields an empty summary instead.
pub fn daily_summary(dataset: &Dataset, date: NaiveDate) -> Result<DailySummary<'_>, TrackError> {
    dataset
        .schema()
        .require(LogicalField::RequisitionDate, "daily summary")?;

    let records: Vec<&Record> = dataset
        .records()
        .iter()
        .filter(|r| r.requisition_date == Some(date))
        .collect();
    let total_value = records.iter().filter_map(|r| r.total_value).sum();

    Ok(DailySummary {
        date,
        count: records.len(),
        total_value,
        records,
    })
}

// ---------------------------------------------------------------------------
// Daily trend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayTotals {
    pub date: NaiveDate,
    pub count: usize,
    pub total_value: f64,
}

/// Per-day record count and value, ascending by date. Undated rows are skipped.
pub fn daily_trend(dataset: &Dataset) -> Result<Vec<DayTotals>, TrackError> {
    dataset
        .schema()
        .require(LogicalField::RequisitionDate, "daily trend")?;

    let mut days: BTreeMap<NaiveDate, (usize, f64)> = BTreeMap::new();
    for r in dataset.records() {
        if let Some(date) = r.requisition_date {
            let entry = days.entry(date).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += r.total_value.unwrap_or(0.0);
        }
    }

    Ok(days
        .into_iter()
        .map(|(date, (count, total_value))| DayTotals {
            date,
            count,
            total_value,
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Overview
// ---------------------------------------------------------------------------

/// Free-text markers looked for in the remark column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemarkKeywords {
    pub pending: Vec<String>,
    pub received: Vec<String>,
}

impl Default for RemarkKeywords {
    fn default() -> Self {
        Self {
            pending: vec!["รอ".into(), "Pending".into()],
            received: vec!["เข้าแล้ว".into(), "Received".into(), "ครบ".into()],
        }
    }
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    let hay = haystack.to_lowercase();
    needles
        .iter()
        .filter(|n| !n.is_empty())
        .any(|n| hay.contains(&n.to_lowercase()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RemarkCounts {
    pub pending: usize,
    pub received: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub total: usize,
    pub by_status: BTreeMap<Status, usize>,
    /// `None` when the remark column is missing.
    pub remarks: Option<RemarkCounts>,
    /// `None` when the amount column is missing.
    pub total_value: Option<f64>,
}

pub fn overview(dataset: &Dataset, keywords: &RemarkKeywords) -> Overview {
    let records = dataset.records();
    let schema = dataset.schema();

    let remarks = schema.has(LogicalField::Remark).then(|| {
        let mut counts = RemarkCounts { pending: 0, received: 0 };
        for remark in records.iter().filter_map(|r| r.remark.as_deref()) {
            if contains_any(remark, &keywords.pending) {
                counts.pending += 1;
            }
            if contains_any(remark, &keywords.received) {
                counts.received += 1;
            }
        }
        counts
    });

    let total_value = schema
        .has(LogicalField::TotalValue)
        .then(|| records.iter().filter_map(|r| r.total_value).sum());

    Overview {
        total: records.len(),
        by_status: count_by_status(records),
        remarks,
        total_value,
    }
}
