//! `prtrack-core`: schema reconciliation and status classification for
//! purchase-requisition control sheets.
//!
//! Pure crate: receives a raw string table, returns typed records with a
//! derived status. No file IO.

pub mod classify;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod model;
pub mod schema;
pub mod summary;
pub mod value;

pub use classify::classify;
pub use error::TrackError;
pub use filter::{filter, remark_values, RecordFilter};
pub use model::{Dataset, RawTable, Record, Status};
pub use schema::{resolve, AliasTable, LogicalField, Schema};
pub use summary::{daily_summary, daily_trend, overview, DailySummary, Overview, RemarkKeywords};
pub use value::ParseOptions;
