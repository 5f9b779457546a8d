use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::TrackError;

// ---------------------------------------------------------------------------
// Logical fields
// ---------------------------------------------------------------------------

/// Canonical attribute of a PR control row, independent of the physical
/// column name used by any given export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalField {
    PrNumber,
    RequisitionDate,
    ItemDescription,
    PoNumber,
    ReceivedDate,
    Quantity,
    TotalValue,
    Requisitioner,
    Vendor,
    Remark,
}

impl LogicalField {
    pub const ALL: [LogicalField; 10] = [
        LogicalField::PrNumber,
        LogicalField::RequisitionDate,
        LogicalField::ItemDescription,
        LogicalField::PoNumber,
        LogicalField::ReceivedDate,
        LogicalField::Quantity,
        LogicalField::TotalValue,
        LogicalField::Requisitioner,
        LogicalField::Vendor,
        LogicalField::Remark,
    ];

    /// Settings/JSON key.
    pub fn key(&self) -> &'static str {
        match self {
            Self::PrNumber => "pr_number",
            Self::RequisitionDate => "requisition_date",
            Self::ItemDescription => "item_description",
            Self::PoNumber => "po_number",
            Self::ReceivedDate => "received_date",
            Self::Quantity => "quantity",
            Self::TotalValue => "total_value",
            Self::Requisitioner => "requisitioner",
            Self::Vendor => "vendor",
            Self::Remark => "remark",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::PrNumber => "PR number",
            Self::RequisitionDate => "requisition date",
            Self::ItemDescription => "item description",
            Self::PoNumber => "PO number",
            Self::ReceivedDate => "received date",
            Self::Quantity => "quantity",
            Self::TotalValue => "total value",
            Self::Requisitioner => "requisitioner",
            Self::Vendor => "vendor",
            Self::Remark => "remark",
        }
    }

    /// Built-in alias priority list. First match wins.
    pub fn builtin_aliases(&self) -> &'static [&'static str] {
        match self {
            Self::PrNumber => &["Purchase Requisition", "PR NO.", "PR Number", "PR No", "PR_NO"],
            Self::RequisitionDate => &["Requisition Date", "PR Date", "DATE", "Date"],
            Self::ItemDescription => &[
                "Short Text",
                "ITEM DESCRIPTION",
                "Item Description",
                "Material Description",
                "Description",
            ],
            Self::PoNumber => &["Purchase Order", "PO NO.", "PO Number", "PO No", "PO_NO"],
            Self::ReceivedDate => &["Received Date", "GR Date", "Goods Receipt Date", "RECEIVED DATE"],
            Self::Quantity => &["Quantity Requested", "QTY", "Quantity", "Qty"],
            Self::TotalValue => &["Total Value", "AMOUNT", "Amount", "Total Amount", "Value"],
            Self::Requisitioner => &["Requisitioner", "Requested By", "REQUESTER"],
            Self::Vendor => &["Fixed Vendor", "Vendor", "Supplier", "VENDOR"],
            Self::Remark => &["REMARK", "Remark", "STATUS", "Status"],
        }
    }

    /// Views that are disabled when this field does not resolve.
    pub fn dependent_features(&self) -> &'static [&'static str] {
        match self {
            Self::PrNumber => &["PR search", "blank-PR row drop"],
            Self::RequisitionDate => &["daily summary", "daily trend"],
            Self::ItemDescription => &["item search"],
            Self::PoNumber => &["PO Issued status", "PO search"],
            Self::ReceivedDate => &["Received status"],
            Self::Quantity => &[],
            Self::TotalValue => &["total value"],
            Self::Requisitioner => &[],
            Self::Vendor => &[],
            Self::Remark => &["remark filter", "remark keyword counts"],
        }
    }
}

impl std::fmt::Display for LogicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for LogicalField {
    type Err = TrackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s).ok_or_else(|| TrackError::UnknownField(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Alias table
// ---------------------------------------------------------------------------

/// Declarative alias table: the built-in lists plus optional user aliases,
/// which are tried first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    extra: BTreeMap<LogicalField, Vec<String>>,
}

impl AliasTable {
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Prepend user aliases for one field. Repeated calls append in order.
    pub fn with_extra<I, S>(mut self, field: LogicalField, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra
            .entry(field)
            .or_default()
            .extend(aliases.into_iter().map(Into::into));
        self
    }

    /// Aliases for a field in priority order.
    pub fn aliases(&self, field: LogicalField) -> impl Iterator<Item = &str> + '_ {
        self.extra
            .get(&field)
            .into_iter()
            .flatten()
            .map(String::as_str)
            .chain(field.builtin_aliases().iter().copied())
    }

    /// Position of the first alias (in priority order) present in `columns`.
    pub fn resolve_index(&self, columns: &[String], field: LogicalField) -> Option<usize> {
        self.aliases(field)
            .find_map(|alias| columns.iter().position(|c| c == alias))
    }

    pub fn resolve<'a>(&self, columns: &'a [String], field: LogicalField) -> Option<&'a str> {
        self.resolve_index(columns, field).map(|i| columns[i].as_str())
    }
}

/// Resolve a logical field against the built-in alias table.
pub fn resolve<'a>(columns: &'a [String], field: LogicalField) -> Option<&'a str> {
    AliasTable::builtin().resolve(columns, field)
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedColumn {
    pub index: usize,
    pub name: String,
}

/// Resolution of every logical field against one header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    columns: BTreeMap<LogicalField, ResolvedColumn>,
    looked_for: BTreeMap<LogicalField, Vec<String>>,
}

impl Schema {
    pub fn reconcile(headers: &[String], aliases: &AliasTable) -> Self {
        let mut schema = Self::default();

        for field in LogicalField::ALL {
            match aliases.resolve_index(headers, field) {
                Some(index) => {
                    log::debug!("{} -> column '{}'", field.key(), headers[index]);
                    schema.columns.insert(
                        field,
                        ResolvedColumn {
                            index,
                            name: headers[index].clone(),
                        },
                    );
                }
                None => {
                    log::debug!("{} unresolved", field.key());
                    schema
                        .looked_for
                        .insert(field, aliases.aliases(field).map(str::to_string).collect());
                }
            }
        }

        schema
    }

    pub fn column(&self, field: LogicalField) -> Option<&ResolvedColumn> {
        self.columns.get(&field)
    }

    pub fn index(&self, field: LogicalField) -> Option<usize> {
        self.columns.get(&field).map(|c| c.index)
    }

    pub fn has(&self, field: LogicalField) -> bool {
        self.columns.contains_key(&field)
    }

    /// The resolved column, or a `FieldUnavailable` error naming `feature`.
    pub fn require(
        &self,
        field: LogicalField,
        feature: &'static str,
    ) -> Result<&ResolvedColumn, TrackError> {
        self.columns.get(&field).ok_or_else(|| TrackError::FieldUnavailable {
            field,
            feature,
            looked_for: self.looked_for.get(&field).cloned().unwrap_or_default(),
        })
    }

    pub fn missing(&self) -> impl Iterator<Item = LogicalField> + '_ {
        LogicalField::ALL.into_iter().filter(|f| !self.has(*f))
    }

    /// Aliases that were tried for an unresolved field.
    pub fn looked_for(&self, field: LogicalField) -> &[String] {
        self.looked_for.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn resolve_examples() {
        let a = cols(&["Purchase Requisition", "Short Text"]);
        assert_eq!(resolve(&a, LogicalField::PrNumber), Some("Purchase Requisition"));

        let b = cols(&["PR NO."]);
        assert_eq!(resolve(&b, LogicalField::PrNumber), Some("PR NO."));

        let empty: Vec<String> = Vec::new();
        assert_eq!(resolve(&empty, LogicalField::PrNumber), None);
    }

    #[test]
    fn alias_priority_beats_column_order() {
        // "PR NO." appears first in the file, but "Purchase Requisition" has priority.
        let c = cols(&["PR NO.", "Purchase Requisition"]);
        assert_eq!(resolve(&c, LogicalField::PrNumber), Some("Purchase Requisition"));
    }

    #[test]
    fn resolution_is_case_sensitive() {
        let c = cols(&["pr no."]);
        assert_eq!(resolve(&c, LogicalField::PrNumber), None);
    }

    #[test]
    fn user_aliases_tried_first() {
        let table = AliasTable::builtin().with_extra(LogicalField::PrNumber, ["เลขที่ PR"]);
        let c = cols(&["PR NO.", "เลขที่ PR"]);
        assert_eq!(table.resolve(&c, LogicalField::PrNumber), Some("เลขที่ PR"));

        let aliases: Vec<&str> = table.aliases(LogicalField::PrNumber).collect();
        assert_eq!(aliases[0], "เลขที่ PR");
        assert_eq!(aliases[1], "Purchase Requisition");
    }

    #[test]
    fn schema_reports_missing_fields() {
        let headers = cols(&["PR NO.", "ITEM DESCRIPTION", "QTY", "REMARK"]);
        let schema = Schema::reconcile(&headers, &AliasTable::builtin());

        assert_eq!(schema.index(LogicalField::PrNumber), Some(0));
        assert_eq!(schema.index(LogicalField::Quantity), Some(2));
        assert!(!schema.has(LogicalField::RequisitionDate));

        let err = schema
            .require(LogicalField::RequisitionDate, "daily summary")
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("daily summary unavailable"), "{msg}");
        assert!(msg.contains("Requisition Date"), "{msg}");

        let missing: Vec<_> = schema.missing().collect();
        assert!(missing.contains(&LogicalField::PoNumber));
        assert!(!missing.contains(&LogicalField::Remark));
    }

    #[test]
    fn field_keys_round_trip() {
        for f in LogicalField::ALL {
            assert_eq!(LogicalField::from_key(f.key()), Some(f));
        }
        assert!("pr".parse::<LogicalField>().is_err());
    }
}
