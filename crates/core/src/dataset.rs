use crate::classify::derive_status;
use crate::model::{Dataset, RawTable, Record};
use crate::schema::{AliasTable, LogicalField, Schema};
use crate::value::{non_empty, parse_date, parse_number, ParseOptions};

impl Dataset {
    /// Reconcile the table's headers against `aliases`, then build one record
    /// per data row with its derived status.
    pub fn from_table(table: RawTable, aliases: &AliasTable, opts: &ParseOptions) -> Self {
        let schema = Schema::reconcile(&table.headers, aliases);
        let drop_blank_pr = opts.drop_blank_pr && schema.has(LogicalField::PrNumber);

        let mut records = Vec::with_capacity(table.rows.len());
        let mut dropped_rows = 0;

        for (row_idx, row) in table.rows.iter().enumerate() {
            let cell = |field: LogicalField| -> Option<&str> {
                schema
                    .index(field)
                    .and_then(|i| row.get(i))
                    .map(String::as_str)
            };
            let text = |field: LogicalField| cell(field).and_then(non_empty);
            let date = |field: LogicalField| cell(field).and_then(|c| parse_date(c, opts.day_first));
            let number = |field: LogicalField| cell(field).and_then(parse_number);

            let pr_number = text(LogicalField::PrNumber).unwrap_or_default();
            if drop_blank_pr && pr_number.is_empty() {
                dropped_rows += 1;
                continue;
            }

            let po_number = text(LogicalField::PoNumber);
            let received_date = date(LogicalField::ReceivedDate);
            let status = derive_status(received_date, po_number.as_deref());

            records.push(Record {
                row: row_idx,
                pr_number,
                requisition_date: date(LogicalField::RequisitionDate),
                item_description: text(LogicalField::ItemDescription).unwrap_or_default(),
                po_number,
                received_date,
                quantity: number(LogicalField::Quantity),
                total_value: number(LogicalField::TotalValue),
                requisitioner: text(LogicalField::Requisitioner),
                vendor: text(LogicalField::Vendor),
                remark: text(LogicalField::Remark),
                status,
            });
        }

        if dropped_rows > 0 {
            log::warn!("dropped {dropped_rows} row(s) without a PR number");
        }
        for field in schema.missing() {
            if !field.dependent_features().is_empty() {
                log::warn!(
                    "no {} column; disabled: {}",
                    field,
                    field.dependent_features().join(", ")
                );
            }
        }

        Self {
            table,
            schema,
            records,
            dropped_rows,
        }
    }
}
