//! Flat comma-separated exports.
//!
//! Fields are written through the `csv` crate, so values containing commas,
//! quotes or line breaks are quoted and survive a re-parse.

use ::csv::WriterBuilder;

use super::format_date;
use crate::errors::ServiceError;
use crate::services::analytics::MaterialRecords;
use crate::services::inventory::TransactionBoard;

/// Header of the combined product + rejection export.
pub const MATERIAL_ANALYTICS_HEADER: [&str; 7] = [
    "Type",
    "Date",
    "Material",
    "Category/Reason",
    "Quantity",
    "Price",
    "Total Value",
];

pub const TRANSACTION_HEADER: [&str; 6] =
    ["Status", "Date", "Material", "Quantity", "Amount", "Notes"];

fn write_rows<R>(header: &[&str], rows: R) -> Result<Vec<u8>, ServiceError>
where
    R: IntoIterator<Item = Vec<String>>,
{
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer
        .write_record(header)
        .map_err(|e| ServiceError::ExportError(format!("csv header: {}", e)))?;
    for row in rows {
        writer
            .write_record(&row)
            .map_err(|e| ServiceError::ExportError(format!("csv row: {}", e)))?;
    }
    writer
        .into_inner()
        .map_err(|e| ServiceError::ExportError(format!("csv flush: {}", e)))
}

/// Products then rejected items, each in fetch order, tagged by type.
pub fn material_analytics_csv(records: &MaterialRecords) -> Result<Vec<u8>, ServiceError> {
    let products = records.products.iter().map(|p| {
        vec![
            "Product".to_string(),
            format_date(p.created_at),
            p.name.clone(),
            p.category.clone(),
            p.quantity.to_string(),
            p.price.to_string(),
            p.value().to_string(),
        ]
    });
    let rejected = records.rejected_items.iter().map(|r| {
        vec![
            "Rejected".to_string(),
            format_date(r.created_at),
            r.product_name.clone(),
            r.reason.clone(),
            r.quantity.to_string(),
            String::new(),
            String::new(),
        ]
    });

    write_rows(&MATERIAL_ANALYTICS_HEADER, products.chain(rejected))
}

/// Approved then rejected transactions.
pub fn transactions_csv(board: &TransactionBoard) -> Result<Vec<u8>, ServiceError> {
    let rows = board
        .approved
        .iter()
        .chain(board.rejected.iter())
        .map(|t| {
            vec![
                t.status.to_string(),
                format_date(t.transaction_date),
                t.product_name.clone(),
                t.quantity.to_string(),
                t.amount.to_string(),
                t.notes.clone().unwrap_or_default(),
            ]
        });

    write_rows(&TRANSACTION_HEADER, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{ProductModel, RejectedItemModel, TransactionModel, TransactionStatus};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn parse(bytes: &[u8]) -> Vec<Vec<String>> {
        ::csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(bytes)
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn empty_export_still_has_header() {
        let bytes = material_analytics_csv(&MaterialRecords::default()).unwrap();
        assert!(!bytes.is_empty());
        let rows = parse(&bytes);
        assert_eq!(rows, vec![MATERIAL_ANALYTICS_HEADER.map(String::from).to_vec()]);
    }

    #[test]
    fn rows_are_tagged_and_keep_fetch_order() {
        let records = MaterialRecords {
            products: vec![
                ProductModel {
                    id: Uuid::new_v4(),
                    name: "Telur".into(),
                    category: "Protein".into(),
                    color: None,
                    quantity: 30,
                    price: dec!(2000),
                    created_at: Utc.with_ymd_and_hms(2025, 1, 5, 0, 0, 0).unwrap(),
                },
                ProductModel {
                    id: Uuid::new_v4(),
                    name: "Beras".into(),
                    category: "Bahan Pokok".into(),
                    color: None,
                    quantity: 10,
                    price: dec!(12000),
                    created_at: Utc.with_ymd_and_hms(2025, 1, 4, 0, 0, 0).unwrap(),
                },
            ],
            rejected_items: vec![RejectedItemModel {
                id: Uuid::new_v4(),
                product_name: "Sayur Bayam".into(),
                quantity: 3,
                reason: "layu".into(),
                created_at: Utc.with_ymd_and_hms(2025, 1, 3, 0, 0, 0).unwrap(),
            }],
            ..Default::default()
        };

        let rows = parse(&material_analytics_csv(&records).unwrap());
        assert_eq!(rows.len(), 4);
        assert_eq!(
            rows[1],
            vec!["Product", "2025-01-05", "Telur", "Protein", "30", "2000", "60000"]
        );
        assert_eq!(rows[2][2], "Beras");
        assert_eq!(
            rows[3],
            vec!["Rejected", "2025-01-03", "Sayur Bayam", "layu", "3", "", ""]
        );
    }

    #[test]
    fn delimiter_quotes_and_newlines_round_trip() {
        let records = MaterialRecords {
            rejected_items: vec![RejectedItemModel {
                id: Uuid::new_v4(),
                product_name: "Gula, pasir \"premium\"".into(),
                quantity: 1,
                reason: "basah,\nmenggumpal".into(),
                created_at: Utc::now(),
            }],
            ..Default::default()
        };

        let rows = parse(&material_analytics_csv(&records).unwrap());
        assert!(rows.iter().all(|r| r.len() == MATERIAL_ANALYTICS_HEADER.len()));
        assert_eq!(rows[1][2], "Gula, pasir \"premium\"");
        assert_eq!(rows[1][3], "basah,\nmenggumpal");
    }

    #[test]
    fn transaction_export_lists_approved_before_rejected() {
        let tx = |status, name: &str| TransactionModel {
            id: Uuid::new_v4(),
            product_name: name.into(),
            quantity: 2,
            amount: dec!(5000),
            status,
            notes: None,
            transaction_date: Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap(),
        };
        let board = TransactionBoard::from_transactions(vec![
            tx(TransactionStatus::Rejected, "Minyak"),
            tx(TransactionStatus::Pending, "Garam"),
            tx(TransactionStatus::Approved, "Beras"),
        ]);

        let rows = parse(&transactions_csv(&board).unwrap());
        assert_eq!(rows[0], TRANSACTION_HEADER.map(String::from).to_vec());
        assert_eq!(rows[1][0], "approved");
        assert_eq!(rows[2][0], "rejected");
        assert_eq!(rows.len(), 3);
    }
}
