//! Property-based tests for the analytics aggregator and the CSV export.
//!
//! These tests use proptest to verify invariants across a wide range of inputs,
//! helping to catch edge cases that unit tests might miss.

use bahan_baku_api::{
    entities::{FoodConditionModel, ProductModel, RejectedItemModel},
    reports::csv::{material_analytics_csv, MATERIAL_ANALYTICS_HEADER},
    services::analytics::{aggregate, MaterialRecords},
};
use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

// Strategies for generating test data
fn product_strategy() -> impl Strategy<Value = ProductModel> {
    (
        "[A-Za-z ,\"]{1,20}",
        0i32..100_000,
        (0i64..10_000_000, 0u32..3),
        0i64..1_000_000_000,
    )
        .prop_map(|(name, quantity, (mantissa, scale), secs)| ProductModel {
            id: Uuid::new_v4(),
            name,
            category: "Bahan Pokok".to_string(),
            color: None,
            quantity,
            price: Decimal::new(mantissa, scale),
            created_at: Utc.timestamp_opt(secs, 0).unwrap(),
        })
}

fn rejected_strategy() -> impl Strategy<Value = RejectedItemModel> {
    ("[a-z]{1,12}", 0i32..10_000, "[a-z ,\"\n]{1,30}").prop_map(|(name, quantity, reason)| {
        RejectedItemModel {
            id: Uuid::new_v4(),
            product_name: name,
            quantity,
            reason,
            created_at: Utc::now(),
        }
    })
}

fn inspection(fit: bool) -> FoodConditionModel {
    FoodConditionModel {
        id: Uuid::new_v4(),
        product_name: "Sayur".to_string(),
        condition: if fit { "good" } else { "wilted" }.to_string(),
        fit_for_processing: fit,
        inspection_date: Utc::now(),
    }
}

// Property: total value is a plain sum and ignores ordering
proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn total_value_is_order_independent(
        products in prop::collection::vec(product_strategy(), 0..30),
        seed in any::<u64>(),
    ) {
        let expected: Decimal = products
            .iter()
            .map(|p| p.price * Decimal::from(p.quantity))
            .sum();

        let mut shuffled = products.clone();
        if !shuffled.is_empty() {
            let len = shuffled.len();
            shuffled.rotate_left((seed as usize) % len);
            shuffled.reverse();
        }

        let original = aggregate(&MaterialRecords { products, ..Default::default() });
        let reordered = aggregate(&MaterialRecords { products: shuffled, ..Default::default() });

        prop_assert_eq!(original.total_value, expected);
        prop_assert_eq!(reordered.total_value, expected);
        prop_assert_eq!(original.total_stock, reordered.total_stock);
    }

    #[test]
    fn pass_rate_stays_within_bounds(flags in prop::collection::vec(any::<bool>(), 0..50)) {
        let records = MaterialRecords {
            food_conditions: flags.iter().copied().map(inspection).collect(),
            ..Default::default()
        };
        let metrics = aggregate(&records);

        prop_assert!(metrics.pass_rate >= Decimal::ZERO);
        prop_assert!(metrics.pass_rate <= Decimal::from(100));
        prop_assert_eq!(metrics.pass_rate.scale(), 1);
        if flags.is_empty() {
            prop_assert_eq!(metrics.pass_rate, Decimal::ZERO);
        }
    }
}

// Property: every CSV row re-parses to the header's field count
proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn csv_rows_round_trip(
        products in prop::collection::vec(product_strategy(), 0..10),
        rejected in prop::collection::vec(rejected_strategy(), 0..10),
    ) {
        let records = MaterialRecords {
            products: products.clone(),
            rejected_items: rejected.clone(),
            ..Default::default()
        };
        let bytes = material_analytics_csv(&records).unwrap();

        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        prop_assert_eq!(reader.headers().unwrap().len(), MATERIAL_ANALYTICS_HEADER.len());

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        prop_assert_eq!(rows.len(), products.len() + rejected.len());
        for row in &rows {
            prop_assert_eq!(row.len(), MATERIAL_ANALYTICS_HEADER.len());
        }
        for (row, product) in rows.iter().zip(products.iter()) {
            prop_assert_eq!(&row[2], product.name.as_str());
        }
        for (row, item) in rows.iter().skip(products.len()).zip(rejected.iter()) {
            prop_assert_eq!(&row[3], item.reason.as_str());
        }
    }
}
