use std::sync::Arc;

use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use sales_backend::{
    models::{
        reports::DateRange,
        sales::{SaleRecord, SalesChannel},
    },
    reconcile::{aggregate, derive_missing, AliasTable, ChannelProfiles},
    services::ImportService,
};

fn record(raw: Value) -> SaleRecord {
    SaleRecord {
        raw_json: raw,
        ..Default::default()
    }
}

fn rows(values: Vec<Value>) -> Vec<serde_json::Map<String, Value>> {
    values
        .into_iter()
        .map(|value| value.as_object().cloned().unwrap())
        .collect()
}

#[test]
fn mixed_channel_rows_add_up() {
    let records = vec![
        SaleRecord {
            amount: Some(dec!(100)),
            order_status: Some("Refunded".into()),
            ..record(json!({}))
        },
        record(json!({ "Rate": "50", "Qty": 2, "Customer Name": "Ana" })),
        record(json!({})),
    ];

    let counts = aggregate(&records, None, &AliasTable::default());
    assert_eq!(counts.total_count, 3);
    assert_eq!(counts.total_amount, dec!(200));
    assert_eq!(counts.refund_count, 1);
    assert_eq!(counts.unique_customers, 1);
}

#[test]
fn rate_and_quantity_as_text_cells_form_the_amount() {
    let records = vec![
        SaleRecord {
            amount: Some(dec!(100)),
            order_status: Some("Refunded".into()),
            ..record(json!({}))
        },
        record(json!({ "Rate": "50", "Qty": "2" })),
        record(json!({})),
    ];

    let counts = aggregate(&records, None, &AliasTable::default());
    assert_eq!(counts.total_count, 3);
    assert_eq!(counts.total_amount, dec!(200));
    assert_eq!(counts.refund_count, 1);
    assert_eq!(counts.unique_customers, 0);
}

#[test]
fn undated_rows_stay_in_any_range() {
    let range = DateRange {
        start: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
        end: Some(Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap()),
    };
    let records = vec![
        record(json!({ "Date": "15/01/2024", "Amount": 10 })),
        record(json!({ "Date": "15/03/2024", "Amount": 20 })),
        record(json!({ "Amount": 30 })),
        // Sem data, mas com mês/ano: 1º de fevereiro, fora do intervalo
        SaleRecord {
            month: Some("Feb".into()),
            year: Some(2024),
            ..record(json!({ "Amount": 40 }))
        },
    ];

    let counts = aggregate(&records, Some(&range), &AliasTable::default());
    assert_eq!(counts.total_count, 2);
    assert_eq!(counts.total_amount, dec!(40));
}

#[test]
fn customers_are_matched_case_insensitively() {
    let records = vec![
        record(json!({ "Email": "ANA@x.com", "Customer Name": "Ana" })),
        SaleRecord {
            email: Some(" ana@x.com".into()),
            customer_name: Some("ana".into()),
            ..record(json!({}))
        },
        record(json!({ "Email": "bia@x.com" })),
        record(json!({ "Amount": 5 })),
    ];

    let counts = aggregate(&records, None, &AliasTable::default());
    assert_eq!(counts.unique_customers, 2);
}

#[test]
fn only_exact_refunded_status_counts() {
    let records = vec![
        record(json!({ "Order Status": "refunded" })),
        record(json!({ "Status": " REFUNDED " })),
        record(json!({ "Order Status": "Partially Refunded" })),
        record(json!({ "Order Status": "Refund pending" })),
    ];

    let counts = aggregate(&records, None, &AliasTable::default());
    assert_eq!(counts.refund_count, 2);
}

#[test]
fn the_same_sheet_imported_twice_hashes_identically() {
    let service = ImportService::new(Arc::new(ChannelProfiles::default()));
    let sheet = || {
        rows(vec![
            json!({ "Order No": "A-1", "ISBN": "978-1", "Date": "01/02/2024", "Amount": "10" }),
            json!({ "Order No": "A-2", "ISBN": "978-1", "Date": "01/02/2024", "Amount": "10" }),
            json!({ "Order No": "A-1", "ISBN": "978-1", "Date": "01/02/2024", "Amount": "10" }),
        ])
    };

    let first = service.prepare(SalesChannel::Online, sheet());
    let second = service.prepare(SalesChannel::Online, sheet());

    assert_eq!(first.records.len(), 2);
    assert_eq!(first.repeated_in_file, 1);

    let hashes = |records: &[SaleRecord]| -> Vec<Option<String>> {
        records.iter().map(|r| r.row_hash.clone()).collect()
    };
    assert_eq!(hashes(&first.records), hashes(&second.records));
    assert_ne!(first.records[0].row_hash, first.records[1].row_hash);
}

#[test]
fn imported_rows_arrive_with_derived_fields() {
    let service = ImportService::new(Arc::new(ChannelProfiles::default()));
    let prepared = service.prepare(
        SalesChannel::EventA,
        rows(vec![json!({ "Order No": "E-9", "Rate": "25.50", "Qty": "4", "Date": "2024-05-10T09:30:00Z" })]),
    );

    let imported = &prepared.records[0];
    assert_eq!(imported.source, SalesChannel::EventA);
    assert_eq!(imported.amount, Some(dec!(102)));
    assert_eq!(imported.qty, Some(4));
    assert_eq!(imported.date, Some(Utc.with_ymd_and_hms(2024, 5, 10, 9, 30, 0).unwrap()));
}

#[test]
fn backfill_never_overwrites_present_values() {
    let existing = SaleRecord {
        amount: Some(dec!(99)),
        raw_json: json!({ "Amount": "10", "Rate": "5", "Qty": "2", "Date": "03/04/2024" }),
        ..Default::default()
    };

    let derived = derive_missing(&existing, &AliasTable::default());
    assert_eq!(derived.amount, None);
    assert_eq!(derived.rate, Some(dec!(5)));
    assert_eq!(derived.qty, Some(2));
    assert_eq!(derived.date, Some(Utc.with_ymd_and_hms(2024, 4, 3, 0, 0, 0).unwrap()));
}

#[test]
fn backfill_leaves_underivable_rows_alone() {
    let derived = derive_missing(&record(json!({ "Notes": "sem valores" })), &AliasTable::default());
    assert!(derived.is_empty());
}
