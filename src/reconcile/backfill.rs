// src/reconcile/backfill.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::models::sales::SaleRecord;

use super::{
    dates::resolve_date,
    fields::{AliasTable, Field, RawRecord},
};

/// Campos que o backfill conseguiu derivar. Só vem preenchido o que está
/// nulo no registro; o resto fica `None` e não é escrito.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivedFields {
    pub amount: Option<Decimal>,
    pub rate: Option<Decimal>,
    pub qty: Option<i32>,
    pub date: Option<DateTime<Utc>>,
}

impl DerivedFields {
    pub fn is_empty(&self) -> bool {
        self.amount.is_none() && self.rate.is_none() && self.qty.is_none() && self.date.is_none()
    }
}

pub fn derive_missing(record: &SaleRecord, aliases: &AliasTable) -> DerivedFields {
    let raw = RawRecord::new(&record.raw_json);

    let rate = raw.decimal(aliases, Field::Rate);
    let qty = raw.int(aliases, Field::Qty);
    let amount = raw.decimal(aliases, Field::Amount).or_else(|| {
        let rate = record.rate.or(rate)?;
        let qty = record.qty.or(qty)?;
        Some(rate.saturating_mul(Decimal::from(qty)))
    });

    DerivedFields {
        amount: fill(&record.amount, amount),
        rate: fill(&record.rate, rate),
        qty: fill(&record.qty, qty),
        date: if record.date.is_none() { resolve_date(record, aliases) } else { None },
    }
}

fn fill<T>(current: &Option<T>, derived: Option<T>) -> Option<T> {
    if current.is_some() { None } else { derived }
}
