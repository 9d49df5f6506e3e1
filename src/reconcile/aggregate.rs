// src/reconcile/aggregate.rs

use std::collections::HashSet;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::{
    reports::{DateRange, SalesCounts},
    sales::SaleRecord,
};

use super::{
    dates::resolve_date,
    fields::{structured_or_raw, AliasTable, Field, RawRecord},
};

/// Resume as vendas. Registros com data resolvida fora do intervalo ficam de
/// fora; registros sem data entram sempre.
pub fn aggregate<'a, I>(records: I, range: Option<&DateRange>, aliases: &AliasTable) -> SalesCounts
where
    I: IntoIterator<Item = &'a SaleRecord>,
{
    let mut total_count = 0u64;
    let mut total_amount = Decimal::ZERO;
    let mut customers: HashSet<String> = HashSet::new();
    let mut refund_count = 0u64;

    for record in records {
        if let Some(range) = range {
            if resolve_date(record, aliases).is_some_and(|at| !range.contains(at)) {
                continue;
            }
        }

        total_count += 1;
        total_amount = total_amount.saturating_add(record_amount(record, aliases));

        let key = customer_key(record, aliases);
        if !key.is_empty() {
            customers.insert(key);
        }

        if is_refund(record, aliases) {
            refund_count += 1;
        }
    }

    SalesCounts {
        total_count,
        total_amount: round_currency(total_amount),
        unique_customers: customers.len() as u64,
        refund_count,
    }
}

/// Valor da venda: `amount` estruturado (se diferente de zero), depois o
/// valor monetário do rawJson, depois `rate × qty`.
pub fn record_amount(record: &SaleRecord, aliases: &AliasTable) -> Decimal {
    if let Some(amount) = record.amount.filter(|amount| !amount.is_zero()) {
        return amount;
    }

    let raw = RawRecord::new(&record.raw_json);
    if let Some(amount) = raw.decimal(aliases, Field::Amount).filter(|amount| !amount.is_zero()) {
        return amount;
    }

    let rate = record
        .rate
        .or_else(|| raw.decimal(aliases, Field::Rate))
        .unwrap_or(Decimal::ZERO);
    let qty = record
        .qty
        .map(Decimal::from)
        .or_else(|| raw.decimal(aliases, Field::Qty))
        .unwrap_or(Decimal::ZERO);

    rate.saturating_mul(qty)
}

/// `email|mobile|nome`, partes vazias omitidas. Vazio = cliente anônimo.
pub fn customer_key(record: &SaleRecord, aliases: &AliasTable) -> String {
    let raw = RawRecord::new(&record.raw_json);
    [
        (record.email.as_deref(), Field::Email),
        (record.mobile.as_deref(), Field::Mobile),
        (record.customer_name.as_deref(), Field::CustomerName),
    ]
    .into_iter()
    .filter_map(|(structured, field)| structured_or_raw(structured, raw, aliases, field))
    .map(|part| part.trim().to_lowercase())
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join("|")
}

pub fn resolved_status(record: &SaleRecord, aliases: &AliasTable) -> Option<String> {
    let raw = RawRecord::new(&record.raw_json);
    structured_or_raw(record.order_status.as_deref(), raw, aliases, Field::OrderStatus)
}

// Igualdade exata (sem diferenciar caixa), nunca substring
pub fn is_refund(record: &SaleRecord, aliases: &AliasTable) -> bool {
    resolved_status(record, aliases).is_some_and(|status| status.trim().eq_ignore_ascii_case("refunded"))
}

pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
