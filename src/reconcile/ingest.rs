// src/reconcile/ingest.rs

use serde_json::{Map, Value};

use crate::models::sales::{SaleRecord, SalesChannel};

use super::{
    backfill::derive_missing,
    fields::{Field, RawRecord},
    profiles::ChannelProfile,
    row_hash::row_hash,
};

/// Monta o registro de uma linha da planilha. O rawJson é guardado como
/// veio; os campos estruturados saem dos apelidos do perfil do canal.
/// Linhas em branco retornam `None`.
pub fn build_record(
    channel: SalesChannel,
    row: Map<String, Value>,
    profile: &ChannelProfile,
) -> Option<SaleRecord> {
    let raw = RawRecord::from_map(&row);
    if raw.is_blank() {
        return None;
    }

    let aliases = &profile.aliases;
    let mut record = SaleRecord {
        source: channel,
        order_no: raw.text(aliases, Field::OrderNo),
        isbn: raw.text(aliases, Field::ProductCode),
        title: raw.text(aliases, Field::Title),
        customer_name: raw.text(aliases, Field::CustomerName),
        mobile: raw.text(aliases, Field::Mobile),
        email: raw.text(aliases, Field::Email),
        payment_mode: raw.text(aliases, Field::PaymentMode),
        month: raw.text(aliases, Field::Month),
        year: raw.int(aliases, Field::Year),
        order_status: raw.text(aliases, Field::OrderStatus),
        ..Default::default()
    };

    record.raw_json = Value::Object(row);
    record.row_hash = Some(row_hash(&record.raw_json, profile));

    let derived = derive_missing(&record, aliases);
    record.amount = derived.amount;
    record.rate = derived.rate;
    record.qty = derived.qty;
    record.date = derived.date;

    Some(record)
}
