// src/models/sales.rs

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use thiserror::Error;
use utoipa::ToSchema;

// --- Canais de venda ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SalesChannel {
    #[default]
    Online,         // Loja virtual
    OfflineCounter, // Balcão
    EventA,
    EventB,
}

#[derive(Debug, Clone, Error)]
#[error("Canal de venda desconhecido: '{0}'")]
pub struct UnknownChannel(pub String);

impl SalesChannel {
    pub const ALL: [SalesChannel; 4] = [
        SalesChannel::Online,
        SalesChannel::OfflineCounter,
        SalesChannel::EventA,
        SalesChannel::EventB,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            SalesChannel::Online => "online",
            SalesChannel::OfflineCounter => "offline-counter",
            SalesChannel::EventA => "event-a",
            SalesChannel::EventB => "event-b",
        }
    }

    // Cada canal tem a sua própria tabela.
    // Os nomes são fixos aqui, nunca vêm da requisição.
    pub fn table_name(&self) -> &'static str {
        match self {
            SalesChannel::Online => "sales_online",
            SalesChannel::OfflineCounter => "sales_offline_counter",
            SalesChannel::EventA => "sales_event_a",
            SalesChannel::EventB => "sales_event_b",
        }
    }
}

impl fmt::Display for SalesChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for SalesChannel {
    type Err = UnknownChannel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        SalesChannel::ALL
            .into_iter()
            .find(|channel| channel.slug() == wanted)
            .ok_or_else(|| UnknownChannel(s.to_string()))
    }
}

impl TryFrom<String> for SalesChannel {
    type Error = UnknownChannel;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// --- Registro de venda (uma linha por transação, qualquer canal) ---

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SaleRecord {
    pub id: i64,

    #[sqlx(try_from = "String")]
    pub source: SalesChannel,

    // Identidade
    pub order_no: Option<String>,
    pub isbn: Option<String>, // Código do produto
    pub title: Option<String>,
    pub customer_name: Option<String>,
    pub mobile: Option<String>,
    pub email: Option<String>,

    // Valores (podem estar nulos em linhas antigas; o backfill preenche)
    pub amount: Option<Decimal>,
    pub rate: Option<Decimal>,
    pub qty: Option<i32>,
    pub payment_mode: Option<String>,

    // Datas
    pub date: Option<DateTime<Utc>>,
    pub month: Option<String>, // Só usados quando `date` não existe
    pub year: Option<i32>,

    // Linha original da planilha, nunca reescrita
    pub raw_json: Value,

    pub row_hash: Option<String>,
    pub order_status: Option<String>,
    pub created_at: DateTime<Utc>,
}
