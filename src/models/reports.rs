// src/models/reports.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

// Intervalo de datas inclusivo; qualquer um dos limites pode faltar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start.is_none_or(|start| at >= start) && self.end.is_none_or(|end| at <= end)
    }
}

// Os números dos cards de vendas
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalesCounts {
    #[schema(example = 3)]
    pub total_count: u64,

    #[schema(value_type = f64, example = 200.0)]
    pub total_amount: Decimal,

    #[schema(example = 2)]
    pub unique_customers: u64,

    #[schema(example = 1)]
    pub refund_count: u64,
}

// Resultado do service: as contagens e se o teto de linhas foi atingido
#[derive(Debug, Clone, PartialEq)]
pub struct CountsReport {
    pub counts: SalesCounts,
    pub capped: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalesCountsResponse {
    #[schema(example = true)]
    pub ok: bool,

    #[serde(flatten)]
    pub counts: SalesCounts,

    // true quando a leitura parou no teto (REPORT_ROW_CAP)
    #[schema(example = false)]
    pub capped: bool,
}

impl From<CountsReport> for SalesCountsResponse {
    fn from(report: CountsReport) -> Self {
        Self {
            ok: true,
            counts: report.counts,
            capped: report.capped,
        }
    }
}
