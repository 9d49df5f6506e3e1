// src/services/sales_service.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::SalesStore,
    models::{
        reports::{CountsReport, DateRange},
        sales::SalesChannel,
    },
    reconcile::{aggregate, ChannelProfiles},
};

#[derive(Clone)]
pub struct SalesService {
    profiles: Arc<ChannelProfiles>,
    row_cap: i64,
}

impl SalesService {
    pub fn new(profiles: Arc<ChannelProfiles>, row_cap: i64) -> Self {
        Self { profiles, row_cap }
    }

    /// Contagens de um canal. Lê no máximo `row_cap` linhas, as mais novas
    /// primeiro; se havia mais que isso o relatório sai marcado como `capped`.
    pub async fn get_counts<S: SalesStore>(
        &self,
        store: &S,
        channel: SalesChannel,
        range: Option<&DateRange>,
    ) -> Result<CountsReport, AppError> {
        // Uma linha a mais só para saber se o teto cortou alguma coisa
        let mut records = store
            .fetch_for_report(channel, range, self.row_cap.saturating_add(1))
            .await?;

        let capped = records.len() as i64 > self.row_cap;
        if capped {
            records.truncate(self.row_cap as usize);
            tracing::warn!(
                %channel,
                row_cap = self.row_cap,
                "⚠️ Teto de linhas atingido; contagens cobrem só as linhas mais recentes"
            );
        }

        let profile = self.profiles.get(channel);
        let counts = aggregate(&records, range, &profile.aliases);

        tracing::debug!(
            %channel,
            scanned = records.len(),
            total_count = counts.total_count,
            "contagens calculadas"
        );

        Ok(CountsReport { counts, capped })
    }
}
