// src/services/backfill_service.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::SalesStore,
    models::sales::SalesChannel,
    reconcile::{derive_missing, ChannelProfiles},
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BackfillStats {
    pub batches: u64,
    pub processed: u64,
    pub updated: u64,
    pub failed: u64,
    pub last_id: i64,
}

#[derive(Clone)]
pub struct BackfillService {
    profiles: Arc<ChannelProfiles>,
    batch_size: i64,
}

impl BackfillService {
    pub fn new(profiles: Arc<ChannelProfiles>, batch_size: i64) -> Self {
        Self { profiles, batch_size }
    }

    /// Percorre o canal em lotes, por id crescente, preenchendo o que dá
    /// para derivar do rawJson. Erro ao escrever uma linha é logado e a
    /// linha é pulada; erro ao buscar um lote interrompe o canal.
    pub async fn run_channel<S: SalesStore>(
        &self,
        store: &S,
        channel: SalesChannel,
    ) -> Result<BackfillStats, AppError> {
        let aliases = &self.profiles.get(channel).aliases;
        let mut stats = BackfillStats::default();

        loop {
            let batch = store
                .fetch_missing_derived(channel, stats.last_id, self.batch_size)
                .await?;

            if batch.is_empty() {
                break;
            }
            stats.batches += 1;

            for record in &batch {
                stats.processed += 1;
                stats.last_id = record.id;

                let derived = derive_missing(record, aliases);
                if derived.is_empty() {
                    continue;
                }

                match store.fill_derived(channel, record.id, &derived).await {
                    Ok(rows) => stats.updated += rows,
                    Err(e) => {
                        stats.failed += 1;
                        tracing::warn!(%channel, id = record.id, "🔥 Falha ao atualizar registro: {}", e);
                    }
                }
            }

            tracing::info!(
                %channel,
                batch = stats.batches,
                processed = stats.processed,
                updated = stats.updated,
                failed = stats.failed,
                last_id = stats.last_id,
                "lote de backfill concluído"
            );
        }

        Ok(stats)
    }
}
