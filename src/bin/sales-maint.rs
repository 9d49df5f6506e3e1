// src/bin/sales-maint.rs

use std::{path::PathBuf, sync::Arc};

use clap::{Parser, Subcommand};

use sales_backend::{
    config::{self, Settings},
    db::PgSalesStore,
    models::sales::SalesChannel,
    services::{import_service::read_rows, BackfillService, ImportService},
};

#[derive(Parser)]
#[command(name = "sales-maint")]
#[command(version, about = "Manutenção das tabelas de vendas (backfill e importação)")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Preenche amount/rate/qty/date a partir do rawJson onde estiverem nulos
    Backfill {
        /// Só este canal (padrão: todos)
        #[arg(long)]
        channel: Option<SalesChannel>,

        /// Tamanho do lote (padrão: BACKFILL_BATCH_SIZE)
        #[arg(long, value_parser = clap::value_parser!(i64).range(1..))]
        limit: Option<i64>,
    },

    /// Importa uma planilha exportada (.csv ou .json) para um canal
    Import {
        /// Canal de destino
        channel: SalesChannel,

        /// Caminho do arquivo
        file: PathBuf,

        /// Só mostra o resultado, não grava no banco
        #[arg(short, long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    config::init_tracing();

    let cli = Cli::parse();
    let settings = Settings::from_env()?;
    let profiles = Arc::new(settings.load_profiles()?);

    match cli.command {
        Commands::Backfill { channel, limit } => {
            let batch_size = limit.unwrap_or(settings.backfill_batch_size);
            let service = BackfillService::new(profiles, batch_size);
            let store = PgSalesStore::new(config::connect_pool(&settings).await?);

            let channels: Vec<SalesChannel> = match channel {
                Some(channel) => vec![channel],
                None => SalesChannel::ALL.to_vec(),
            };

            let mut failed_channels = Vec::new();
            for channel in channels {
                match service.run_channel(&store, channel).await {
                    Ok(stats) => tracing::info!(
                        %channel,
                        batches = stats.batches,
                        processed = stats.processed,
                        updated = stats.updated,
                        failed = stats.failed,
                        "✅ Backfill concluído"
                    ),
                    Err(e) => {
                        tracing::error!(%channel, "🔥 Backfill interrompido: {}", e);
                        failed_channels.push(channel.to_string());
                    }
                }
            }

            anyhow::ensure!(
                failed_channels.is_empty(),
                "Backfill falhou nos canais: {}",
                failed_channels.join(", ")
            );
        }

        Commands::Import { channel, file, dry_run } => {
            let rows = read_rows(&file)?;
            let service = ImportService::new(profiles);
            let prepared = service.prepare(channel, rows);

            if dry_run {
                tracing::info!(
                    %channel,
                    received = prepared.received,
                    ready = prepared.records.len(),
                    repeated_in_file = prepared.repeated_in_file,
                    blank = prepared.blank,
                    "Simulação: nada foi gravado"
                );
                return Ok(());
            }

            let store = PgSalesStore::new(config::connect_pool(&settings).await?);
            service.persist(&store, channel, prepared).await?;
        }
    }

    Ok(())
}
