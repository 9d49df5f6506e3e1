// src/config.rs

use std::{env, fmt::Display, path::PathBuf, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{db::PgSalesStore, reconcile::ChannelProfiles, services::SalesService};

pub const DEFAULT_APP_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_REPORT_ROW_CAP: i64 = 100_000;
pub const DEFAULT_BACKFILL_BATCH_SIZE: i64 = 500;

// Tudo que vem do ambiente (.env)
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub jwt_secret: Option<String>, // Só o servidor exige
    pub app_addr: String,
    pub max_connections: u32,
    pub report_row_cap: i64,
    pub backfill_batch_size: i64,
    pub channel_profiles_path: Option<PathBuf>,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").ok().filter(|s| !s.is_empty());

        let report_row_cap = env_or("REPORT_ROW_CAP", DEFAULT_REPORT_ROW_CAP)?;
        let backfill_batch_size = env_or("BACKFILL_BATCH_SIZE", DEFAULT_BACKFILL_BATCH_SIZE)?;
        anyhow::ensure!(report_row_cap > 0, "REPORT_ROW_CAP deve ser positivo");
        anyhow::ensure!(backfill_batch_size > 0, "BACKFILL_BATCH_SIZE deve ser positivo");

        Ok(Self {
            database_url,
            jwt_secret,
            app_addr: env_or("APP_ADDR", DEFAULT_APP_ADDR.to_string())?,
            max_connections: env_or("DATABASE_MAX_CONNECTIONS", 5)?,
            report_row_cap,
            backfill_batch_size,
            channel_profiles_path: env::var("CHANNEL_PROFILES").ok().map(PathBuf::from),
        })
    }

    pub fn load_profiles(&self) -> anyhow::Result<ChannelProfiles> {
        match &self.channel_profiles_path {
            Some(path) => {
                let profiles = ChannelProfiles::load(path)
                    .with_context(|| format!("Falha ao carregar perfis de canal em {}", path.display()))?;
                tracing::info!("✅ Perfis de canal carregados de {}", path.display());
                Ok(profiles)
            }
            None => Ok(ChannelProfiles::default()),
        }
    }
}

fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Valor inválido para {key}: {e}")),
        Err(_) => Ok(default),
    }
}

pub async fn connect_pool(settings: &Settings) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(Duration::from_secs(3))
        .connect(&settings.database_url)
        .await
        .context("Falha ao conectar ao banco de dados")?;

    tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
    Ok(pool)
}

pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_secret: String,
    pub sales_store: PgSalesStore,
    pub sales_service: SalesService,
}

impl AppState {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        let jwt_secret = settings
            .jwt_secret
            .clone()
            .context("JWT_SECRET deve ser definido")?;

        let profiles = Arc::new(settings.load_profiles()?);
        let db_pool = connect_pool(settings).await?;

        Ok(Self::from_parts(db_pool, jwt_secret, profiles, settings.report_row_cap))
    }

    // --- Monta o gráfico de dependências ---
    pub fn from_parts(
        db_pool: PgPool,
        jwt_secret: String,
        profiles: Arc<ChannelProfiles>,
        report_row_cap: i64,
    ) -> Self {
        let sales_store = PgSalesStore::new(db_pool.clone());
        let sales_service = SalesService::new(profiles, report_row_cap);

        Self {
            db_pool,
            jwt_secret,
            sales_store,
            sales_service,
        }
    }
}
