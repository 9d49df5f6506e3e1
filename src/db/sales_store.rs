// src/db/sales_store.rs

use std::future::Future;

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::{
        reports::DateRange,
        sales::{SaleRecord, SalesChannel},
    },
    reconcile::DerivedFields,
};

use super::SalesRepository;

/// O que os services precisam do armazenamento de vendas. Em produção é o
/// `PgSalesStore`; nos testes, uma implementação em memória.
pub trait SalesStore: Send + Sync {
    fn fetch_for_report(
        &self,
        channel: SalesChannel,
        range: Option<&DateRange>,
        limit: i64,
    ) -> impl Future<Output = Result<Vec<SaleRecord>, AppError>> + Send;

    fn fetch_missing_derived(
        &self,
        channel: SalesChannel,
        after_id: i64,
        limit: i64,
    ) -> impl Future<Output = Result<Vec<SaleRecord>, AppError>> + Send;

    fn fill_derived(
        &self,
        channel: SalesChannel,
        id: i64,
        derived: &DerivedFields,
    ) -> impl Future<Output = Result<u64, AppError>> + Send;

    /// Grava tudo numa transação. Retorna quantos eram novos (rowHash inédito).
    fn insert_new(
        &self,
        channel: SalesChannel,
        records: &[SaleRecord],
    ) -> impl Future<Output = Result<u64, AppError>> + Send;
}

#[derive(Clone)]
pub struct PgSalesStore {
    pool: PgPool,
    repo: SalesRepository,
}

impl PgSalesStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            repo: SalesRepository::new(),
        }
    }
}

impl SalesStore for PgSalesStore {
    async fn fetch_for_report(
        &self,
        channel: SalesChannel,
        range: Option<&DateRange>,
        limit: i64,
    ) -> Result<Vec<SaleRecord>, AppError> {
        self.repo.fetch_for_report(&self.pool, channel, range, limit).await
    }

    async fn fetch_missing_derived(
        &self,
        channel: SalesChannel,
        after_id: i64,
        limit: i64,
    ) -> Result<Vec<SaleRecord>, AppError> {
        self.repo.fetch_missing_derived(&self.pool, channel, after_id, limit).await
    }

    async fn fill_derived(
        &self,
        channel: SalesChannel,
        id: i64,
        derived: &DerivedFields,
    ) -> Result<u64, AppError> {
        self.repo.fill_derived(&self.pool, channel, id, derived).await
    }

    async fn insert_new(&self, channel: SalesChannel, records: &[SaleRecord]) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;
        for record in records {
            if self.repo.insert_if_new(&mut *tx, channel, record).await? {
                inserted += 1;
            }
        }
        tx.commit().await?;
        Ok(inserted)
    }
}
