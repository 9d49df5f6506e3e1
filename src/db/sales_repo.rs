// src/db/sales_repo.rs

use sqlx::{Executor, Postgres};

use crate::{
    common::error::AppError,
    models::{
        reports::DateRange,
        sales::{SaleRecord, SalesChannel},
    },
    reconcile::DerivedFields,
};

const RECORD_COLUMNS: &str = "id, source, order_no, isbn, title, customer_name, mobile, email, \
    amount, rate, qty, payment_mode, date, month, year, raw_json, row_hash, order_status, created_at";

// O nome da tabela vem sempre de SalesChannel::table_name(), nunca da
// requisição, por isso pode ir direto no texto do SQL.
#[derive(Clone, Default)]
pub struct SalesRepository;

impl SalesRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  LEITURA (relatórios)
    // =========================================================================

    /// Linhas candidatas ao relatório, das mais novas para as mais antigas.
    /// Quem tem `date` fora do intervalo já sai aqui (a coluna estruturada
    /// sempre vence na resolução de data); linhas sem `date` vêm todas e o
    /// filtro fino fica com o agregador.
    pub async fn fetch_for_report<'e, E>(
        &self,
        executor: E,
        channel: SalesChannel,
        range: Option<&DateRange>,
        limit: i64,
    ) -> Result<Vec<SaleRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM {}
            WHERE date IS NULL
               OR (($1::timestamptz IS NULL OR date >= $1)
                   AND ($2::timestamptz IS NULL OR date <= $2))
            ORDER BY id DESC
            LIMIT $3
            "#,
            channel.table_name()
        );

        let records = sqlx::query_as::<_, SaleRecord>(&sql)
            .bind(range.and_then(|r| r.start))
            .bind(range.and_then(|r| r.end))
            .bind(limit)
            .fetch_all(executor)
            .await?;

        Ok(records)
    }

    // =========================================================================
    //  BACKFILL
    // =========================================================================

    /// Próximo lote de registros sem `amount` ou sem `date`, depois de `after_id`.
    pub async fn fetch_missing_derived<'e, E>(
        &self,
        executor: E,
        channel: SalesChannel,
        after_id: i64,
        limit: i64,
    ) -> Result<Vec<SaleRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM {}
            WHERE (amount IS NULL OR date IS NULL)
              AND id > $1
            ORDER BY id ASC
            LIMIT $2
            "#,
            channel.table_name()
        );

        let records = sqlx::query_as::<_, SaleRecord>(&sql)
            .bind(after_id)
            .bind(limit)
            .fetch_all(executor)
            .await?;

        Ok(records)
    }

    /// Grava só nas colunas que ainda estão nulas. Retorna as linhas afetadas.
    pub async fn fill_derived<'e, E>(
        &self,
        executor: E,
        channel: SalesChannel,
        id: i64,
        derived: &DerivedFields,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE {}
            SET amount = COALESCE(amount, $2),
                rate = COALESCE(rate, $3),
                qty = COALESCE(qty, $4),
                date = COALESCE(date, $5)
            WHERE id = $1
            "#,
            channel.table_name()
        );

        let result = sqlx::query(&sql)
            .bind(id)
            .bind(derived.amount)
            .bind(derived.rate)
            .bind(derived.qty)
            .bind(derived.date)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    // =========================================================================
    //  IMPORTAÇÃO
    // =========================================================================

    /// Insere o registro se o `row_hash` ainda não existir. `true` = inserido.
    pub async fn insert_if_new<'e, E>(
        &self,
        executor: E,
        channel: SalesChannel,
        record: &SaleRecord,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO {} (
                source, order_no, isbn, title, customer_name, mobile, email,
                amount, rate, qty, payment_mode, date, month, year,
                raw_json, row_hash, order_status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            ON CONFLICT (row_hash) DO NOTHING
            "#,
            channel.table_name()
        );

        let result = sqlx::query(&sql)
            .bind(channel.slug())
            .bind(record.order_no.as_deref())
            .bind(record.isbn.as_deref())
            .bind(record.title.as_deref())
            .bind(record.customer_name.as_deref())
            .bind(record.mobile.as_deref())
            .bind(record.email.as_deref())
            .bind(record.amount)
            .bind(record.rate)
            .bind(record.qty)
            .bind(record.payment_mode.as_deref())
            .bind(record.date)
            .bind(record.month.as_deref())
            .bind(record.year)
            .bind(&record.raw_json)
            .bind(record.row_hash.as_deref())
            .bind(record.order_status.as_deref())
            .execute(executor)
            .await?;

        Ok(result.rows_affected() == 1)
    }
}
