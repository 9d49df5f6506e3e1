// src/services/import_service.rs

use std::{collections::HashSet, fs::File, io::BufReader, path::Path, sync::Arc};

use anyhow::Context;
use serde_json::{Map, Value};

use crate::{
    common::error::AppError,
    db::SalesStore,
    models::sales::{SaleRecord, SalesChannel},
    reconcile::{ingest::build_record, ChannelProfiles},
};

pub type RawRow = Map<String, Value>;

/// Linhas já reconciliadas, prontas para gravar.
#[derive(Debug, Default)]
pub struct PreparedImport {
    pub records: Vec<SaleRecord>,
    pub received: usize,
    pub blank: usize,
    pub repeated_in_file: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub received: usize,
    pub blank: usize,
    pub repeated_in_file: usize,
    pub inserted: usize,
    pub already_present: usize,
}

#[derive(Clone)]
pub struct ImportService {
    profiles: Arc<ChannelProfiles>,
}

impl ImportService {
    pub fn new(profiles: Arc<ChannelProfiles>) -> Self {
        Self { profiles }
    }

    /// Reconcilia as linhas sem tocar no banco. Linhas repetidas dentro do
    /// próprio arquivo (mesmo rowHash) entram uma vez só.
    pub fn prepare(&self, channel: SalesChannel, rows: Vec<RawRow>) -> PreparedImport {
        let profile = self.profiles.get(channel);
        let mut prepared = PreparedImport {
            received: rows.len(),
            ..Default::default()
        };
        let mut seen: HashSet<String> = HashSet::new();

        for row in rows {
            let Some(record) = build_record(channel, row, profile) else {
                prepared.blank += 1;
                continue;
            };

            let hash = record.row_hash.clone().unwrap_or_default();
            if !seen.insert(hash) {
                prepared.repeated_in_file += 1;
                continue;
            }
            prepared.records.push(record);
        }

        prepared
    }

    /// Grava numa transação. O que já existe (mesmo rowHash) é ignorado pelo
    /// banco, então reimportar a mesma planilha não cria nada novo.
    pub async fn persist<S: SalesStore>(
        &self,
        store: &S,
        channel: SalesChannel,
        prepared: PreparedImport,
    ) -> Result<ImportSummary, AppError> {
        let inserted = store.insert_new(channel, &prepared.records).await? as usize;

        let summary = ImportSummary {
            received: prepared.received,
            blank: prepared.blank,
            repeated_in_file: prepared.repeated_in_file,
            inserted,
            already_present: prepared.records.len().saturating_sub(inserted),
        };

        tracing::info!(
            %channel,
            received = summary.received,
            inserted = summary.inserted,
            already_present = summary.already_present,
            repeated_in_file = summary.repeated_in_file,
            blank = summary.blank,
            "✅ Importação concluída"
        );

        Ok(summary)
    }
}

/// Lê a planilha exportada: `.json` (lista de objetos) ou `.csv` (com cabeçalho).
pub fn read_rows(path: &Path) -> anyhow::Result<Vec<RawRow>> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "json" => read_json_rows(path),
        "csv" => read_csv_rows(path),
        other => anyhow::bail!("Formato de arquivo não suportado: '{other}' (use .csv ou .json)"),
    }
}

fn read_json_rows(path: &Path) -> anyhow::Result<Vec<RawRow>> {
    let file = File::open(path).with_context(|| format!("Falha ao abrir {}", path.display()))?;
    let values: Vec<Value> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("{} não é uma lista JSON válida", path.display()))?;

    let mut rows = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        match value {
            Value::Object(row) => rows.push(row),
            _ => tracing::warn!(index, "Linha ignorada: não é um objeto JSON"),
        }
    }
    Ok(rows)
}

fn read_csv_rows(path: &Path) -> anyhow::Result<Vec<RawRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Falha ao abrir {}", path.display()))?;

    let headers = reader.headers()?.clone();
    let mut rows = Vec::new();

    for result in reader.records() {
        let record = result?;
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(header, cell)| (header.to_string(), Value::String(cell.to_string())))
            .collect();
        rows.push(row);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    use crate::db::sales_store::memory::MemoryStore;

    fn service() -> ImportService {
        ImportService::new(Arc::new(ChannelProfiles::default()))
    }

    fn row(value: Value) -> RawRow {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn repeated_rows_in_one_file_are_kept_once() {
        let rows = vec![
            row(json!({ "Order No": "1", "Title": "Dune", "Amount": "10" })),
            row(json!({ "order no": "1", "TITLE": "dune ", "Amount": "10" })),
            row(json!({ "Order No": "2", "Title": "Dune", "Amount": "10" })),
            row(json!({ "Order No": "", "Title": "" })),
        ];

        let prepared = service().prepare(SalesChannel::Online, rows);
        assert_eq!(prepared.received, 4);
        assert_eq!(prepared.records.len(), 2);
        assert_eq!(prepared.repeated_in_file, 1);
        assert_eq!(prepared.blank, 1);
    }

    #[test]
    fn preparing_the_same_file_twice_yields_the_same_hashes() {
        let rows = || {
            vec![
                row(json!({ "Order No": "7", "ISBN": "978", "Date": "2024-02-01" })),
                row(json!({ "Order No": "8", "ISBN": "978", "Date": "2024-02-01" })),
            ]
        };
        let hashes = |prepared: PreparedImport| -> Vec<Option<String>> {
            prepared.records.into_iter().map(|r| r.row_hash).collect()
        };

        let first = hashes(service().prepare(SalesChannel::EventB, rows()));
        let second = hashes(service().prepare(SalesChannel::EventB, rows()));
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn reimporting_an_unchanged_sheet_inserts_nothing() {
        let sheet = || {
            vec![
                row(json!({ "Order No": "R-1", "Title": "Dune", "Amount": "10" })),
                row(json!({ "Order No": "R-2", "Title": "Emma", "Amount": "12" })),
            ]
        };
        let store = MemoryStore::default();

        let first = service()
            .persist(&store, SalesChannel::OfflineCounter, service().prepare(SalesChannel::OfflineCounter, sheet()))
            .await
            .unwrap();
        assert_eq!(first.inserted, 2);

        let second = service()
            .persist(&store, SalesChannel::OfflineCounter, service().prepare(SalesChannel::OfflineCounter, sheet()))
            .await
            .unwrap();
        assert_eq!(second.inserted, 0);
        assert_eq!(second.already_present, 2);
        assert_eq!(store.rows().len(), 2);
    }

    #[test]
    fn reads_csv_with_headers() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "Order No,Selling Price,Date").unwrap();
        writeln!(file, "A-1,\"1,250.00\",14/09/2023").unwrap();
        writeln!(file, "A-2,300,").unwrap();

        let rows = read_rows(file.path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Selling Price"], json!("1,250.00"));
        assert_eq!(rows[1]["Date"], json!(""));
    }

    #[test]
    fn reads_json_and_skips_non_objects() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"[{{"Amount": 10}}, "lixo", {{"Amount": "20"}}]"#).unwrap();

        let rows = read_rows(file.path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["Amount"], json!("20"));
    }

    #[test]
    fn unknown_extension_is_an_error() {
        assert!(read_rows(Path::new("vendas.xlsx")).is_err());
    }
}
