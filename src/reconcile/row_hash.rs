// src/reconcile/row_hash.rs

use serde_json::Value;

use super::{
    dates::resolve_raw_date,
    fields::{normalize_header, to_text, AliasTable, Field, RawRecord},
    profiles::ChannelProfile,
};

pub const KEY_DELIMITER: &str = "|";

/// Campos de identidade usados por padrão, nesta ordem.
/// `Qty` fica de fora (ver DESIGN.md); um canal pode incluí-lo no perfil.
pub const DEFAULT_KEY_FIELDS: [Field; 6] = [
    Field::OrderNo,
    Field::ProductCode,
    Field::Date,
    Field::Amount,
    Field::CustomerName,
    Field::Title,
];

/// Chave canônica de uma linha importada: os campos de identidade, em
/// minúsculas e sem espaços nas pontas, unidos por `|`.
pub fn canonical_key(raw: &Value, key_fields: &[Field], aliases: &AliasTable) -> String {
    let raw = RawRecord::new(raw);
    key_fields
        .iter()
        .map(|field| key_component(raw, *field, aliases))
        .collect::<Vec<_>>()
        .join(KEY_DELIMITER)
}

fn key_component(raw: RawRecord<'_>, field: Field, aliases: &AliasTable) -> String {
    let value = match field {
        Field::Date => resolve_raw_date(raw, aliases).map(|at| at.format("%Y-%m-%d").to_string()),
        // Amount entra como texto da célula, sem coerção numérica
        other => raw.field(aliases, other).and_then(to_text),
    };
    value.map(|v| v.trim().to_lowercase()).unwrap_or_default()
}

/// Digest BLAKE3 (hex, 64 caracteres) da chave canônica.
pub fn content_hash(canonical_key: &str) -> String {
    blake3::hash(canonical_key.as_bytes()).to_hex().to_string()
}

/// `rowHash` gravado na tabela. Quando nenhum campo de identidade está
/// preenchido, o hash cobre a linha inteira (chaves normalizadas e
/// ordenadas) para que linhas diferentes não colidam em "|||||".
pub fn row_hash(raw: &Value, profile: &ChannelProfile) -> String {
    let key = canonical_key(raw, &profile.key_fields, &profile.aliases);
    if key.split(KEY_DELIMITER).any(|part| !part.is_empty()) {
        return content_hash(&key);
    }
    content_hash(&whole_row_key(raw))
}

fn whole_row_key(raw: &Value) -> String {
    let mut cells: Vec<(String, String)> = RawRecord::new(raw)
        .entries()
        .filter_map(|(key, value)| {
            let text = to_text(value)?.to_lowercase();
            Some((normalize_header(key), text))
        })
        .collect();
    cells.sort();

    let body = cells
        .into_iter()
        .map(|(key, text)| format!("{key}={text}"))
        .collect::<Vec<_>>()
        .join(KEY_DELIMITER);
    format!("row{KEY_DELIMITER}{body}")
}
