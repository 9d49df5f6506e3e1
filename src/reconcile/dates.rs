// src/reconcile/dates.rs

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::models::sales::SaleRecord;

use super::fields::{to_number, AliasTable, Field, RawRecord};

// "2023-09-14T..." em qualquer célula do rawJson
static ISO_DATE_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}T").expect("regex de data ISO válida"));

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

// Planilhas locais vêm em dia/mês/ano
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%b %d, %Y",
];

// Datas seriais de planilha (sistema 1900): dias desde 1899-12-30
const SERIAL_MIN: f64 = 1.0;
const SERIAL_MAX: f64 = 2_958_465.0; // 9999-12-31

/// Data autoritativa de uma venda. A primeira fonte que resolver vence:
/// coluna `date`, apelidos de data no rawJson, qualquer valor ISO no
/// rawJson e por fim `month`/`year`. Sem nada disso, a venda fica sem data.
pub fn resolve_date(record: &SaleRecord, aliases: &AliasTable) -> Option<DateTime<Utc>> {
    record
        .date
        .or_else(|| resolve_raw_date(RawRecord::new(&record.raw_json), aliases))
        .or_else(|| month_start(record.month.as_deref()?, record.year?))
}

/// Só as fontes do rawJson (passos 2 e 3 de `resolve_date`).
pub fn resolve_raw_date(raw: RawRecord<'_>, aliases: &AliasTable) -> Option<DateTime<Utc>> {
    raw.field(aliases, Field::Date)
        .and_then(parse_date_value)
        .or_else(|| {
            raw.values()
                .filter_map(Value::as_str)
                .filter(|text| ISO_DATE_TIME.is_match(text.trim()))
                .find_map(parse_date_text)
        })
}

pub fn parse_date_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(text) => parse_date_text(text),
        Value::Number(_) => to_number(value).and_then(from_spreadsheet_serial),
        _ => None,
    }
}

pub fn parse_date_text(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }

    for format in DATE_FORMATS {
        if let Ok(day) = NaiveDate::parse_from_str(text, format) {
            return day.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }

    None
}

fn from_spreadsheet_serial(serial: f64) -> Option<DateTime<Utc>> {
    if !(SERIAL_MIN..=SERIAL_MAX).contains(&serial) {
        return None;
    }

    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let offset = TimeDelta::try_milliseconds((serial * 86_400_000.0).round() as i64)?;
    epoch.checked_add_signed(offset).map(|naive| naive.and_utc())
}

/// Primeiro dia do mês, 00:00 UTC. Ano precisa ser positivo.
pub fn month_start(month: &str, year: i32) -> Option<DateTime<Utc>> {
    if year <= 0 {
        return None;
    }
    let number = month_number(month)?;
    NaiveDate::from_ymd_opt(year, number, 1)?
        .and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
}

pub fn month_number(name: &str) -> Option<u32> {
    let number = match name.trim().to_lowercase().as_str() {
        "jan" | "january" => 1,
        "feb" | "february" => 2,
        "mar" | "march" => 3,
        "apr" | "april" => 4,
        "may" => 5,
        "jun" | "june" => 6,
        "jul" | "july" => 7,
        "aug" | "august" => 8,
        "sep" | "sept" | "september" => 9,
        "oct" | "october" => 10,
        "nov" | "november" => 11,
        "dec" | "december" => 12,
        _ => return None,
    };
    Some(number)
}
