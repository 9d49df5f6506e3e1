// src/reconcile/fields.rs

use std::{collections::HashMap, str::FromStr};

use rust_decimal::{prelude::FromPrimitive, Decimal};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// Campos lógicos que procuramos dentro do rawJson.
// Cada um tem uma lista ordenada de nomes de coluna aceitos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Amount,
    Rate,
    Qty,
    Date,
    Month,
    Year,
    OrderStatus,
    OrderNo,
    ProductCode,
    Title,
    CustomerName,
    Email,
    Mobile,
    PaymentMode,
}

impl Field {
    pub const ALL: [Field; 14] = [
        Field::Amount,
        Field::Rate,
        Field::Qty,
        Field::Date,
        Field::Month,
        Field::Year,
        Field::OrderStatus,
        Field::OrderNo,
        Field::ProductCode,
        Field::Title,
        Field::CustomerName,
        Field::Email,
        Field::Mobile,
        Field::PaymentMode,
    ];

    pub fn default_aliases(self) -> &'static [&'static str] {
        match self {
            Field::Amount => &["Selling Price", "Amount", "Total"],
            Field::Rate => &["Rate", "Unit Price", "Price", "MRP"],
            Field::Qty => &["Qty", "Quantity"],
            Field::Date => &["Date", "Txn Date", "Transaction Date"],
            Field::Month => &["Month"],
            Field::Year => &["Year"],
            Field::OrderStatus => &["Order Status", "Status"],
            Field::OrderNo => &["Order No", "Order Number", "Order ID", "Invoice No"],
            Field::ProductCode => &["ISBN", "Product Code", "SKU"],
            Field::Title => &["Title", "Book Title", "Product", "Item"],
            Field::CustomerName => &["Customer Name", "Name", "Customer"],
            Field::Email => &["Email", "Email ID", "E-mail"],
            Field::Mobile => &["Mobile", "Mobile No", "Phone", "Contact"],
            Field::PaymentMode => &["Payment Mode", "Payment Method"],
        }
    }
}

/// Nome de coluna normalizado: sem espaços nas pontas, em minúsculas.
pub fn normalize_header(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Tabela de apelidos por campo. Os nomes ficam guardados já normalizados.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTable {
    entries: HashMap<Field, Vec<String>>,
}

impl Default for AliasTable {
    fn default() -> Self {
        let entries = Field::ALL
            .into_iter()
            .map(|field| {
                let names = field.default_aliases().iter().map(|n| normalize_header(n)).collect();
                (field, names)
            })
            .collect();
        Self { entries }
    }
}

impl AliasTable {
    pub fn aliases(&self, field: Field) -> &[String] {
        self.entries.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn set<S: AsRef<str>>(&mut self, field: Field, names: &[S]) {
        let names = names.iter().map(|n| normalize_header(n.as_ref())).collect();
        self.entries.insert(field, names);
    }

    pub fn with_overrides(mut self, overrides: &HashMap<Field, Vec<String>>) -> Self {
        for (field, names) in overrides {
            self.set(*field, names.as_slice());
        }
        self
    }
}

/// Visão somente-leitura de um rawJson. Se o valor guardado não for um
/// objeto, comporta-se como um mapa vazio.
#[derive(Debug, Clone, Copy)]
pub struct RawRecord<'a> {
    fields: Option<&'a Map<String, Value>>,
}

impl<'a> RawRecord<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self { fields: value.as_object() }
    }

    pub fn from_map(map: &'a Map<String, Value>) -> Self {
        Self { fields: Some(map) }
    }

    /// Valor da primeira chave (na ordem do próprio registro) que bate com
    /// algum dos candidatos, ignorando caixa e espaços nas pontas.
    pub fn pick<S: AsRef<str>>(&self, candidates: &[S]) -> Option<&'a Value> {
        let fields = self.fields?;
        let wanted: Vec<String> = candidates.iter().map(|c| normalize_header(c.as_ref())).collect();

        fields
            .iter()
            .find(|(key, _)| {
                let key = normalize_header(key);
                wanted.iter().any(|w| *w == key)
            })
            .map(|(_, value)| value)
    }

    pub fn field(&self, aliases: &AliasTable, field: Field) -> Option<&'a Value> {
        self.pick(aliases.aliases(field))
    }

    pub fn text(&self, aliases: &AliasTable, field: Field) -> Option<String> {
        self.field(aliases, field).and_then(to_text)
    }

    pub fn decimal(&self, aliases: &AliasTable, field: Field) -> Option<Decimal> {
        self.field(aliases, field).and_then(to_decimal)
    }

    pub fn int(&self, aliases: &AliasTable, field: Field) -> Option<i32> {
        self.field(aliases, field).and_then(to_int)
    }

    pub fn values(self) -> impl Iterator<Item = &'a Value> {
        self.fields.into_iter().flat_map(|fields| fields.values())
    }

    pub fn entries(self) -> impl Iterator<Item = (&'a String, &'a Value)> {
        self.fields.into_iter().flat_map(|fields| fields.iter())
    }

    /// Linha em branco da planilha: nenhuma célula com conteúdo.
    pub fn is_blank(&self) -> bool {
        self.values().all(|value| to_text(value).is_none())
    }
}

pub fn pick<'a, S: AsRef<str>>(record: &'a Value, candidates: &[S]) -> Option<&'a Value> {
    RawRecord::new(record).pick(candidates)
}

/// Converte para número. Nulo, texto vazio ou malformado viram `None`.
pub fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|n| n.is_finite()),
        Value::String(text) => parse_number_text(text),
        _ => None,
    }
}

pub fn parse_number_text(text: &str) -> Option<f64> {
    // "1,234.50" -> "1234.50"
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Valor monetário exato. O Decimal é montado a partir do texto do número,
/// nunca do f64 direto.
pub fn to_decimal(value: &Value) -> Option<Decimal> {
    let number = to_number(value)?;
    Decimal::from_str(&number.to_string())
        .ok()
        .or_else(|| Decimal::from_f64(number))
}

/// Inteiro só quando o número não tem parte fracionária.
pub fn to_int(value: &Value) -> Option<i32> {
    let number = to_number(value)?;
    if number.fract() != 0.0 || number < i32::MIN as f64 || number > i32::MAX as f64 {
        return None;
    }
    Some(number as i32)
}

/// Texto de um escalar, sem espaços nas pontas. Vazio vira `None`.
pub fn to_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Campo estruturado quando preenchido, senão o apelido no rawJson.
pub fn structured_or_raw(
    structured: Option<&str>,
    raw: RawRecord<'_>,
    aliases: &AliasTable,
    field: Field,
) -> Option<String> {
    structured
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| raw.text(aliases, field))
}
