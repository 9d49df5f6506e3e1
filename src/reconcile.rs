// src/reconcile.rs
//
// Regras de reconciliação das vendas importadas. Nada aqui faz I/O:
// os repositórios leem/escrevem, estes módulos só calculam.

pub mod aggregate;
pub mod backfill;
pub mod dates;
pub mod fields;
pub mod ingest;
pub mod profiles;
pub mod row_hash;

pub use aggregate::aggregate;
pub use backfill::{derive_missing, DerivedFields};
pub use dates::resolve_date;
pub use fields::{pick, to_decimal, to_number, AliasTable, Field, RawRecord};
pub use profiles::{ChannelProfile, ChannelProfiles};
pub use row_hash::{canonical_key, content_hash, row_hash};
