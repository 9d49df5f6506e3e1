pub mod backfill_service;
pub mod import_service;
pub mod sales_service;

pub use backfill_service::{BackfillService, BackfillStats};
pub use import_service::{ImportService, ImportSummary};
pub use sales_service::SalesService;
