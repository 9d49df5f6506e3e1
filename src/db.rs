pub mod sales_repo;
pub mod sales_store;

pub use sales_repo::SalesRepository;
pub use sales_store::{PgSalesStore, SalesStore};
