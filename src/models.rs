pub mod auth;
pub mod reports;
pub mod sales;
