pub mod error;
pub mod models;
pub mod store;
pub mod transfer;
