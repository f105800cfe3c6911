// Marketplace services
// Customer and Product databases plus the Seller and Buyer frontends

pub mod cli;
pub mod config;
pub mod customer;
pub mod error;
pub mod frontend;
pub mod network;
pub mod observability;
pub mod product;
pub mod protocol;
pub mod signals;

pub use error::{ErrorKind, MarketError, MarketResult};
