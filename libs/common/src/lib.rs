//! Common library for the portfolio client
//!
//! This crate provides the pieces shared by the public gallery and the
//! admin area: configuration, the error taxonomy, backend models, the HTTP
//! client wrapper, the persisted credential slot and notifications.

pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod notify;
pub mod token_store;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Example usage of the HTTP client
///
/// ```rust,no_run
/// use common::config::ClientConfig;
/// use common::http::{HttpApi, PortfolioApi};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = ClientConfig::from_env()?;
///     let api = HttpApi::new(&config)?;
///     for collection in api.public_collections().await? {
///         println!("{}", collection.name);
///     }
///     Ok(())
/// }
/// ```
pub fn example_usage() {}
