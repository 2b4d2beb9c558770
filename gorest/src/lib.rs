//! # gorest
//!
//! Thin async client for the [GoREST](https://gorest.co.in) `users` API.
//!
//! ## Features
//!
//! - **Users client**: single-record and collection fetches with optional paging
//! - **Configuration**: layered defaults, TOML files and `GOREST_` environment variables
//! - **Errors**: upstream failures keep their HTTP status code
//! - **Logging**: scoped `tracing` subscriber driven by a verbosity count
//!
//! ## Example
//!
//! ```rust,no_run
//! use gorest::prelude::*;
//!
//! # async fn run() -> gorest::Result<()> {
//! let _logging = init_logging(1);
//!
//! // Defaults, config files and GOREST_ environment variables
//! let users = UsersClient::from_env()?;
//! let user = users.fetch(1610).await?;
//! println!("{user}");
//!
//! let config = Config::load_from("gorest.toml")?;
//! let users = UsersClient::new(&config)?;
//! let page = users.fetch_all(Some(1), Some(20)).await?;
//! println!("{page}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod observability;
pub mod users;

pub use error::{Error, Result};
pub use reqwest::StatusCode;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::observability::init_logging;
    pub use crate::users::{UsersApi, UsersClient};
}
