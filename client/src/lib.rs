//! Client for the Conjur secrets manager.
//!
//! The entry point is [`Client`], which talks to a Conjur appliance through
//! the pluggable [`conjur_core::Context`]. Configuration comes either from
//! explicit [`Config`] values or from the `CONJUR_*` environment variables.
//!
//! ```no_run
//! use conjur::{Client, Config};
//! use conjur_core::{Context, OsEnv};
//! use conjur_file_read_tokio::TokioFileRead;
//! use conjur_http_send_reqwest::ReqwestHttpSend;
//!
//! # async fn example() -> conjur_core::Result<()> {
//! let ctx = Context::new()
//!     .with_env(OsEnv)
//!     .with_file_read(TokioFileRead)
//!     .with_http_send(ReqwestHttpSend::default());
//!
//! let client = Client::from_env(ctx)?;
//! client.authenticate().await?;
//! let secret = client.retrieve_secret("prod/db/password").await?;
//! # Ok(())
//! # }
//! ```
//!
//! Workloads running on AWS can skip api keys entirely and prove their
//! identity with a signed `GetCallerIdentity` request instead, see the
//! [`iam`] module.

mod config;
pub use config::Config;

mod endpoints;
pub use endpoints::Endpoints;

mod resource;
pub use resource::Resource;
pub use resource::ResourceKind;

mod client;
pub use client::Client;

pub mod iam;

mod constants;
