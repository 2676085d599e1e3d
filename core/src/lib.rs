//! Core components for talking to a Conjur appliance.
//!
//! This crate provides the foundational types shared by the `conjur` client
//! crates. It deliberately contains no I/O of its own:
//!
//! - **Context**: a container holding implementations for file reading, HTTP
//!   sending, and environment access
//! - **Traits**: abstract interfaces for credential loading
//!   ([`ProvideCredential`]) and credential validation ([`SigningCredential`])
//! - **Utilities**: hashing ([`hash`]), time formatting ([`time`]), and
//!   sensitive-value redaction ([`utils`])
//!
//! ## Example
//!
//! ```
//! use conjur_core::{Context, OsEnv};
//!
//! // Create a context with explicit implementations.
//! let ctx = Context::new().with_env(OsEnv);
//! ```
//!
//! Any component left unconfigured uses a no-op implementation that returns
//! errors or empty values when called, so tests can build a [`Context`] with
//! only the pieces they exercise.

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod context;
pub use context::Context;
mod fs;
pub use fs::FileRead;
mod http;
pub use http::HttpSend;
mod env;
pub use env::Env;
pub use env::OsEnv;
pub use env::StaticEnv;

mod api;
pub use api::{ProvideCredential, SigningCredential};

mod error;
pub use error::{Error, ErrorKind, Result};
