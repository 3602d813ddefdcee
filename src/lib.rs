//! Read-only HTTP gateway over a document store.
//!
//! Serves three collections (store products, sensor readings, blog posts)
//! behind a shared-secret header, proxies certificate lookups to a
//! third-party API, and falls back to a single-page frontend for every
//! non-API path.
//!
//! Each collection request opens its own store connection and closes it
//! before the response is sent:
//!
//! ```text
//! GET /api/blogs  (serv: <secret>)
//!   -> connect -> find({}) on Blog.Blogs -> close
//!   -> 200 [ ...documents... ]
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`store`]: Document store connectors and collection reads
//! - [`certificate`]: Certificate lookup proxy
//! - [`api`]: HTTP router and handlers
//! - [`metrics`]: Request counters and latency histograms
//! - [`utils`]: Utility functions

pub mod api;
pub mod certificate;
pub mod config;
pub mod error;
pub mod metrics;
pub mod store;
pub mod utils;

pub use config::Config;
pub use error::{GatewayError, Result};
