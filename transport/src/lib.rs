//! Network executors and sessions for `trello-core`.
//!
//! # Overview
//! The core crate only builds and parses; this crate moves the bytes. It
//! provides a blocking executor on ureq, an async executor on reqwest,
//! sessions that pair either with a `TrelloClient`, TOML configuration and the
//! `trello` command-line tool.
//!
//! # Design
//! - `Transport` / `AsyncTransport` are the only seam between the pure core
//!   and the network, so tests can swap in canned responses.
//! - HTTP error statuses are returned as responses; status interpretation
//!   stays in `TrelloClient::parse_*`.
//! - Logging goes through `tracing`; credentials are redacted before any URL
//!   is logged.

pub mod config;
pub mod error;
pub mod session;
pub mod transport;

pub use config::Config;
pub use error::{Error, TransportError};
pub use session::{AsyncTrello, Trello};
pub use transport::{AsyncTransport, ReqwestTransport, Transport, UreqTransport, DEFAULT_TIMEOUT};
