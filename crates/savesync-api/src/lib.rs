//! Savefile catalog API client
//!
//! HTTP adapter for the remote savefile catalog:
//!
//! - [`client`]: typed reqwest wrapper with bearer auth, per-call
//!   timeouts, and status-to-error mapping
//! - [`session`]: token login, account registration, and logout
//! - [`catalog`]: the [`CatalogClient`](savesync_core::ports::catalog::CatalogClient)
//!   implementation, mapping catalog DTOs onto domain records
//! - [`retry`]: exponential backoff for transient transport failures

pub mod catalog;
pub mod client;
pub mod retry;
pub mod session;
