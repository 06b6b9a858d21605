//! Reconciliation engine for Savesync
//!
//! Implements the pipeline that turns one console's local file tree and
//! remote record set into per-file outcomes:
//!
//! ```text
//! scan + list ──→ matcher ──→ decision ──→ executor ──→ [ActionResult]
//! ```
//!
//! - [`matcher`] pairs local descriptors with remote records by relative
//!   path into a total, disjoint partition
//! - [`decision`] computes one [`SyncAction`](savesync_core::domain::actions::SyncAction)
//!   per path from the crawl mode, action mode, and direction; it is a pure
//!   function and never suspends
//! - [`executor`] applies the actions through the catalog client and the
//!   local save store across a bounded worker pool, isolating per-path
//!   failures
//! - [`store`] is the local filesystem adapter (scanning and atomic writes)
//! - [`run`] orchestrates whole passes, one per console

pub mod decision;
pub mod executor;
pub mod matcher;
pub mod run;
pub mod store;
