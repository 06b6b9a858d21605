//! Core domain logic for Savesync
//!
//! This crate contains the pure domain layer shared by every other
//! Savesync crate:
//!
//! - **domain**: entities (consoles, savefile descriptors, remote records),
//!   validated newtypes, reconciliation modes, and sync actions
//! - **ports**: trait interfaces for the remote catalog client and the
//!   local save store (implemented by `savesync-api` and `savesync-engine`)
//! - **config**: typed configuration with YAML loading and environment
//!   variable overrides
//!
//! Nothing in this crate performs I/O; it is intended to be depended on by
//! every other crate in the workspace.

pub mod config;
pub mod domain;
pub mod ports;
