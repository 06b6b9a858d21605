//! Integration tests for the catalog API client
//!
//! Uses wiremock to stand in for the savefile catalog API.

mod common;
mod test_catalog;
mod test_session;
