//! Integration tests for the harvester
//!
//! These tests use wiremock to serve listing pages and drive the traversal,
//! discovery, and export end-to-end.

mod export_tests;
mod harvest_tests;
mod support;
