//! Shared test utilities for the Marine Regions query workspace.
//!
//! This crate provides common testing infrastructure including:
//! - A scripted HTTP transport with a call log
//! - Canned service payloads (capabilities, features, gazetteer, RDF)
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{fixtures, FakeTransport};
//! ```

pub mod fixtures;
pub mod transport;

pub use transport::FakeTransport;

/// Assert that a fake transport saw no request at all.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_no_requests;
///
/// assert_no_requests!(transport);
/// ```
#[macro_export]
macro_rules! assert_no_requests {
    ($transport:expr) => {{
        let calls = $transport.calls();
        if !calls.is_empty() {
            panic!("expected no network I/O, but {} request(s) were sent: {:?}", calls.len(), calls);
        }
    }};
}
