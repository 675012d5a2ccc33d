//! Integration test modules
//!
//! Every test runs against a wiremock Wikipedia and in-process providers.

pub mod crawl_test;
pub mod pipeline_test;
