//! Tests for the JDX decode and encode paths.
//!
//! These tests run whole files through the public read and write functions
//! and check the all-or-nothing failure behavior of the loader.

mod loader_tests;
mod roundtrip_tests;
