//! Tests for the token lifecycle


mod issuer_tests;
mod rotation_tests;
mod service_tests;
