//! Types shared between the studio admin client crates: id newtypes, wire
//! enums, request/response bodies and the API error model.

pub mod domain;
pub mod error;
pub mod protocol;

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod protocol_tests;
