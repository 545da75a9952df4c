//! Deterministic, pure logic shared by the workflow nodes.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod locator;
pub mod plan;
pub mod routing;
pub mod scanner;
pub mod skill;
pub mod state;
pub mod types;
