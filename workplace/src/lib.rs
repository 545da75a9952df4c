//! Orchestration core for the Shadow Workplace simulator.
//!
//! Two small workflows chain an LLM and a source-hosting service: a setup
//! workflow that plans a sprint and provisions a repository, and a review
//! workflow that scans pushed code for leaked credentials before handing it
//! to a reviewer. The architecture keeps a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (plan recovery, locator parsing,
//!   credential scanning, routing). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting collaborators (configuration, LLM client,
//!   source-host client, prompt rendering). Isolated behind traits so tests
//!   can script them.
//!
//! [`agents`] implements the four workflow nodes on top of both layers, and
//! [`workflow`] composes them into the setup and review graphs.

pub mod agents;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod workflow;
