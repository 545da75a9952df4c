//! Workflow nodes.
//!
//! Each agent reads the current workflow state and returns a single
//! [`StateUpdate`](crate::core::state::StateUpdate). Agents never fail: every
//! upstream error is folded into the message they contribute.

pub mod devops;
pub mod manager;
pub mod security;
pub mod senior_dev;
