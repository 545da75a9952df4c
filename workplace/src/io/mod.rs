//! I/O collaborators for workflow nodes.

pub mod config;
pub mod llm;
pub mod prompt;
pub mod source_host;
