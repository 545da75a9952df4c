//! Stable exit codes for workplace CLI commands.

/// Command succeeded and, for scans, the repository is clean.
pub const OK: i32 = 0;
/// Command failed due to invalid config, arguments or other errors.
pub const INVALID: i32 = 1;
/// `workplace scan` or `workplace review` produced a blocked verdict.
pub const BLOCKED: i32 = 2;
