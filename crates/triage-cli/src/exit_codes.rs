//! Standard exit codes for CLI operations

/// Success - operation completed without errors
pub const SUCCESS: i32 = 0;

/// General error, also used when an analyzer reports a failure
pub const ERROR: i32 = 1;

/// Specs were malformed or could not be converted
pub const SPEC_ISSUES: i32 = triage_core::constants::EXIT_CODE_SPEC_ISSUES;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;
