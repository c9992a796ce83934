//! Exit code constants for the herald CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, invalid workspace state)
//! - 2: Manifest failure (structurally invalid manifest)
//! - 3: Agent resolution failure (unknown agent name)
//! - 4: Dispatch failure (missing variable or agent execution error)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, invalid config, or uninitialized workspace.
pub const USER_ERROR: i32 = 1;

/// Manifest failure: a manifest file is structurally invalid.
pub const MANIFEST_FAILURE: i32 = 2;

/// Agent resolution failure: requested agent name has no registered entry.
pub const AGENT_NOT_FOUND: i32 = 3;

/// Dispatch failure: missing template variable or code agent execution error.
pub const DISPATCH_FAILURE: i32 = 4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [
            SUCCESS,
            USER_ERROR,
            MANIFEST_FAILURE,
            AGENT_NOT_FOUND,
            DISPATCH_FAILURE,
        ];
        for (i, &a) in codes.iter().enumerate() {
            for (j, &b) in codes.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b, "Exit codes must be distinct");
                }
            }
        }
    }

    #[test]
    fn success_is_zero() {
        assert_eq!(SUCCESS, 0);
    }
}
