//! Built-in decorator defaults
//!
//! The fixed `always` decorator set seeded into every newly provisioned
//! environment. Adding or removing a default is a change to this table,
//! not to composition logic.

use crate::fragment::Decorators;

/// Primary username on the endpoint
pub const DECORATOR_USERS: &str =
    "SELECT uid, username FROM users WHERE directory LIKE '/Users/%' OR directory LIKE '/home/%' LIMIT 1;";

/// Endpoint hostname
pub const DECORATOR_HOSTNAME: &str = "SELECT hostname FROM system_info;";

/// Most recently logged-in user
pub const DECORATOR_LOGGED_IN_USER: &str =
    "SELECT user AS logged_in_user FROM logged_in_users WHERE user <> '' ORDER BY time DESC LIMIT 1;";

/// Agent version and binary hash
pub const DECORATOR_VERSION_HASH: &str =
    "SELECT i.version AS agent_version, h.md5 AS agent_md5 FROM osquery_info i JOIN hash h ON h.path = i.path;";

/// Hash of the running agent process
pub const DECORATOR_PROCESS_HASH: &str =
    "SELECT h.md5 AS process_md5 FROM processes p JOIN hash h ON h.path = p.path WHERE p.pid = (SELECT pid FROM osquery_info);";

/// The default `always` decorator set, in emission order
pub const DEFAULT_ALWAYS_DECORATORS: [&str; 5] = [
    DECORATOR_USERS,
    DECORATOR_HOSTNAME,
    DECORATOR_LOGGED_IN_USER,
    DECORATOR_VERSION_HASH,
    DECORATOR_PROCESS_HASH,
];

/// Build the decorators fragment for a fresh environment
pub fn decorators() -> Decorators {
    Decorators {
        always: DEFAULT_ALWAYS_DECORATORS
            .iter()
            .map(|query| query.to_string())
            .collect(),
        ..Decorators::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_set_has_five_queries() {
        assert_eq!(DEFAULT_ALWAYS_DECORATORS.len(), 5);
    }

    #[test]
    fn test_decorators_populates_only_always() {
        let decorators = decorators();
        assert_eq!(decorators.always.len(), 5);
        assert_eq!(decorators.always[0], DECORATOR_USERS);
        assert!(decorators.load.is_empty());
        assert!(decorators.interval.is_none());
    }
}
