//! Test support utilities
//!
//! Logging initialization shared by unit and integration tests, plus a ULID
//! based database name generator for names that must not collide between runs.

pub mod logging;

use ulid::Ulid;

/// Generate a unique database name that is a regular T-SQL identifier
///
/// # Examples
/// ```
/// use test_support::unique_database_name;
///
/// let name = unique_database_name("Demo");
/// assert!(name.starts_with("Demo_"));
/// assert!(name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
/// ```
pub fn unique_database_name(prefix: &str) -> String {
    format!("{}_{}", prefix, Ulid::new())
}
