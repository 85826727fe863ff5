//! Identifier rules for logical table and field names.
//!
//! Names become Postgres identifiers, so they must start with a letter
//! or underscore and contain only letters, digits, and underscores.

use regex::Regex;
use std::sync::OnceLock;

/// Prefix applied to every logical table name to derive its physical
/// table name. Keeps user tables in their own namespace, away from the
/// registry tables.
pub const PHYSICAL_PREFIX: &str = "user_data_";

fn identifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"))
}

/// Check whether a name is a valid logical identifier.
pub fn is_valid_identifier(name: &str) -> bool {
    !name.is_empty() && identifier_re().is_match(name)
}

/// Derive the physical table name for a logical table name.
///
/// Idempotent: a name that already carries the prefix is returned
/// unchanged, matching how callers may pass either form.
pub fn physical_table_name(logical: &str) -> String {
    if logical.starts_with(PHYSICAL_PREFIX) {
        logical.to_string()
    } else {
        format!("{}{}", PHYSICAL_PREFIX, logical)
    }
}
