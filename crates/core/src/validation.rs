//! Field rules shared by the entity crates.
//!
//! Rules push a human-readable message into a violation list instead of
//! failing fast, so callers can report every broken rule in one error.

/// Require a non-blank value.
pub fn require_present(field: &str, value: &str, violations: &mut Vec<String>) -> bool {
    if value.trim().is_empty() {
        violations.push(format!("{field} is required"));
        return false;
    }
    true
}

/// Require a non-blank display name made of ASCII letters and whitespace only.
pub fn require_name(field: &str, value: &str, violations: &mut Vec<String>) {
    if !require_present(field, value, violations) {
        return;
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_alphabetic() || c.is_whitespace())
    {
        violations.push(format!("{field} may only contain letters and spaces"));
    }
}
