//! Human-readable machine codes such as `EXE-0001`.
//!
//! A code is a category prefix, a dash, and a sequence number padded to at
//! least four digits. Numbers past 9999 widen the code rather than wrap.

pub mod allocator;
pub mod repair;

/// Category name to code prefix.
pub const CATEGORY_PREFIXES: &[(&str, &str)] = &[
    ("Backhoe Loader", "BL"),
    ("Excavator", "EXE"),
    ("Backhoe Loader with Breaker", "BLB"),
];

/// Prefixes that were used in the past and must be migrated.
pub const RETIRED_PREFIXES: &[&str] = &["EX"];

/// Minimum width of the numeric part.
pub const CODE_WIDTH: usize = 4;

/// Look up the code prefix for a category. Unmapped categories get no code.
pub fn prefix_for(category: &str) -> Option<&'static str> {
    CATEGORY_PREFIXES
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, prefix)| *prefix)
}

/// All prefixes currently in use.
pub fn known_prefixes() -> impl Iterator<Item = &'static str> {
    CATEGORY_PREFIXES.iter().map(|(_, prefix)| *prefix)
}

/// Build a code from a prefix and sequence number.
pub fn format_code(prefix: &str, number: u64) -> String {
    format!("{prefix}-{number:0width$}", width = CODE_WIDTH)
}

/// Parse the number after the first `-`.
///
/// Returns `None` when the separator is missing or the suffix is not a plain
/// decimal number.
pub fn parse_number(code: &str) -> Option<u64> {
    let (_, suffix) = code.split_once('-')?;
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok()
}

/// True if `code` belongs to `prefix` (`EXE-...` for `EXE`, but not `EX-...`).
pub fn has_prefix(code: &str, prefix: &str) -> bool {
    code.strip_prefix(prefix)
        .is_some_and(|rest| rest.starts_with('-'))
}
