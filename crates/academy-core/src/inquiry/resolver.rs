//! Maps caller-supplied identifiers onto records in a snapshot.
//!
//! Route segments reaching the store may be stale, typed by hand, written with
//! the legacy `row-` prefix, or be plain 1-based row numbers. Resolution is
//! deliberately forgiving: it tries, in order,
//!
//! 1. the trimmed input as an exact id,
//! 2. the input with `row-` rewritten to `inq-`,
//! 3. the first run of digits as `inq-<digits>`, then as a 1-based row index,
//! 4. the first record in the collection.
//!
//! Only an empty collection resolves to `None`.

use super::model::{InquiryId, InquiryRecord};

/// Prefix of canonical inquiry ids.
pub const CANONICAL_PREFIX: &str = "inq-";

/// Prefix used by older list views for row ids.
pub const LEGACY_PREFIX: &str = "row-";

/// Resolve `raw` to the id of the record the caller most likely meant.
///
/// Pure: the same input against the same collection always yields the same
/// answer.
#[must_use]
pub fn resolve_inquiry_id(raw: &str, records: &[InquiryRecord]) -> Option<InquiryId> {
    let trimmed = raw.trim();
    if let Some(id) = exact(trimmed, records) {
        return Some(id);
    }

    let normalized = trimmed.strip_prefix(LEGACY_PREFIX).map_or_else(
        || trimmed.to_string(),
        |rest| format!("{CANONICAL_PREFIX}{rest}"),
    );
    if let Some(id) = exact(&normalized, records) {
        return Some(id);
    }

    if let Some(digits) = first_digit_run(&normalized) {
        if let Some(id) = exact(&format!("{CANONICAL_PREFIX}{digits}"), records) {
            return Some(id);
        }
        if let Some(record) = row_index(digits).and_then(|index| records.get(index)) {
            return Some(record.id.clone());
        }
    }

    records.first().map(|record| record.id.clone())
}

fn exact(candidate: &str, records: &[InquiryRecord]) -> Option<InquiryId> {
    records
        .iter()
        .find(|record| record.id.as_str() == candidate)
        .map(|record| record.id.clone())
}

fn first_digit_run(s: &str) -> Option<&str> {
    let start = s.find(|c: char| c.is_ascii_digit())?;
    let rest = &s[start..];
    let len = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    Some(&rest[..len])
}

/// Converts a 1-based row number to a zero-based index. Row `0` and numbers
/// too large for `usize` have no index.
fn row_index(digits: &str) -> Option<usize> {
    digits.parse::<usize>().ok()?.checked_sub(1)
}
