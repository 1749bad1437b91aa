//! Row merging.
//!
//! Extracted values only ever fill gaps: a populated cell is never overwritten, so running the
//! pipeline over its own output changes nothing.

use crate::extract::ExtractedFields;
use crate::table::Row;

/// What a merge did to a row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Fields written into empty or new cells.
    pub filled: usize,
    /// Fields ignored because the row already had a value.
    pub kept: usize,
}

/// Merge extracted fields into a row.
///
/// For each field: a populated cell is kept, a missing cell is replaced, and an absent column
/// is appended.
pub fn merge_fields(row: &mut Row, fields: &ExtractedFields) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();
    for (field, value) in fields.iter() {
        if row.is_populated(field) {
            outcome.kept += 1;
        } else {
            row.set(field, value);
            outcome.filled += 1;
        }
    }
    outcome
}
