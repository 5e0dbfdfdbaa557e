//! Identity-keyed merging of cookie records.

use crate::cookie::CookieRecord;
use std::collections::HashMap;

/// Merges `incoming` into `existing`, last write wins.
///
/// Records are folded in order (`existing` first) into a map keyed by
/// [`CookieRecord::identity_key`]. A later record overwrites an earlier one in
/// place, so the result keeps first-insertion order and holds each key once.
pub fn merge_and_dedupe<I, J>(existing: I, incoming: J) -> Vec<CookieRecord>
where
    I: IntoIterator<Item = CookieRecord>,
    J: IntoIterator<Item = CookieRecord>,
{
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut merged: Vec<CookieRecord> = Vec::new();

    for record in existing.into_iter().chain(incoming) {
        match positions.get(&record.identity_key()) {
            Some(&index) => merged[index] = record,
            None => {
                positions.insert(record.identity_key(), merged.len());
                merged.push(record);
            }
        }
    }

    merged
}
