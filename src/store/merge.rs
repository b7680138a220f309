use std::collections::HashMap;

use crate::listing::Listing;

/// Combine `existing` and `incoming` keyed by id.
///
/// The first occurrence of an id fixes its position; the last occurrence
/// supplies its value.
pub(crate) fn merge_by_id(existing: Vec<Listing>, incoming: Vec<Listing>) -> Vec<Listing> {
    let mut merged: Vec<Listing> = Vec::with_capacity(existing.len() + incoming.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    for listing in existing.into_iter().chain(incoming) {
        match positions.get(&listing.id) {
            Some(&pos) => merged[pos] = listing,
            None => {
                positions.insert(listing.id.clone(), merged.len());
                merged.push(listing);
            }
        }
    }

    merged
}
