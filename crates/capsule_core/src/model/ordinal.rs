//! Sibling ordering.
//!
//! Siblings are ordered by `recommended_order` when one is authored, with id
//! (creation order) as tie-break. Siblings without an authored order come
//! after all ordered ones, again by id.

use crate::model::ids::ContentId;
use std::cmp::Ordering;

/// Entity that takes part in sibling ordering.
pub trait Ordinal {
    /// Creation-order identifier.
    fn ordinal_id(&self) -> ContentId;

    /// Authored position within the parent, if any.
    fn recommended_order(&self) -> Option<i64> {
        None
    }
}

/// Total order over siblings.
pub fn compare_siblings<T: Ordinal + ?Sized>(left: &T, right: &T) -> Ordering {
    let by_order = match (left.recommended_order(), right.recommended_order()) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_order.then_with(|| left.ordinal_id().cmp(&right.ordinal_id()))
}

/// Sorts siblings in place. The sort is stable and total, so duplicates of
/// the same id keep their relative order.
pub fn sort_siblings<T: Ordinal>(items: &mut [T]) {
    items.sort_by(|left, right| compare_siblings(left, right));
}
