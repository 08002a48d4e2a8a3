//! Key ordering injected into page operations.

use std::cmp::Ordering;

/// Total order over keys of type `K`.
///
/// Any `Fn(&K, &K) -> Ordering` closure is a comparator, so a caller can
/// route by a custom collation without defining a type.
pub trait KeyComparator<K> {
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering;
}

impl<K, F> KeyComparator<K> for F
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering {
        self(lhs, rhs)
    }
}

/// Orders keys by their `Ord` implementation.
///
/// For [`GenericKey`](super::GenericKey) that is bytewise order.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaturalComparator;

impl<K: Ord> KeyComparator<K> for NaturalComparator {
    #[inline]
    fn compare(&self, lhs: &K, rhs: &K) -> Ordering {
        lhs.cmp(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::btree::GenericKey;

    #[test]
    fn test_natural_comparator() {
        let cmp = NaturalComparator;
        assert_eq!(cmp.compare(&1u64, &2u64), Ordering::Less);
        assert_eq!(cmp.compare(&2u64, &2u64), Ordering::Equal);

        let a = GenericKey::<4>::from_bytes(&[1, 2, 3, 4]);
        let b = GenericKey::<4>::from_bytes(&[1, 2, 3, 5]);
        assert_eq!(cmp.compare(&a, &b), Ordering::Less);
        assert_eq!(cmp.compare(&b, &a), Ordering::Greater);
    }

    #[test]
    fn test_closure_comparator() {
        let reversed = |a: &i64, b: &i64| b.cmp(a);
        assert_eq!(reversed.compare(&1, &2), Ordering::Greater);
    }
}
