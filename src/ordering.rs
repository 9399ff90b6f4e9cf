//! Explicit total order over `(value, address)` pairs.
//!
//! Some callers need a tie-break when two references compare equal by
//! value: sort by the value first, then by where the referent lives in
//! memory, so the order is total and deterministic instead of resting on
//! whatever a raw pointer comparison happens to do. Built as a regular
//! newtype with `Ord`/`PartialOrd` impls rather than inherited operator
//! overloading on a pointer type.

use std::cmp::Ordering;

/// Orders `&'a T` references first by their pointee (`T: Ord`), then by
/// address, so two references to equal values never compare as equal
/// unless they point at the same memory.
#[derive(Debug, Clone, Copy)]
pub struct AddressOrdered<'a, T> {
    pub value: &'a T,
}

impl<'a, T> AddressOrdered<'a, T> {
    pub fn new(value: &'a T) -> Self {
        Self { value }
    }

    fn address(&self) -> usize {
        self.value as *const T as usize
    }
}

impl<'a, T: PartialEq> PartialEq for AddressOrdered<'a, T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.address() == other.address()
    }
}

impl<'a, T: Eq> Eq for AddressOrdered<'a, T> {}

impl<'a, T: PartialOrd> PartialOrd for AddressOrdered<'a, T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.value.partial_cmp(other.value) {
            Some(Ordering::Equal) => self.address().partial_cmp(&other.address()),
            other => other,
        }
    }
}

impl<'a, T: Ord> Ord for AddressOrdered<'a, T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value
            .cmp(other.value)
            .then_with(|| self.address().cmp(&other.address()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// S5: for `arr = [6, 3, 6]` with `a = &arr[0]`, `b = &arr[1]`,
    /// `c = &arr[2]`, the total order breaks the `a == c` value tie by
    /// address, yielding `b < a < c`.
    #[test]
    fn s5_pointer_comparator_tie_break() {
        let arr = [6i32, 3, 6];
        let a = AddressOrdered::new(&arr[0]);
        let b = AddressOrdered::new(&arr[1]);
        let c = AddressOrdered::new(&arr[2]);

        assert!(b < a);
        assert!(a < c);
        assert_eq!(a.value, c.value);
        assert_ne!(a, c);
    }

    #[test]
    fn sorting_is_stable_under_value_ties() {
        let arr = [1i32, 5, 5, 2, 5];
        let mut refs: Vec<AddressOrdered<i32>> =
            arr.iter().map(AddressOrdered::new).collect();
        refs.sort();
        let values: Vec<i32> = refs.iter().map(|r| *r.value).collect();
        assert_eq!(values, vec![1, 2, 5, 5, 5]);
        // The three equal-valued entries are still ordered by address,
        // i.e. by their original index, since arr is contiguous.
        let fives: Vec<usize> = refs
            .iter()
            .filter(|r| *r.value == 5)
            .map(|r| r.address())
            .collect();
        assert!(fives.windows(2).all(|w| w[0] < w[1]));
    }
}
