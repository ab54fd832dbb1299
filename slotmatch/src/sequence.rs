//! Ordered, indexable sequence shared by tokens and rules.

use serde::{Deserialize, Serialize};

use crate::error::{MatchError, Result};

/// An ordered, 0-indexed sequence.
///
/// Reads never mutate. `tail` returns a new sequence, while `prepend` edits a
/// sequence the caller owns. Cloning a sequence clones every element, so the
/// elements of a clone can be changed without touching the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sequence<T> {
    items: Vec<T>,
}

impl<T> Default for Sequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Sequence<T> {
    /// Creates an empty sequence.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Number of elements.
    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the sequence has no elements.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the element at `index`.
    ///
    /// # Errors
    /// Returns `OutOfRange` when `index >= count()`.
    pub fn at(&self, index: usize) -> Result<&T> {
        self.items.get(index).ok_or(MatchError::OutOfRange {
            index,
            count: self.items.len(),
        })
    }

    /// Mutable access to the element at `index`.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T> {
        let count = self.items.len();
        self.items
            .get_mut(index)
            .ok_or(MatchError::OutOfRange { index, count })
    }

    /// Returns the first element.
    ///
    /// # Errors
    /// Returns `EmptyCollection` on an empty sequence.
    pub fn head(&self) -> Result<&T> {
        self.items.first().ok_or(MatchError::EmptyCollection)
    }

    /// Inserts `item` at index 0.
    pub fn prepend(&mut self, item: T) {
        self.items.insert(0, item);
    }

    /// Iterates over the elements in order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Iterates mutably over the elements in order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    /// Borrows the elements as a slice.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T: Clone> Sequence<T> {
    /// Returns every element except the first.
    ///
    /// Never fails: a sequence with zero or one element yields an empty one.
    pub fn tail(&self) -> Self {
        Self {
            items: self.items.iter().skip(1).cloned().collect(),
        }
    }

    /// Returns a new sequence with `item` in front, leaving `self` untouched.
    pub fn with_prepended(&self, item: T) -> Self {
        let mut items = Vec::with_capacity(self.items.len() + 1);
        items.push(item);
        items.extend(self.items.iter().cloned());
        Self { items }
    }
}

impl<T> From<Vec<T>> for Sequence<T> {
    fn from(items: Vec<T>) -> Self {
        Self { items }
    }
}

impl<T> FromIterator<T> for Sequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<T> IntoIterator for Sequence<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Sequence<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letters() -> Sequence<String> {
        ["a", "b", "c"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_at_and_head() {
        let seq = letters();
        assert_eq!(seq.count(), 3);
        assert_eq!(seq.head().unwrap(), "a");
        assert_eq!(seq.at(2).unwrap(), "c");
        assert_eq!(seq.as_slice(), ["a", "b", "c"]);
        assert_eq!(
            seq.at(3),
            Err(MatchError::OutOfRange { index: 3, count: 3 })
        );
    }

    #[test]
    fn test_head_empty() {
        let seq = Sequence::<String>::new();
        assert_eq!(seq.head(), Err(MatchError::EmptyCollection));
        assert!(seq.at(0).is_err());
    }

    #[test]
    fn test_tail() {
        let seq = letters();
        let tailed = seq.tail();
        assert_eq!(tailed.count(), 2);
        assert_eq!(tailed.at(0).unwrap(), "b");
        // source untouched
        assert_eq!(seq.count(), 3);

        let single: Sequence<i32> = vec![1].into();
        assert!(single.tail().is_empty());
        assert!(Sequence::<i32>::new().tail().is_empty());
    }

    #[test]
    fn test_prepend() {
        let mut seq = letters().tail();
        seq.prepend("front".to_string());
        assert_eq!(seq.count(), 3);
        assert_eq!(seq.head().unwrap(), "front");
        assert_eq!(seq.at(1).unwrap(), "b");

        let copy = seq.with_prepended("x".to_string());
        assert_eq!(copy.count(), 4);
        assert_eq!(seq.count(), 3);
        assert_eq!(copy.head().unwrap(), "x");
    }

    #[test]
    fn test_clone_is_independent() {
        let seq = letters();
        let mut cloned = seq.clone();
        *cloned.at_mut(0).unwrap() = "z".to_string();
        assert_eq!(seq.at(0).unwrap(), "a");
        assert_eq!(cloned.at(0).unwrap(), "z");
    }
}
