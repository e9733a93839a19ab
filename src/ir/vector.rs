use super::IrNode;
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Ordered container of child nodes.
///
/// Holds node handles of a single category (statements, expressions or
/// declarations). The traversal engine walks it through [`IrVector::visit_each`],
/// which rebuilds the container only when an element was replaced or erased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IrVector<T> {
    items: Vec<T>,
}

impl<T> IrVector<T> {
    pub fn new() -> Self {
        IrVector { items: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Insert `item` before position `index`; appends when `index` is past the end
    pub fn insert(&mut self, index: usize, item: T) {
        let index = index.min(self.items.len());
        self.items.insert(index, item);
    }

    /// Remove and return the element at `index`
    pub fn erase(&mut self, index: usize) -> Option<T> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T: IrNode> IrVector<T> {
    /// Visit each element in order.
    ///
    /// `visit` returns the element to keep in that position, or `None` to
    /// erase it. The result is `None` when every element came back as the same
    /// node, so callers can keep their parent untouched.
    pub fn visit_each<E, F>(&self, mut visit: F) -> Result<Option<IrVector<T>>, E>
    where
        F: FnMut(usize, &T) -> Result<Option<T>, E>,
    {
        let mut items = Vec::with_capacity(self.items.len());
        let mut changed = false;
        for (index, item) in self.items.iter().enumerate() {
            match visit(index, item)? {
                Some(result) => {
                    changed |= !result.same_node(item);
                    items.push(result);
                }
                None => changed = true,
            }
        }
        Ok(changed.then_some(IrVector { items }))
    }
}

impl<T> Default for IrVector<T> {
    fn default() -> Self {
        IrVector::new()
    }
}

impl<T> From<Vec<T>> for IrVector<T> {
    fn from(items: Vec<T>) -> Self {
        IrVector { items }
    }
}

impl<T> FromIterator<T> for IrVector<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        IrVector {
            items: iter.into_iter().collect(),
        }
    }
}

impl<T> IntoIterator for IrVector<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a IrVector<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T> Index<usize> for IrVector<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}
