//! VM Memory Model
//!
//! Index-addressed storage shared by the constant pools and the global
//! slots. Indices are the handles embedded in instruction operands.

/// Append-only, index-addressed store.
///
/// `put` hands out contiguous indices starting at 0. A pool never shrinks or
/// reorders, so an index stays valid for the pool's lifetime. Equal values
/// are not deduplicated.
#[derive(Debug, Clone)]
pub struct Pool<T> {
    values: Vec<T>,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Pool { values: Vec::new() }
    }
}

impl<T> Pool<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value and return its index
    pub fn put(&mut self, value: T) -> u64 {
        let index = self.values.len() as u64;
        self.values.push(value);
        index
    }

    pub fn get(&self, index: u64) -> Option<&T> {
        usize::try_from(index).ok().and_then(|i| self.values.get(i))
    }

    pub fn get_mut(&mut self, index: u64) -> Option<&mut T> {
        usize::try_from(index).ok().and_then(move |i| self.values.get_mut(i))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
