use std::ops::Deref;

/// A value paired with a counter that moves on every mutable access.
///
/// The render layer compares versions to decide whether the display graph
/// needs to be reconciled with the store.
#[derive(Debug, Clone, Default)]
pub struct Versioned<T> {
    version: u64,
    data: T,
}

impl<T> Versioned<T> {
    pub fn new(data: T) -> Self {
        Self { version: 0, data }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn get(&self) -> &T {
        &self.data
    }

    /// Replace the value, bumping the version.
    pub fn set(&mut self, data: T) {
        self.data = data;
        self.bump();
    }

    /// Mutate in place, bumping the version.
    pub fn modify<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R {
        self.bump();
        f(&mut self.data)
    }

    fn bump(&mut self) {
        self.version = self.version.wrapping_add(1);
    }
}

impl<T> Deref for Versioned<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_do_not_bump() {
        let v = Versioned::new(vec![1, 2, 3]);
        assert_eq!(v.len(), 3);
        assert_eq!(v.get()[0], 1);
        assert_eq!(v.version(), 0);
    }

    #[test]
    fn writes_bump() {
        let mut v = Versioned::new(Vec::<u8>::new());
        v.modify(|d| d.push(1));
        v.set(vec![4, 5]);
        assert_eq!(v.version(), 2);
        assert_eq!(*v.get(), vec![4, 5]);
    }
}
