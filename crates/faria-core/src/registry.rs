#![forbid(unsafe_code)]

//! Ordered registry for items that register themselves as they mount.
//!
//! Navigation items and form fields announce themselves to their owner at
//! mount time and withdraw at teardown. [`Registry`] keeps them in
//! registration order, keyed by identity.
//!
//! # Invariants
//!
//! - Registration order is preserved; re-registering an existing key is a
//!   no-op (the original position and value are kept).
//! - Unregistering removes the entry; later entries shift up by one.
//! - Keys are unique.
//! - Mounted handles use [`Registry::acquire`] / [`Registry::release`]: each
//!   acquire of a present key bumps a mount count, and the entry is removed
//!   only when the last mount releases it.

/// Ordered, idempotent key/value registry.
#[derive(Debug, Clone)]
pub struct Registry<K, V> {
    entries: Vec<(K, V)>,
    mounts: Vec<usize>,
}

impl<K, V> Default for Registry<K, V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            mounts: Vec::new(),
        }
    }
}

impl<K: PartialEq, V> Registry<K, V> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `key`. Returns `false` (and leaves the registry untouched)
    /// when the key is already present.
    pub fn register(&mut self, key: K, value: V) -> bool {
        if self.contains(&key) {
            return false;
        }
        self.entries.push((key, value));
        self.mounts.push(1);
        true
    }

    /// Register `key` on behalf of a mounted handle. A present key keeps its
    /// value and gains one mount. Returns `true` if the entry is new.
    pub fn acquire(&mut self, key: K, value: V) -> bool {
        match self.position(&key) {
            Some(index) => {
                self.mounts[index] += 1;
                false
            }
            None => self.register(key, value),
        }
    }

    /// Drop one mount of `key`. The entry is removed (and returned) only when
    /// its last mount is released.
    pub fn release(&mut self, key: &K) -> Option<V> {
        let index = self.position(key)?;
        self.mounts[index] = self.mounts[index].saturating_sub(1);
        if self.mounts[index] == 0 {
            self.mounts.remove(index);
            Some(self.entries.remove(index).1)
        } else {
            None
        }
    }

    /// Live mounts of `key`; `0` if unregistered.
    #[must_use]
    pub fn mounts(&self, key: &K) -> usize {
        self.position(key).map_or(0, |index| self.mounts[index])
    }

    /// Remove `key` regardless of its mount count, returning its value if it
    /// was registered.
    pub fn unregister(&mut self, key: &K) -> Option<V> {
        let index = self.position(key)?;
        self.mounts.remove(index);
        Some(self.entries.remove(index).1)
    }

    /// Whether `key` is registered.
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.position(key).is_some()
    }

    /// Registration index of `key`.
    #[must_use]
    pub fn position(&self, key: &K) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    /// Value registered under `key`.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Mutable value registered under `key`.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Entry at registration index `index`.
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<(&K, &V)> {
        self.entries.get(index).map(|(k, v)| (k, v))
    }

    /// Number of registered entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Values in registration order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Mutable values in registration order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.entries.iter_mut().map(|(_, v)| v)
    }

    /// Entries with mutable values, in registration order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&K, &mut V)> {
        self.entries.iter_mut().map(|(k, v)| (&*k, v))
    }

    /// Entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_registration_order() {
        let mut reg = Registry::new();
        assert!(reg.register("b", 2));
        assert!(reg.register("a", 1));
        assert!(reg.register("c", 3));
        assert_eq!(reg.keys().copied().collect::<Vec<_>>(), vec!["b", "a", "c"]);
        assert_eq!(reg.position(&"a"), Some(1));
    }

    #[test]
    fn duplicate_registration_is_a_noop() {
        let mut reg = Registry::new();
        assert!(reg.register("a", 1));
        assert!(reg.register("b", 2));
        assert!(!reg.register("a", 99));
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.get(&"a"), Some(&1));
        assert_eq!(reg.position(&"a"), Some(0));
    }

    #[test]
    fn unregister_shifts_later_entries() {
        let mut reg = Registry::new();
        reg.register(1, 'x');
        reg.register(2, 'y');
        reg.register(3, 'z');
        assert_eq!(reg.unregister(&2), Some('y'));
        assert_eq!(reg.unregister(&2), None);
        assert_eq!(reg.get_index(1), Some((&3, &'z')));
        assert!(!reg.contains(&2));
    }

    #[test]
    fn reregister_after_teardown_appends() {
        let mut reg = Registry::new();
        reg.register("a", ());
        reg.register("b", ());
        reg.unregister(&"a");
        reg.register("a", ());
        assert_eq!(reg.keys().copied().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn release_waits_for_last_mount() {
        let mut reg = Registry::new();
        assert!(reg.acquire("a", 1));
        assert!(!reg.acquire("a", 2));
        assert_eq!(reg.mounts(&"a"), 2);
        assert_eq!(reg.get(&"a"), Some(&1));

        assert_eq!(reg.release(&"a"), None);
        assert!(reg.contains(&"a"));
        assert_eq!(reg.release(&"a"), Some(1));
        assert!(!reg.contains(&"a"));
        assert_eq!(reg.release(&"a"), None);
        assert_eq!(reg.mounts(&"a"), 0);
    }

    #[test]
    fn unregister_ignores_mount_count() {
        let mut reg = Registry::new();
        reg.acquire("a", ());
        reg.acquire("a", ());
        reg.acquire("b", ());
        assert_eq!(reg.unregister(&"a"), Some(()));
        assert_eq!(reg.mounts(&"b"), 1);
        assert_eq!(reg.release(&"b"), Some(()));
        assert!(reg.is_empty());
    }

    #[test]
    fn get_mut_edits_in_place() {
        let mut reg = Registry::new();
        reg.register("a", 1);
        if let Some(v) = reg.get_mut(&"a") {
            *v = 10;
        }
        assert_eq!(reg.values().copied().collect::<Vec<_>>(), vec![10]);
    }
}
