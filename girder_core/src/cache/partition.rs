//! A single keyed result store.
//!
//! Entries are shared immutable `Rc<V>` values. A partition never holds a
//! `RefCell` borrow across a computation: lookups clone the `Rc` out and
//! inserts happen after the value is complete, so computations may recurse
//! into other partitions (or this one) freely.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;

use crate::errors::{CalcError, CalcResult};

pub struct Partition<K, V> {
    name: &'static str,
    entries: RefCell<HashMap<K, Rc<V>>>,
    computed: Cell<usize>,
}

impl<K, V> Partition<K, V>
where
    K: Eq + Hash + Copy + Debug,
{
    pub fn new(name: &'static str) -> Self {
        Partition {
            name,
            entries: RefCell::new(HashMap::new()),
            computed: Cell::new(0),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn get(&self, key: &K) -> Option<Rc<V>> {
        self.entries.borrow().get(key).cloned()
    }

    /// Store a freshly computed value. A live entry under the same key means
    /// two computations raced for one key, which is a logic error.
    pub fn insert(&self, key: K, value: V) -> CalcResult<Rc<V>> {
        let mut entries = self.entries.borrow_mut();
        if entries.contains_key(&key) {
            return Err(CalcError::cache_coherency(self.name, key));
        }
        let value = Rc::new(value);
        entries.insert(key, Rc::clone(&value));
        self.computed.set(self.computed.get() + 1);
        Ok(value)
    }

    /// Lookup, or compute and store on a miss
    pub fn get_or_try_insert_with(&self, key: K, compute: impl FnOnce() -> CalcResult<V>) -> CalcResult<Rc<V>> {
        if let Some(hit) = self.get(&key) {
            log::trace!("{} hit {:?}", self.name, key);
            return Ok(hit);
        }
        log::trace!("{} miss {:?}", self.name, key);
        let value = compute()?;
        self.insert(key, value)
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    pub fn retain(&self, mut keep: impl FnMut(&K) -> bool) {
        self.entries.borrow_mut().retain(|k, _| keep(k));
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of values computed since the partition was created
    pub fn computed_count(&self) -> usize {
        self.computed.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_computes_once() {
        let partition: Partition<u32, f64> = Partition::new("test");
        let calls = Cell::new(0);
        for _ in 0..3 {
            let value = partition
                .get_or_try_insert_with(7, || {
                    calls.set(calls.get() + 1);
                    Ok(1.5)
                })
                .unwrap();
            assert_eq!(*value, 1.5);
        }
        assert_eq!(calls.get(), 1);
        assert_eq!(partition.computed_count(), 1);
    }

    #[test]
    fn test_duplicate_insert_is_coherency_violation() {
        let partition: Partition<u32, f64> = Partition::new("test");
        partition.insert(1, 1.0).unwrap();
        let err = partition.insert(1, 2.0).unwrap_err();
        assert_eq!(err.error_code(), "CACHE_COHERENCY_VIOLATION");
        assert_eq!(*partition.get(&1).unwrap(), 1.0);
    }

    #[test]
    fn test_failed_compute_is_not_cached() {
        let partition: Partition<u32, f64> = Partition::new("test");
        let result = partition.get_or_try_insert_with(1, || Err(CalcError::configuration_mismatch("no")));
        assert!(result.is_err());
        assert!(partition.is_empty());
    }

    #[test]
    fn test_retain_and_clear() {
        let partition: Partition<u32, f64> = Partition::new("test");
        for k in 0..4 {
            partition.insert(k, k as f64).unwrap();
        }
        partition.retain(|k| k % 2 == 0);
        assert_eq!(partition.len(), 2);
        partition.clear();
        assert!(partition.is_empty());
    }
}
