//! Per-request key/value store.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use super::Context;

/// A stored value of any type.
pub type Value = Arc<dyn Any + Send + Sync>;

/// Scratch storage middleware uses to pass data downstream.
///
/// Safe to share with tasks spawned during the request. The map is only
/// allocated on the first `set`.
#[derive(Debug, Default)]
pub struct Keys {
    map: RwLock<Option<HashMap<String, Value>>>,
}

impl Keys {
    pub fn set<V>(&self, key: impl Into<String>, value: V)
    where
        V: Any + Send + Sync,
    {
        let mut map = self.map.write().unwrap_or_else(PoisonError::into_inner);
        map.get_or_insert_with(HashMap::new)
            .insert(key.into(), Arc::new(value));
    }

    /// The value stored under `key`, or `None` if absent.
    pub fn get(&self, key: &str) -> Option<Value> {
        let map = self.map.read().unwrap_or_else(PoisonError::into_inner);
        map.as_ref().and_then(|m| m.get(key)).cloned()
    }

    /// The value under `key` if it has type `T`.
    pub fn get_as<T>(&self, key: &str) -> Option<T>
    where
        T: Any + Clone,
    {
        self.get(key)
            .and_then(|value| value.downcast_ref::<T>().cloned())
    }

    /// The value as a string; empty when absent or not a string.
    pub fn get_string(&self, key: &str) -> String {
        let Some(value) = self.get(key) else {
            return String::new();
        };
        if let Some(s) = value.downcast_ref::<String>() {
            return s.clone();
        }
        value
            .downcast_ref::<&'static str>()
            .map(|s| s.to_string())
            .unwrap_or_default()
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.get_as(key).unwrap_or_default()
    }

    /// The value as an `i32`, the type of an unsuffixed integer literal.
    pub fn get_int(&self, key: &str) -> i32 {
        self.get_as(key).unwrap_or_default()
    }

    pub fn get_int64(&self, key: &str) -> i64 {
        self.get_as(key).unwrap_or_default()
    }

    pub fn get_uint(&self, key: &str) -> u32 {
        self.get_as(key).unwrap_or_default()
    }

    pub fn get_uint64(&self, key: &str) -> u64 {
        self.get_as(key).unwrap_or_default()
    }

    pub fn get_float64(&self, key: &str) -> f64 {
        self.get_as(key).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        let map = self.map.read().unwrap_or_else(PoisonError::into_inner);
        map.as_ref().map_or(0, HashMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn clear(&mut self) {
        *self.map.get_mut().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl Context {
    /// Store `value` under `key` for the rest of the request.
    pub fn set<V>(&self, key: impl Into<String>, value: V)
    where
        V: Any + Send + Sync,
    {
        self.keys.set(key, value);
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.keys.get(key)
    }

    pub fn get_string(&self, key: &str) -> String {
        self.keys.get_string(key)
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.keys.get_bool(key)
    }

    pub fn get_int(&self, key: &str) -> i32 {
        self.keys.get_int(key)
    }

    pub fn get_int64(&self, key: &str) -> i64 {
        self.keys.get_int64(key)
    }

    pub fn get_uint(&self, key: &str) -> u32 {
        self.keys.get_uint(key)
    }

    pub fn get_uint64(&self, key: &str) -> u64 {
        self.keys.get_uint64(key)
    }

    pub fn get_float64(&self, key: &str) -> f64 {
        self.keys.get_float64(key)
    }

    /// A handle to the store for tasks spawned by a handler.
    pub fn keys(&self) -> Arc<Keys> {
        Arc::clone(&self.keys)
    }
}
