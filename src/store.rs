use std::cell::RefCell;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::db::Storage;
use crate::error::Result;

/// Emitted after a collection has been written to storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub key: &'static str,
    pub len: usize,
}

type Listener = Box<dyn Fn(&Change)>;

#[derive(Default)]
pub struct Subscribers {
    listeners: RefCell<Vec<Listener>>,
}

impl Subscribers {
    pub fn subscribe(&self, listener: impl Fn(&Change) + 'static) {
        self.listeners.borrow_mut().push(Box::new(listener));
    }

    pub fn notify(&self, change: &Change) {
        for listener in self.listeners.borrow().iter() {
            listener(change);
        }
    }
}

/// One persisted list. The in-memory copy is only ever swapped for a whole
/// new list, and only after that list has been written under `key`.
pub struct Collection<T> {
    key: &'static str,
    items: Vec<T>,
    storage: Rc<dyn Storage>,
    subscribers: Rc<Subscribers>,
}

impl<T> Collection<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    /// Read `key` from storage, or write and use `seed()` if it is absent.
    pub fn load(
        key: &'static str,
        storage: Rc<dyn Storage>,
        subscribers: Rc<Subscribers>,
        seed: impl FnOnce() -> Vec<T>,
    ) -> Result<Self> {
        let items = match storage.get(key)? {
            Some(json) => {
                let items: Vec<T> = serde_json::from_str(&json)?;
                debug!(key, len = items.len(), "loaded collection");
                items
            }
            None => {
                let items = seed();
                storage.set(key, &serde_json::to_string(&items)?)?;
                debug!(key, len = items.len(), "seeded collection");
                items
            }
        };
        Ok(Self {
            key,
            items,
            storage,
            subscribers,
        })
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn replace(&mut self, items: Vec<T>) -> Result<()> {
        let json = serde_json::to_string(&items)?;
        self.storage.set(self.key, &json)?;
        self.items = items;
        debug!(key = self.key, len = self.items.len(), "mirrored collection");
        self.subscribers.notify(&Change {
            key: self.key,
            len: self.items.len(),
        });
        Ok(())
    }

    /// Apply `f` to a copy of the list, then persist and swap it in.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut Vec<T>) -> R) -> Result<R> {
        let mut next = self.items.clone();
        let out = f(&mut next);
        self.replace(next)?;
        Ok(out)
    }
}

pub fn new_uuid() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Millisecond-clock id that is strictly greater than every id in use.
pub fn next_numeric_id(existing: impl Iterator<Item = i64>) -> i64 {
    let now = chrono::Utc::now().timestamp_millis();
    match existing.max() {
        Some(max) if max >= now => max + 1,
        _ => now,
    }
}
