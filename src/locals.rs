use indexmap::IndexMap;
use std::any::{Any, TypeId, type_name};
use std::borrow::Cow;
use std::fmt;
use std::io;
use tracing::warn;

/// Key of a request-scoped local value.
///
/// Scoped keys are namespaced by a type, so two middlewares using the same
/// numeric id under different namespace types never collide, and neither
/// collides with a named key.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum LocalKey {
    Name(Cow<'static, str>),
    Scoped {
        namespace: TypeId,
        namespace_name: &'static str,
        id: u64,
    },
}

impl LocalKey {
    pub fn scoped<N: 'static>(id: u64) -> Self {
        LocalKey::Scoped {
            namespace: TypeId::of::<N>(),
            namespace_name: type_name::<N>(),
            id,
        }
    }
}

impl fmt::Debug for LocalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalKey::Name(name) => write!(f, "{name:?}"),
            LocalKey::Scoped {
                namespace_name, id, ..
            } => write!(f, "{namespace_name}#{id}"),
        }
    }
}

impl From<&'static str> for LocalKey {
    fn from(value: &'static str) -> Self {
        LocalKey::Name(Cow::Borrowed(value))
    }
}

impl From<String> for LocalKey {
    fn from(value: String) -> Self {
        LocalKey::Name(Cow::Owned(value))
    }
}

/// A local value holding a resource that must be released with the request.
pub trait Closable {
    fn close(&mut self) -> io::Result<()>;
}

type Closer = fn(&mut (dyn Any + Send)) -> io::Result<()>;

struct Slot {
    value: Box<dyn Any + Send>,
    closer: Option<Closer>,
}

fn close_as<T: Closable + 'static>(value: &mut (dyn Any + Send)) -> io::Result<()> {
    match value.downcast_mut::<T>() {
        Some(value) => value.close(),
        None => Ok(()),
    }
}

/// Heterogeneous request-scoped storage with typed retrieval.
#[derive(Default)]
pub struct Locals {
    slots: IndexMap<LocalKey, Slot>,
}

impl Locals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains<K: Into<LocalKey>>(&self, key: K) -> bool {
        self.slots.contains_key(&key.into())
    }

    /// Stores `value`, replacing (and dropping) whatever was under `key`.
    pub fn set<K, T>(&mut self, key: K, value: T)
    where
        K: Into<LocalKey>,
        T: Any + Send,
    {
        self.slots.insert(
            key.into(),
            Slot {
                value: Box::new(value),
                closer: None,
            },
        );
    }

    /// Stores a value that is closed when the request is released.
    pub fn set_closable<K, T>(&mut self, key: K, value: T)
    where
        K: Into<LocalKey>,
        T: Any + Send + Closable,
    {
        self.slots.insert(
            key.into(),
            Slot {
                value: Box::new(value),
                closer: Some(close_as::<T>),
            },
        );
    }

    /// Typed view; `None` when missing or stored under another type.
    pub fn get<K: Into<LocalKey>, T: Any>(&self, key: K) -> Option<&T> {
        self.slots
            .get(&key.into())
            .and_then(|slot| slot.value.downcast_ref::<T>())
    }

    pub fn get_mut<K: Into<LocalKey>, T: Any>(&mut self, key: K) -> Option<&mut T> {
        self.slots
            .get_mut(&key.into())
            .and_then(|slot| slot.value.downcast_mut::<T>())
    }

    /// Type-erased view of the stored value.
    pub fn value<K: Into<LocalKey>>(&self, key: K) -> Option<&(dyn Any + Send)> {
        self.slots.get(&key.into()).map(|slot| &*slot.value)
    }

    /// Removes the value without closing it.
    pub fn remove<K: Into<LocalKey>>(&mut self, key: K) -> Option<Box<dyn Any + Send>> {
        self.slots
            .shift_remove(&key.into())
            .map(|slot| slot.value)
    }

    /// Closes every closable value in insertion order and empties the map.
    pub fn release(&mut self) {
        for (key, mut slot) in self.slots.drain(..) {
            if let Some(closer) = slot.closer {
                if let Err(err) = closer(&mut *slot.value) {
                    warn!(key = ?key, error = %err, "failed to close request local");
                }
            }
        }
    }
}

impl fmt::Debug for Locals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.slots.keys()).finish()
    }
}

#[cfg(test)]
#[path = "locals_test.rs"]
mod locals_test;
