//! In-memory configuration store with ordered, positional children.

use super::{Access, ConfigStore, Namespace};
use crate::constants::UNINSTALL_NAMESPACE;
use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct Child {
    name: String,
    fields: HashMap<String, String>,
}

/// Holds a single uninstall namespace. Children whose names are in `denied`
/// fail every field read with `PermissionDenied`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    children: Mutex<Vec<Child>>,
    denied: HashSet<String>,
}

impl MemoryStore {
    pub fn with_child(self, name: &str, fields: &[(&str, &str)]) -> Self {
        self.lock().push(Child {
            name: name.to_string(),
            fields: fields
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        });
        self
    }

    pub fn deny(mut self, name: &str) -> Self {
        self.denied.insert(name.to_string());
        self
    }

    pub fn child_names(&self) -> Vec<String> {
        self.lock().iter().map(|c| c.name.clone()).collect()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Child>> {
        self.children.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ConfigStore for MemoryStore {
    fn open(&self, namespace: &str, _access: Access) -> io::Result<Box<dyn Namespace + '_>> {
        if namespace != UNINSTALL_NAMESPACE {
            return Err(io::ErrorKind::NotFound.into());
        }
        Ok(Box::new(MemoryNamespace { store: self }))
    }
}

struct MemoryNamespace<'a> {
    store: &'a MemoryStore,
}

impl Namespace for MemoryNamespace<'_> {
    fn child_count(&self) -> io::Result<usize> {
        Ok(self.store.lock().len())
    }

    fn child_at(&self, index: usize) -> io::Result<Option<String>> {
        Ok(self.store.lock().get(index).map(|c| c.name.clone()))
    }

    fn read_field(&self, child: &str, field: &str) -> io::Result<Option<String>> {
        if self.store.denied.contains(child) {
            return Err(io::ErrorKind::PermissionDenied.into());
        }
        self.store
            .lock()
            .iter()
            .find(|c| c.name == child)
            .map(|c| c.fields.get(field).cloned())
            .ok_or_else(|| io::ErrorKind::NotFound.into())
    }

    fn delete_child(&self, child: &str) -> io::Result<()> {
        let mut children = self.store.lock();
        let index = children
            .iter()
            .position(|c| c.name == child)
            .ok_or(io::ErrorKind::NotFound)?;
        children.remove(index);
        Ok(())
    }
}
