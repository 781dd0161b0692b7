//! In-process collaborators for tests and hosts without an object folder tree.

use crate::identity::mint_object_id;
use crate::{
    IdentityResolver, Notifier, ObjectId, ObjectLookup, ObjectStore, PluginModules, ValueKey,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

/// Identity table kept in memory. Clones share the same table, so one copy
/// can serve as resolver and another as lookup.
#[derive(Debug, Clone, Default)]
pub struct MemoryIdentity {
    ids: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force `object_name` to resolve to `id`, valid or not.
    pub fn pin(&self, object_name: &str, id: &str) {
        self.ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(object_name.to_string(), id.to_string());
    }

    fn get(&self, object_name: &str) -> Option<String> {
        self.ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(object_name)
            .cloned()
    }
}

impl IdentityResolver for MemoryIdentity {
    fn ensure(&mut self, object_name: &str, _base_dir: &Path, debug: bool) {
        let mut ids = self.ids.lock().unwrap_or_else(PoisonError::into_inner);
        if !ids.contains_key(object_name) {
            let id = mint_object_id(object_name);
            if debug {
                tracing::debug!(object = object_name, id = %id, "minted object identity");
            }
            ids.insert(object_name.to_string(), id);
        }
    }

    fn resolve(&self, object_name: &str, _base_dir: &Path) -> Option<String> {
        self.get(object_name)
    }
}

impl ObjectLookup for MemoryIdentity {
    fn lookup(&self, object_name: &str) -> Option<String> {
        self.get(object_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub object_id: ObjectId,
    pub value_key: ValueKey,
}

/// Notifier that remembers every call. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    log: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Notification> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.log.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Notifier for RecordingNotifier {
    fn notify(
        &mut self,
        object_id: &ObjectId,
        value_key: &ValueKey,
        _store: &ObjectStore,
        _plugins: &PluginModules,
    ) {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Notification {
                object_id: object_id.clone(),
                value_key: value_key.clone(),
            });
    }
}
