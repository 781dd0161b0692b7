use crate::{ObjectId, ObjectStore, PluginModules, ValueKey};
use std::collections::HashMap;
use std::path::Path;

/// Provisions and resolves object identities for the registration path.
pub trait IdentityResolver {
    /// Make sure an identity exists for `object_name`. Called before every
    /// resolution in `add_io`; must be idempotent.
    fn ensure(&mut self, object_name: &str, base_dir: &Path, debug: bool);

    /// Current raw identifier for `object_name`, if any.
    fn resolve(&self, object_name: &str, base_dir: &Path) -> Option<String>;
}

/// Host name-to-identifier table used by the write path.
pub trait ObjectLookup {
    fn lookup(&self, object_name: &str) -> Option<String>;
}

impl ObjectLookup for HashMap<String, String> {
    fn lookup(&self, object_name: &str) -> Option<String> {
        self.get(object_name).cloned()
    }
}

/// Receives a synchronous notification after every successful value write.
///
/// `notify` runs while the API holds the object store lock. Read the store
/// through the `store` argument; locking another clone of the same
/// [`SharedObjectStore`](crate::SharedObjectStore) from here deadlocks.
pub trait Notifier {
    fn notify(
        &mut self,
        object_id: &ObjectId,
        value_key: &ValueKey,
        store: &ObjectStore,
        plugins: &PluginModules,
    );
}

impl<F> Notifier for F
where
    F: FnMut(&ObjectId, &ValueKey, &ObjectStore, &PluginModules),
{
    fn notify(
        &mut self,
        object_id: &ObjectId,
        value_key: &ValueKey,
        store: &ObjectStore,
        plugins: &PluginModules,
    ) {
        self(object_id, value_key, store, plugins)
    }
}

/// Data conversion plugin named by a value record's `plugin` field.
pub trait ValuePlugin: Send + Sync {
    fn name(&self) -> &str;

    /// Convert a raw value written by a hardware interface.
    fn convert(&self, value: &serde_json::Value, mode: &str) -> serde_json::Value;
}
